//! Error types for mesh generation and composite models.

use thiserror::Error;

/// Errors raised while building geometry or assembling composite models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Sampling parameters that cannot produce a finite, non-empty mesh.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A part with this name is already registered.
    #[error("part `{0}` is already registered")]
    DuplicateName(String),

    /// Part names must be non-empty.
    #[error("part name must not be empty")]
    InvalidName,

    /// A renderable was attached before it had anything to draw.
    #[error("missing geometry: {0}")]
    MissingGeometry(String),

    /// Layers are numbered 0..=31.
    #[error("invalid layer {0}: expected 0..=31")]
    InvalidLayer(u8),
}

impl GeometryError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
