//! Paramesh Core Library - procedural geometry and composite models
//!
//! Parametric curves and surfaces are sampled into line and triangle
//! buffers, wrapped into parts, and grouped into composite models that a
//! renderer can attach to a scene and transform as one object.

pub mod composite;
pub mod curve;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod part;
pub mod primitives;
mod sampling;
pub mod scene;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use composite::CompositeModel;
pub use curve::ParametricCurve;
pub use edges::extract_sharp_edges;
pub use error::{GeometryError, Result};
pub use geometry::{LineSegments, PointCloud, Polyline, TessellatedMesh, Triangle, Vertex};
pub use part::{LinePart, Part, SolidPart, WireframePart};
pub use primitives::{Cuboid, CuboidConfig, HollowCylinder, HollowCylinderConfig};
pub use sampling::MAX_SAMPLES_PER_AXIS;
pub use scene::{Color, Geometry, Material, NodeHandle, Scene, SceneNode};
pub use surface::{Domain, ParametricSurface};
pub use transform::{RotationState, Transform, TransformNode};
