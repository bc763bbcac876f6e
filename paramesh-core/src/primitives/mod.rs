//! Procedural solids assembled from parametric patches.
//!
//! A primitive decomposes its solid into simple patches that share one
//! coordinate convention, names each one, and registers them in a
//! [`CompositeModel`](crate::composite::CompositeModel) so they move as a unit
//! and can be shown or hidden independently.

pub mod cuboid;
pub mod hollow_cylinder;

pub use cuboid::{Cuboid, CuboidConfig};
pub use hollow_cylinder::{HollowCylinder, HollowCylinderConfig};
