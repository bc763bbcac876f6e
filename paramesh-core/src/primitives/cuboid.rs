//! Axis-aligned box with a sharp-edge wireframe overlay.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::composite::CompositeModel;
use crate::error::{GeometryError, Result};
use crate::geometry::TessellatedMesh;
use crate::part::{SolidPart, WireframePart};
use crate::scene::{Color, Material};
use crate::surface::{Domain, ParametricSurface};

pub const SOLID_PART: &str = "solid";
pub const WIREFRAME_PART: &str = "wireframe";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuboidConfig {
    pub size: [f32; 3],
    /// Cells along each face edge.
    pub segments: u32,
    pub color: Color,
    pub opacity: f32,
    pub wireframe_color: Color,
    pub wireframe_opacity: f32,
    /// The outline is taken from a box grown by this much on every side so
    /// that it is not hidden by the faces.
    pub wireframe_offset: f32,
}

impl Default for CuboidConfig {
    fn default() -> Self {
        Self {
            size: [4.0, 3.0, 2.0],
            segments: 1,
            color: Color(0x003356),
            opacity: 0.8,
            wireframe_color: Color(0x003860),
            wireframe_opacity: 0.7,
            wireframe_offset: 0.01,
        }
    }
}

impl CuboidConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(GeometryError::config(format!(
                "box size {:?} must be positive",
                self.size
            )));
        }
        if self.segments == 0 {
            return Err(GeometryError::config("a box face needs at least one segment"));
        }
        if !self.wireframe_offset.is_finite() || self.wireframe_offset < 0.0 {
            return Err(GeometryError::config("wireframe offset must be non-negative"));
        }
        for opacity in [self.opacity, self.wireframe_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(GeometryError::config(format!("opacity {opacity} outside [0, 1]")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    const ALL: [Face; 6] = [Face::PosX, Face::NegX, Face::PosY, Face::NegY, Face::PosZ, Face::NegZ];

    /// Half extents along u and v, in that order.
    fn extents(self, h: &Vector3<f32>) -> (f32, f32) {
        match self {
            Face::PosX => (h.y, h.z),
            Face::NegX => (h.z, h.y),
            Face::PosY => (h.z, h.x),
            Face::NegY => (h.x, h.z),
            Face::PosZ => (h.x, h.y),
            Face::NegZ => (h.y, h.x),
        }
    }

    /// Face point with `dP/du x dP/dv` pointing outward.
    fn point(self, h: &Vector3<f32>, u: f32, v: f32) -> Point3<f32> {
        match self {
            Face::PosX => Point3::new(h.x, u, v),
            Face::NegX => Point3::new(-h.x, v, u),
            Face::PosY => Point3::new(v, h.y, u),
            Face::NegY => Point3::new(u, -h.y, v),
            Face::PosZ => Point3::new(u, v, h.z),
            Face::NegZ => Point3::new(v, u, -h.z),
        }
    }

    fn normal(self) -> Vector3<f32> {
        match self {
            Face::PosX => Vector3::x(),
            Face::NegX => -Vector3::x(),
            Face::PosY => Vector3::y(),
            Face::NegY => -Vector3::y(),
            Face::PosZ => Vector3::z(),
            Face::NegZ => -Vector3::z(),
        }
    }
}

/// Map cell index `i` of `n` onto `[-h, h]`; exact at both ends.
fn span(h: f32, i: f32, n: f32) -> f32 {
    -h + 2.0 * h * (i / n)
}

fn box_mesh(half: Vector3<f32>, segments: u32) -> Result<TessellatedMesh> {
    let mut mesh = TessellatedMesh::new();
    let n = segments as f32;
    // Sample on the cell grid, not on the face extents, so every face gets
    // exactly `segments` cells whatever the size.
    let domain = Domain::new(0.0, n, 1.0, 0.0, n, 1.0)?;
    for face in Face::ALL {
        let (hu, hv) = face.extents(&half);
        let normal = face.normal();
        let patch = ParametricSurface::new(
            |i, j| face.point(&half, span(hu, i, n), span(hv, j, n)),
            |_, _| normal,
            domain,
        )?;
        mesh.append(&patch.tessellate()?);
    }
    Ok(mesh)
}

/// A box made of six planar patches, plus its outline.
#[derive(Debug)]
pub struct Cuboid {
    model: CompositeModel,
}

impl Cuboid {
    #[instrument(skip_all)]
    pub fn build(config: &CuboidConfig) -> Result<Self> {
        config.validate()?;
        let half = Vector3::from(config.size) / 2.0;
        let solid = box_mesh(half, config.segments)?;
        let grown = box_mesh(half.add_scalar(config.wireframe_offset), config.segments)?;

        let mut model = CompositeModel::new();
        model.add_part(
            SOLID_PART,
            SolidPart::new(solid, Material::translucent(config.color, config.opacity)),
        )?;
        model.add_part(
            WIREFRAME_PART,
            WireframePart::new(&grown, config.wireframe_color, true, config.wireframe_opacity),
        )?;

        info!(size = ?config.size, segments = config.segments, "built cuboid");
        Ok(Self { model })
    }

    pub fn model(&self) -> &CompositeModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut CompositeModel {
        &mut self.model
    }

    pub fn into_model(self) -> CompositeModel {
        self.model
    }

    pub fn set_wireframe_enabled(&self, enabled: bool) {
        self.model.set_part_enabled(WIREFRAME_PART, enabled);
    }
}
