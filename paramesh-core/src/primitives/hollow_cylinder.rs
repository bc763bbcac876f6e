//! Hollow cylinder with an angular section removed.
//!
//! Every patch and outline is expressed in the same cylindrical frame:
//! `(r, angle in degrees, z)` with the axis along `z`.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::composite::CompositeModel;
use crate::curve::ParametricCurve;
use crate::error::{GeometryError, Result};
use crate::geometry::{LineSegments, Polyline, TessellatedMesh};
use crate::part::{LinePart, SolidPart};
use crate::scene::{Color, Material};
use crate::surface::{Domain, ParametricSurface};

/// Names of the solid patches, in build order.
pub const SOLID_PARTS: [&str; 6] = ["external", "internal", "side1", "side2", "section1", "section2"];

const END_ANGLE: f32 = 360.0;

/// Slack, as a fraction of the step, when checking that a step divides the
/// swept angle.
const STEP_TOLERANCE: f32 = 1e-3;

/// Number of `step`s in `span`; the step must divide the span.
fn whole_steps(what: &str, span: f32, step: f32) -> Result<u32> {
    if !step.is_finite() || step <= 0.0 {
        return Err(GeometryError::config(format!("{what} {step} must be positive")));
    }
    let cells = (span / step).round();
    if cells < 1.0 || (cells * step - span).abs() > step * STEP_TOLERANCE {
        return Err(GeometryError::config(format!(
            "{what} {step} does not divide the {span} degree solid"
        )));
    }
    Ok(cells as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HollowCylinderConfig {
    pub outer_diameter: f32,
    pub inner_diameter: f32,
    pub length: f32,
    /// Angle, in degrees, where the solid starts; `[0, angle)` is cut away.
    pub section_angle: f32,
    /// Angular tessellation step, in degrees.
    pub angle_step: f32,
    /// Spacing of the longitudinal seam lines, in degrees.
    pub seam_step: f32,
    pub color: Color,
    pub section_color: Color,
    pub wireframe_color: Color,
    pub opacity: f32,
}

impl Default for HollowCylinderConfig {
    fn default() -> Self {
        Self {
            outer_diameter: 10.0,
            inner_diameter: 6.0,
            length: 8.0,
            section_angle: 90.0,
            angle_step: 10.0,
            seam_step: 30.0,
            color: Color(0x3377aa),
            section_color: Color(0xcc4422),
            wireframe_color: Color(0x101010),
            opacity: 0.9,
        }
    }
}

impl HollowCylinderConfig {
    pub fn validate(&self) -> Result<()> {
        let dims = [self.outer_diameter, self.inner_diameter, self.length];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(GeometryError::config(
                "diameters and length must be positive",
            ));
        }
        if self.inner_diameter >= self.outer_diameter {
            return Err(GeometryError::config(format!(
                "inner diameter {} must be smaller than outer diameter {}",
                self.inner_diameter, self.outer_diameter
            )));
        }
        if !(0.0..END_ANGLE).contains(&self.section_angle) {
            return Err(GeometryError::config(format!(
                "section angle {} outside [0, 360)",
                self.section_angle
            )));
        }
        self.angle_cells()?;
        self.seam_cells()?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(GeometryError::config(format!(
                "opacity {} outside [0, 1]",
                self.opacity
            )));
        }
        Ok(())
    }

    /// Angular cells of the walls, end caps and rims.
    pub fn angle_cells(&self) -> Result<u32> {
        whole_steps("angle step", END_ANGLE - self.section_angle, self.angle_step)
    }

    /// Gaps between neighbouring seam lines.
    pub fn seam_cells(&self) -> Result<u32> {
        whole_steps("seam step", END_ANGLE - self.section_angle, self.seam_step)
    }
}

/// Patches are sampled on index grids and mapped into the frame here, so the
/// first and last samples land exactly on the section planes.
#[derive(Debug, Clone, Copy)]
struct Frame {
    inner: f32,
    outer: f32,
    length: f32,
    start: f32,
    end: f32,
}

impl Frame {
    fn point(r: f32, angle: f32, z: f32) -> Point3<f32> {
        let a = angle.to_radians();
        Point3::new(r * a.cos(), r * a.sin(), z)
    }

    /// Angle at fraction `t` of the solid; `start` at 0 and `end` at 1.
    fn angle_at(&self, t: f32) -> f32 {
        self.start * (1.0 - t) + self.end * t
    }

    /// Radius at fraction `t` of the wall thickness.
    fn radius_at(&self, t: f32) -> f32 {
        self.inner * (1.0 - t) + self.outer * t
    }
}

/// A composite hollow cylinder: six solid patches plus line outlines.
#[derive(Debug)]
pub struct HollowCylinder {
    config: HollowCylinderConfig,
    model: CompositeModel,
    wireframe: Vec<String>,
}

impl HollowCylinder {
    #[instrument(skip_all)]
    pub fn build(config: HollowCylinderConfig) -> Result<Self> {
        config.validate()?;
        let frame = Frame {
            inner: config.inner_diameter / 2.0,
            outer: config.outer_diameter / 2.0,
            length: config.length,
            start: config.section_angle,
            end: END_ANGLE,
        };

        let wall = Material {
            double_sided: true,
            ..Material::translucent(config.color, config.opacity)
        };
        let section = Material::solid(config.section_color);

        let cells = config.angle_cells()?;
        let solids = [
            (wall_patch(&frame, frame.outer, cells)?, wall),
            (wall_patch(&frame, frame.inner, cells)?, wall),
            (side_patch(&frame, 0.0, -1.0, cells)?, wall),
            (side_patch(&frame, frame.length, 1.0, cells)?, wall),
            (section_patch(&frame, frame.start)?, section),
            (section_patch(&frame, frame.end)?, section),
        ];
        let outlines = outlines(&frame, cells, config.seam_cells()?)?;

        let mut model = CompositeModel::new();
        for (name, (mesh, material)) in SOLID_PARTS.iter().zip(solids) {
            model.add_part(*name, SolidPart::new(mesh, material))?;
        }
        let mut wireframe = Vec::with_capacity(outlines.len());
        for (name, segments) in outlines {
            model.add_part(name.as_str(), LinePart::segments(segments, config.wireframe_color))?;
            wireframe.push(name);
        }

        info!(
            parts = model.len(),
            outlines = wireframe.len(),
            "built hollow cylinder"
        );
        Ok(Self {
            config,
            model,
            wireframe,
        })
    }

    pub fn config(&self) -> &HollowCylinderConfig {
        &self.config
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

    /// Names of the outline parts toggled by [`Self::set_wireframe_enabled`].
    pub fn wireframe_names(&self) -> &[String] {
        &self.wireframe
    }

    pub fn set_wireframe_enabled(&self, enabled: bool) {
        for name in &self.wireframe {
            self.model.set_part_enabled(name, enabled);
        }
    }

    pub fn is_wireframe_enabled(&self) -> bool {
        self.wireframe
            .iter()
            .all(|name| self.model.is_part_enabled(name).unwrap_or(false))
    }
}

/// Cylindrical wall of radius `r`: u = angle cell, v = 0 at the bottom and 1
/// at the top.
///
/// Both walls use the same normal function; the inner wall's normal is not
/// mirrored.
fn wall_patch(frame: &Frame, r: f32, cells: u32) -> Result<TessellatedMesh> {
    let n = cells as f32;
    let domain = Domain::new(0.0, n, 1.0, 0.0, 1.0, 1.0)?;
    ParametricSurface::new(
        |u, v| Frame::point(r, frame.angle_at(u / n), v * frame.length),
        |u: f32, _: f32| {
            let a = frame.angle_at(u / n).to_radians();
            Vector3::new(a.cos(), -a.sin(), 0.0)
        },
        domain,
    )?
    .tessellate()
}

/// Annular end cap at height `z`: u = angle cell, v = 0 inside and 1 outside.
fn side_patch(frame: &Frame, z: f32, normal_z: f32, cells: u32) -> Result<TessellatedMesh> {
    let n = cells as f32;
    let domain = Domain::new(0.0, n, 1.0, 0.0, 1.0, 1.0)?;
    ParametricSurface::new(
        |u, v| Frame::point(frame.radius_at(v), frame.angle_at(u / n), z),
        |_, _| Vector3::new(0.0, 0.0, normal_z),
        domain,
    )?
    .tessellate()
}

/// Flat cut face at `angle`: u along the length, v across the wall.
fn section_patch(frame: &Frame, angle: f32) -> Result<TessellatedMesh> {
    let domain = Domain::new(0.0, 1.0, 1.0, 0.0, 1.0, 1.0)?;
    let a = angle.to_radians();
    let normal = Vector3::new(a.sin(), a.cos(), 0.0);
    ParametricSurface::new(
        |u, v| Frame::point(frame.radius_at(v), angle, u * frame.length),
        |_, _| normal,
        domain,
    )?
    .tessellate()
}

/// Arc over the whole solid in `cells` pieces, ending on both section planes.
fn arc(frame: &Frame, r: f32, z: f32, cells: u32) -> Result<Polyline> {
    let n = cells as f32;
    Ok(ParametricCurve::new(|i| Frame::point(r, frame.angle_at(i / n), z), 0.0, n, 1.0)?.sample())
}

fn outlines(frame: &Frame, cells: u32, seam_cells: u32) -> Result<Vec<(String, LineSegments)>> {
    let mut out = Vec::new();

    for (label, r) in [("outer", frame.outer), ("inner", frame.inner)] {
        for (end, z) in [("bottom", 0.0), ("top", frame.length)] {
            let rim = arc(frame, r, z, cells)?;
            out.push((format!("wire.rim.{label}.{end}"), rim.to_segments()));
        }
    }

    for (index, angle) in [frame.start, frame.end].into_iter().enumerate() {
        let quad = Polyline::new(vec![
            Frame::point(frame.inner, angle, 0.0),
            Frame::point(frame.outer, angle, 0.0),
            Frame::point(frame.outer, angle, frame.length),
            Frame::point(frame.inner, angle, frame.length),
        ])
        .closed();
        out.push((format!("wire.section{}", index + 1), quad.to_segments()));
    }

    let mut seams = LineSegments::new();
    for r in [frame.outer, frame.inner] {
        let bottom = arc(frame, r, 0.0, seam_cells)?;
        let top = arc(frame, r, frame.length, seam_cells)?;
        for (a, b) in bottom.points.into_iter().zip(top.points) {
            seams.push(a, b);
        }
    }
    out.push(("wire.seams".to_string(), seams));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Part;
    use crate::scene::Geometry;
    use approx::assert_relative_eq;

    fn mesh_of(cylinder: &HollowCylinder, name: &str) -> TessellatedMesh {
        match cylinder.model().part(name).unwrap().geometry() {
            Geometry::Mesh(mesh) => mesh.clone(),
            other => panic!("{name} is not a mesh: {other:?}"),
        }
    }

    #[test]
    fn test_registers_all_parts() {
        let cylinder = HollowCylinder::build(HollowCylinderConfig::default()).unwrap();
        for name in SOLID_PARTS {
            assert!(matches!(cylinder.model().part(name), Some(Part::Solid(_))), "{name}");
        }
        assert_eq!(cylinder.wireframe_names().len(), 7);
        assert_eq!(cylinder.model().len(), 13);
    }

    #[test]
    fn test_wall_lies_on_radius() {
        let config = HollowCylinderConfig::default();
        let cylinder = HollowCylinder::build(config.clone()).unwrap();
        let external = mesh_of(&cylinder, "external");
        let internal = mesh_of(&cylinder, "internal");
        // 27 cells from 90 to 360 degrees, one strip
        assert_eq!(external.triangle_count(), 54);
        for i in 0..external.vertex_count() {
            let p = external.position(i);
            assert_relative_eq!(p.x.hypot(p.y), config.outer_diameter / 2.0, epsilon = 1e-4);
        }
        for i in 0..internal.vertex_count() {
            let p = internal.position(i);
            assert_relative_eq!(p.x.hypot(p.y), config.inner_diameter / 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_inner_wall_normals_not_mirrored() {
        let cylinder = HollowCylinder::build(HollowCylinderConfig::default()).unwrap();
        let external = mesh_of(&cylinder, "external");
        let internal = mesh_of(&cylinder, "internal");
        assert_eq!(external.normals, internal.normals);
    }

    #[test]
    fn test_end_caps_face_away_from_each_other() {
        let config = HollowCylinderConfig::default();
        let cylinder = HollowCylinder::build(config.clone()).unwrap();
        let bottom = mesh_of(&cylinder, "side1");
        let top = mesh_of(&cylinder, "side2");
        assert!((0..bottom.vertex_count()).all(|i| bottom.position(i).z == 0.0));
        assert!((0..top.vertex_count()).all(|i| top.position(i).z == config.length));
        assert_eq!(bottom.normal(0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(top.normal(0), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_section_is_single_quad() {
        let cylinder = HollowCylinder::build(HollowCylinderConfig::default()).unwrap();
        let section = mesh_of(&cylinder, "section1");
        assert_eq!(section.triangle_count(), 2);
        // at 90 degrees the cut face is the x = 0 plane
        for i in 0..section.vertex_count() {
            assert_relative_eq!(section.position(i).x, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_wireframe_toggle_leaves_solids() {
        let cylinder = HollowCylinder::build(HollowCylinderConfig::default()).unwrap();
        cylinder.set_wireframe_enabled(false);
        assert!(!cylinder.is_wireframe_enabled());
        for name in SOLID_PARTS {
            assert_eq!(cylinder.model().is_part_enabled(name), Some(true));
        }
        cylinder.set_wireframe_enabled(true);
        assert!(cylinder.is_wireframe_enabled());
    }

    #[test]
    fn test_seams_span_length() {
        let config = HollowCylinderConfig::default();
        let cylinder = HollowCylinder::build(config.clone()).unwrap();
        let geometry = cylinder.model().part("wire.seams").unwrap().geometry();
        let Geometry::Segments(seams) = geometry else {
            panic!("seams are not segments");
        };
        // 90..=360 every 30 degrees is 10 angles, on two walls
        assert_eq!(seams.len(), 20);
        for [a, b] in &seams.segments {
            assert_eq!(a.z, 0.0);
            assert_eq!(b.z, config.length);
        }
    }

    #[test]
    fn test_fractional_step_closes_the_solid() {
        let config = HollowCylinderConfig {
            section_angle: 0.0,
            angle_step: 7.2,
            ..Default::default()
        };
        let cylinder = HollowCylinder::build(config.clone()).unwrap();
        let external = mesh_of(&cylinder, "external");
        assert_eq!(external.triangle_count(), 100);

        let geometry = cylinder.model().part("wire.rim.outer.bottom").unwrap().geometry();
        let Geometry::Segments(rim) = geometry else {
            panic!("rim is not segments");
        };
        assert_eq!(rim.len(), 50);
        let last = rim.segments[rim.len() - 1][1];
        // last sample of the bottom row
        let wall_end = external.position(external.vertex_count() / 2 - 1);
        assert_eq!(last, wall_end);
        assert_eq!(last, Frame::point(config.outer_diameter / 2.0, END_ANGLE, 0.0));

        let mut scene = crate::scene::Scene::new();
        cylinder.model().add_to_scene(&mut scene).unwrap();
        assert_eq!(scene.len(), 13);
    }

    #[test]
    fn test_rims_end_on_the_section_plane() {
        let config = HollowCylinderConfig::default();
        let cylinder = HollowCylinder::build(config.clone()).unwrap();
        for name in ["wire.rim.outer.top", "wire.rim.inner.bottom"] {
            let Geometry::Segments(rim) = cylinder.model().part(name).unwrap().geometry() else {
                panic!("{name} is not segments");
            };
            assert_eq!(rim.len(), 27, "{name}");
            let first = rim.segments[0][0];
            let last = rim.segments[rim.len() - 1][1];
            // 90 degrees starts on the y axis, 360 ends on the x axis
            assert_relative_eq!(first.x, 0.0, epsilon = 1e-5);
            assert_relative_eq!(last.y, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rejects_steps_that_overrun_the_section() {
        let bad = [
            HollowCylinderConfig {
                section_angle: 85.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                section_angle: 355.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                seam_step: 40.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                angle_step: f32::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            let err = HollowCylinder::build(config.clone()).unwrap_err();
            assert!(matches!(err, GeometryError::Configuration(_)), "{config:?}");
        }
        let narrow = HollowCylinderConfig {
            section_angle: 355.0,
            angle_step: 5.0,
            seam_step: 5.0,
            ..Default::default()
        };
        assert_eq!(narrow.angle_cells().unwrap(), 1);
        HollowCylinder::build(narrow).unwrap();
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            HollowCylinderConfig {
                inner_diameter: 12.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                length: 0.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                angle_step: 0.0,
                ..Default::default()
            },
            HollowCylinderConfig {
                section_angle: 360.0,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                HollowCylinder::build(config),
                Err(GeometryError::Configuration(_))
            ));
        }
    }
}
