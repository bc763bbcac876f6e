//! Parametric surface tessellation.
//!
//! A surface is described by a position function and an independent normal
//! function over a rectangular `(u, v)` domain. The domain is walked in
//! strips of constant `v`; each strip emits its own lower and upper row of
//! vertices and two triangles per `u` cell.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{GeometryError, Result};
use crate::geometry::TessellatedMesh;
use crate::sampling::{check_axis, count_below, param_at};

/// Rectangular sampling domain with independent per-axis steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min_u: f32,
    pub max_u: f32,
    pub step_u: f32,
    pub min_v: f32,
    pub max_v: f32,
    pub step_v: f32,
}

impl Domain {
    pub fn new(min_u: f32, max_u: f32, step_u: f32, min_v: f32, max_v: f32, step_v: f32) -> Result<Self> {
        let domain = Self {
            min_u,
            max_u,
            step_u,
            min_v,
            max_v,
            step_v,
        };
        domain.validate()?;
        Ok(domain)
    }

    pub fn validate(&self) -> Result<()> {
        check_axis("u", self.min_u, self.max_u, self.step_u)?;
        check_axis("v", self.min_v, self.max_v, self.step_v)?;
        if self.max_u <= self.min_u || self.max_v <= self.min_v {
            return Err(GeometryError::config(format!(
                "empty domain u=[{}, {}] v=[{}, {}]",
                self.min_u, self.max_u, self.min_v, self.max_v
            )));
        }
        // The sample counts themselves are bounded as well.
        self.u_cells()?;
        self.v_strips()?;
        Ok(())
    }

    /// Number of quads along `u`: one per sample `u < max_u`. A sample that
    /// misses `max_u` only by rounding is not a cell.
    pub fn u_cells(&self) -> Result<usize> {
        count_below("u", self.min_u, self.max_u, self.step_u)
    }

    /// Number of strips along `v`: one per sample `v < max_v`.
    pub fn v_strips(&self) -> Result<usize> {
        count_below("v", self.min_v, self.max_v, self.step_v)
    }

    /// Samples in one row: every cell corner, the last one being the overrun
    /// sample at or beyond `max_u` that closes the final cell.
    pub fn row_len(&self) -> Result<usize> {
        Ok(self.u_cells()? + 1)
    }
}

/// Position and normal samples for one value of `v`.
#[derive(Debug, Clone)]
struct Row {
    points: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
}

/// A surface defined by a position function and a normal function.
///
/// Both functions must be pure: rows shared by adjacent strips are sampled
/// once and reused.
pub struct ParametricSurface<P, N> {
    position: P,
    normal: N,
    domain: Domain,
}

impl<P, N> ParametricSurface<P, N>
where
    P: Fn(f32, f32) -> Point3<f32>,
    N: Fn(f32, f32) -> Vector3<f32>,
{
    pub fn new(position: P, normal: N, domain: Domain) -> Result<Self> {
        domain.validate()?;
        Ok(Self {
            position,
            normal,
            domain,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Tessellate the domain into an indexed triangle mesh.
    ///
    /// Vertex indices are local to each strip: a row bordering two strips is
    /// written to the buffer once per strip. For cell `iu` of a strip with
    /// base vertex `b` and row width `w` the corners are
    /// `i0 = b + iu`, `i1 = i0 + 1`, `i2 = b + iu + 1 + w`, `i3 = b + iu + w`
    /// and the emitted triangles are `(i0, i1, i2)` and `(i0, i2, i3)`.
    #[instrument(skip(self), fields(domain = ?self.domain))]
    pub fn tessellate(&self) -> Result<TessellatedMesh> {
        let d = &self.domain;
        let cells = d.u_cells()?;
        let strips = d.v_strips()?;
        let width = cells + 1;

        let mut mesh = TessellatedMesh::with_capacity(2 * width * strips, 2 * cells * strips);
        let mut carried: Option<Row> = None;

        for iv in 0..strips {
            let lower = match carried.take() {
                Some(row) => row,
                None => self.sample_row(param_at(d.min_v, d.step_v, iv), width),
            };
            let upper = self.sample_row(param_at(d.min_v, d.step_v, iv + 1), width);

            let base = mesh.vertex_count() as u32;
            push_row(&mut mesh, &lower);
            push_row(&mut mesh, &upper);

            let w = width as u32;
            for iu in 0..cells as u32 {
                let i0 = base + iu;
                let i1 = i0 + 1;
                let i2 = base + (iu + 1) + w;
                let i3 = base + iu + w;
                mesh.push_triangle(i0, i1, i2);
                mesh.push_triangle(i0, i2, i3);
            }

            carried = Some(upper);
        }

        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "tessellated parametric surface"
        );
        Ok(mesh)
    }

    fn sample_row(&self, v: f32, width: usize) -> Row {
        let d = &self.domain;
        let mut points = Vec::with_capacity(width);
        let mut normals = Vec::with_capacity(width);
        for iu in 0..width {
            let u = param_at(d.min_u, d.step_u, iu);
            points.push((self.position)(u, v));
            normals.push((self.normal)(u, v));
        }
        Row { points, normals }
    }
}

fn push_row(mesh: &mut TessellatedMesh, row: &Row) {
    for (p, n) in row.points.iter().zip(&row.normals) {
        mesh.push_vertex(*p, *n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane(u: f32, v: f32) -> Point3<f32> {
        Point3::new(u, v, 0.0)
    }

    fn up(_u: f32, _v: f32) -> Vector3<f32> {
        Vector3::z()
    }

    #[test]
    fn test_unit_square_single_cell() {
        let domain = Domain::new(0.0, 1.0, 1.0, 0.0, 1.0, 1.0).unwrap();
        let mesh = ParametricSurface::new(plane, up, domain).unwrap().tessellate().unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 3, 0, 3, 2]);
        assert_eq!(mesh.position(3), Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_winding_faces_the_supplied_normal() {
        let domain = Domain::new(0.0, 2.0, 1.0, 0.0, 2.0, 1.0).unwrap();
        let mesh = ParametricSurface::new(plane, up, domain).unwrap().tessellate().unwrap();
        for tri in mesh.triangles() {
            let face = tri.calculate_normal().unwrap();
            assert!(face.dot(&tri.vertices[0].normal) > 0.0);
        }
    }

    #[test]
    fn test_strips_duplicate_shared_rows() {
        let domain = Domain::new(0.0, 3.0, 1.0, 0.0, 2.0, 1.0).unwrap();
        let mesh = ParametricSurface::new(plane, up, domain).unwrap().tessellate().unwrap();
        // 2 strips, 4 samples per row, two rows per strip
        assert_eq!(mesh.vertex_count(), 2 * 2 * 4);
        assert_eq!(mesh.triangle_count(), 2 * 3 * 2);
        // the upper row of strip 0 is the lower row of strip 1
        for i in 0..4 {
            assert_eq!(mesh.position(4 + i), mesh.position(8 + i));
        }
        // strip 1 indexes only its own block
        let strip1 = &mesh.indices[18..];
        assert!(strip1.iter().all(|&i| (8..16).contains(&i)));
    }

    #[test]
    fn test_uneven_domain_is_closed_by_overrun_sample() {
        let domain = Domain::new(0.0, 10.0, 3.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(domain.u_cells().unwrap(), 4);
        let mesh = ParametricSurface::new(plane, up, domain).unwrap().tessellate().unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 5);
        assert_relative_eq!(mesh.position(4).x, 12.0);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_fractional_steps_count_whole_cells() {
        for n in 1..40u32 {
            for span in [0.1f32, 0.7, 1.0, 2.3, 5.9] {
                let step = span / n as f32;
                let domain = Domain::new(-span / 2.0, span / 2.0, step, 0.0, span, step).unwrap();
                assert_eq!(domain.u_cells().unwrap(), n as usize, "span {span} n {n}");
                assert_eq!(domain.v_strips().unwrap(), n as usize, "span {span} n {n}");
            }
        }
    }

    #[test]
    fn test_v_strips_stop_at_max() {
        let domain = Domain::new(0.0, 1.0, 1.0, 0.0, 1.0, 0.4).unwrap();
        assert_eq!(domain.v_strips().unwrap(), 3);
        let mesh = ParametricSurface::new(plane, up, domain).unwrap().tessellate().unwrap();
        assert_eq!(mesh.triangle_count(), 2 * 1 * 3);
        // the last upper row overruns max_v
        let top = mesh.position(mesh.vertex_count() - 1);
        assert_relative_eq!(top.y, 1.2, epsilon = 1e-5);
    }

    #[test]
    fn test_cylinder_row_closes_circle() {
        let r = 3.0;
        let domain = Domain::new(0.0, 360.0, 90.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(domain.row_len().unwrap(), 5);
        let surface = ParametricSurface::new(
            |u: f32, v: f32| {
                let a = u.to_radians();
                Point3::new(r * a.cos(), r * a.sin(), v)
            },
            |u: f32, _v: f32| {
                let a = u.to_radians();
                Vector3::new(a.cos(), a.sin(), 0.0)
            },
            domain,
        )
        .unwrap();
        let mesh = surface.tessellate().unwrap();
        let first = mesh.position(0);
        let last = mesh.position(4);
        assert_relative_eq!(first.x, last.x, epsilon = 1e-5);
        assert_relative_eq!(first.y, last.y, epsilon = 1e-5);
        assert_eq!(mesh.triangle_count(), 2 * 4);
    }

    #[test]
    fn test_normals_come_from_normal_function() {
        let domain = Domain::new(0.0, 1.0, 0.5, 0.0, 1.0, 0.5).unwrap();
        let inward = |_u: f32, _v: f32| -Vector3::z();
        let mesh = ParametricSurface::new(plane, inward, domain).unwrap().tessellate().unwrap();
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for i in 0..mesh.vertex_count() {
            assert_eq!(mesh.normal(i), -Vector3::z());
        }
    }

    #[test]
    fn test_rejects_invalid_domains() {
        assert!(matches!(
            Domain::new(0.0, 1.0, 0.0, 0.0, 1.0, 1.0),
            Err(GeometryError::Configuration(_))
        ));
        assert!(matches!(
            Domain::new(0.0, 1.0, 1.0, 0.0, 1.0, -1.0),
            Err(GeometryError::Configuration(_))
        ));
        assert!(matches!(
            Domain::new(1.0, 1.0, 1.0, 0.0, 1.0, 1.0),
            Err(GeometryError::Configuration(_))
        ));
        assert!(matches!(
            Domain::new(0.0, 1.0, 1e-9, 0.0, 1.0, 1.0),
            Err(GeometryError::Configuration(_))
        ));
    }

    #[test]
    fn test_unvalidated_domain_rejected_by_surface() {
        let domain = Domain {
            min_u: 0.0,
            max_u: 1.0,
            step_u: 0.0,
            min_v: 0.0,
            max_v: 1.0,
            step_v: 1.0,
        };
        assert!(ParametricSurface::new(plane, up, domain).is_err());
    }
}
