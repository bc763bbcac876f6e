//! Mesh and line buffers produced by the samplers.
use nalgebra::{Point3, Vector3};

use crate::error::{GeometryError, Result};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Returns `None` for degenerate (zero-area) triangles.
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(f32::EPSILON)
    }

    /// Average of the supplied vertex normals, normalized.
    pub fn shading_normal(&self) -> Option<Vector3<f32>> {
        let sum: Vector3<f32> = self.vertices.iter().map(|v| v.normal).sum();
        sum.try_normalize(f32::EPSILON)
    }
}

/// Indexed triangle mesh with flat buffers, ready for upload by a renderer.
///
/// `positions` and `normals` hold three floats per vertex, `indices` three
/// vertex indices per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TessellatedMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TessellatedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append one vertex and return its index.
    pub fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[position.x, position.y, position.z]);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        index
    }

    pub fn push_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let i = index * 3;
        Vector3::new(self.normals[i], self.normals[i + 1], self.normals[i + 2])
    }

    pub fn vertex(&self, index: usize) -> Vertex {
        Vertex::new(self.position(index), self.normal(index))
    }

    /// Expand the index buffer into standalone triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            Triangle::new(
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            )
        })
    }

    /// Concatenate `other` onto this mesh, offsetting its indices.
    pub fn append(&mut self, other: &TessellatedMesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Check the buffer invariants: parallel position/normal buffers, whole
    /// triangles, and every index in range.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 || self.positions.len() != self.normals.len() {
            return Err(GeometryError::MissingGeometry(format!(
                "{} position floats do not pair with {} normal floats",
                self.positions.len(),
                self.normals.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::MissingGeometry(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::MissingGeometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        Ok(())
    }
}

/// Ordered points forming a connected line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point3<f32>>,
}

impl Polyline {
    pub fn new(points: Vec<Point3<f32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A line needs at least two points to be drawn.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    /// Repeat the first point at the end, closing the loop.
    pub fn closed(mut self) -> Self {
        if let Some(&first) = self.points.first() {
            if self.points.len() > 1 && self.points.last() != Some(&first) {
                self.points.push(first);
            }
        }
        self
    }

    /// Split into one segment per consecutive pair of points.
    pub fn to_segments(&self) -> LineSegments {
        LineSegments {
            segments: self.points.windows(2).map(|w| [w[0], w[1]]).collect(),
        }
    }

    pub fn positions(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}

/// Disconnected line segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSegments {
    pub segments: Vec<[Point3<f32>; 2]>,
}

impl LineSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, a: Point3<f32>, b: Point3<f32>) {
        self.segments.push([a, b]);
    }

    pub fn extend(&mut self, other: LineSegments) {
        self.segments.extend(other.segments);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flat `[x0, y0, z0, x1, y1, z1, ...]` buffer, two points per segment.
    pub fn positions(&self) -> Vec<f32> {
        self.segments
            .iter()
            .flat_map(|[a, b]| [a.x, a.y, a.z, b.x, b.y, b.z])
            .collect()
    }
}

/// Points drawn as square markers of `size` world units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point3<f32>>,
    pub size: f32,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f32>>, size: f32) -> Self {
        Self { points, size }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TessellatedMesh {
        let mut mesh = TessellatedMesh::new();
        let n = Vector3::z();
        let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0), n);
        let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0), n);
        let c = mesh.push_vertex(Point3::new(1.0, 1.0, 0.0), n);
        let d = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0), n);
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
        mesh
    }

    #[test]
    fn test_push_and_count() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.position(2), Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = quad();
        mesh.append(&quad());
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(&mesh.indices[6..9], &[4, 5, 6]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mut mesh = quad();
        mesh.push_triangle(0, 1, 9);
        assert!(matches!(mesh.validate(), Err(GeometryError::MissingGeometry(_))));
    }

    #[test]
    fn test_triangle_normal() {
        let tri = quad().triangles().next().unwrap();
        let normal = tri.calculate_normal().unwrap();
        assert!((normal - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let v = Vertex::new(Point3::origin(), Vector3::z());
        assert!(Triangle::new(v, v, v).calculate_normal().is_none());
    }

    #[test]
    fn test_closed_polyline_segments() {
        let square = Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .closed();
        assert_eq!(square.len(), 5);
        let segments = square.to_segments();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments.positions().len(), 4 * 6);
    }
}
