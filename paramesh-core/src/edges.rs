//! Sharp-edge extraction for wireframe overlays.
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::geometry::{LineSegments, TessellatedMesh};

/// Default crease angle, in degrees, above which a shared edge is drawn.
pub const DEFAULT_THRESHOLD_DEGREES: f32 = 1.0;

/// Positions closer than this are welded when matching edges.
const WELD_PRECISION: f32 = 1e-4;

type Key = [i64; 3];

struct OpenEdge {
    start: Point3<f32>,
    end: Point3<f32>,
    normal: Vector3<f32>,
}

fn weld_key(p: &Point3<f32>) -> Key {
    let scale = 1.0 / WELD_PRECISION;
    [
        (p.x * scale).round() as i64,
        (p.y * scale).round() as i64,
        (p.z * scale).round() as i64,
    ]
}

/// Extract the outline of a mesh as disconnected segments.
///
/// An edge shared by two faces is kept when the angle between the face
/// normals is at least `threshold_degrees`. Edges used by a single face are
/// always kept. Vertices are matched by position, so meshes that duplicate
/// rows (as strip tessellation does) still pair their interior edges.
pub fn extract_sharp_edges(mesh: &TessellatedMesh, threshold_degrees: f32) -> LineSegments {
    let threshold_dot = threshold_degrees.to_radians().cos();

    // Unmatched edges in first-seen order; `None` once paired.
    let mut open: Vec<Option<OpenEdge>> = Vec::new();
    let mut lookup: HashMap<(Key, Key), usize> = HashMap::new();
    let mut out = LineSegments::new();

    for triangle in mesh.triangles() {
        let positions = triangle.vertices.map(|v| v.position);
        let keys = positions.map(|p| weld_key(&p));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }
        let Some(normal) = triangle.calculate_normal() else {
            continue;
        };

        for j in 0..3 {
            let next = (j + 1) % 3;
            let forward = (keys[j], keys[next]);
            let reverse = (keys[next], keys[j]);

            match lookup.get(&reverse).map(|&slot| open[slot].take()) {
                Some(Some(other)) => {
                    if normal.dot(&other.normal) <= threshold_dot {
                        out.push(other.start, other.end);
                    }
                }
                _ => {
                    if !lookup.contains_key(&forward) {
                        lookup.insert(forward, open.len());
                        open.push(Some(OpenEdge {
                            start: positions[j],
                            end: positions[next],
                            normal,
                        }));
                    }
                }
            }
        }
    }

    for edge in open.into_iter().flatten() {
        out.push(edge.start, edge.end);
    }

    debug!(segments = out.len(), "extracted sharp edges");
    out
}
