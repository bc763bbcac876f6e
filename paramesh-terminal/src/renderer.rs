//! ASCII rasterizer for terminal rendering of scene nodes
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

use paramesh_core::{Geometry, Scene, SceneNode, TessellatedMesh, Transform};

use crate::camera::Camera;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lines win depth ties against the faces they outline.
const LINE_DEPTH_BIAS: f32 = 1e-3;

const MARKER_CHAR: char = 'o';

/// ASCII renderer that converts scene nodes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            light_dir: Vector3::new(0.3, 0.5, 1.0).normalize(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character drawn at a cell, for inspection.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Rasterize every visible node of the scene.
    pub fn render_scene(&mut self, scene: &Scene, camera: &Camera) {
        let view_projection = camera.projection_matrix() * camera.view_matrix();
        for node in scene.visible_nodes() {
            self.render_node(node, &view_projection, camera);
        }
    }

    fn render_node(&mut self, node: &SceneNode, view_projection: &Matrix4<f32>, camera: &Camera) {
        let transform = node.transform();
        let mvp = view_projection * transform.model_matrix();
        let (r, g, b) = node.material.color.rgb();
        let color = Color::Rgb { r, g, b };

        match &node.geometry {
            Geometry::Mesh(mesh) => {
                let rotation = Transform::rotation_matrix(&transform.rotation);
                self.render_mesh(mesh, &mvp, &rotation, camera, color, node.material.double_sided);
            }
            Geometry::Segments(segments) => {
                for [a, b] in &segments.segments {
                    self.draw_line(a, b, &mvp, camera, color);
                }
            }
            Geometry::Strip(line) => {
                for pair in line.points.windows(2) {
                    self.draw_line(&pair[0], &pair[1], &mvp, camera, color);
                }
            }
            Geometry::Points(cloud) => {
                let (w, h) = (self.width as u32, self.height as u32);
                for point in &cloud.points {
                    if let Some((x, y, depth)) = camera.project_to_screen(point, &mvp, w, h) {
                        // Markers sit on top of the line they decorate
                        self.plot(x.floor() as i32, y.floor() as i32, depth - 2.0 * LINE_DEPTH_BIAS, MARKER_CHAR, color);
                    }
                }
            }
        }
    }

    fn render_mesh(
        &mut self,
        mesh: &TessellatedMesh,
        mvp: &Matrix4<f32>,
        rotation: &Matrix4<f32>,
        camera: &Camera,
        color: Color,
        double_sided: bool,
    ) {
        for triangle in mesh.triangles() {
            // Project vertices to screen space
            let mut screen_coords = [(0.0, 0.0, 0.0); 3];
            let mut clipped = false;
            for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
                match camera.project_to_screen(&vertex.position, mvp, self.width as u32, self.height as u32) {
                    Some(coords) => *slot = coords,
                    None => clipped = true,
                }
            }
            if clipped {
                continue; // Triangle is clipped
            }

            // Shade with the supplied normals, falling back to the face normal
            let Some(normal) = triangle.shading_normal().or_else(|| triangle.calculate_normal()) else {
                continue;
            };
            let normal = rotation.transform_vector(&normal);
            let lambert = normal.dot(&self.light_dir);
            let brightness = if double_sided { lambert.abs() } else { lambert.max(0.0) };

            // Map brightness to character, keeping lit faces visible
            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
            let character = LUMINOSITY_RAMP[char_index];

            self.rasterize_triangle(&screen_coords, character, color);
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, a: &Point3<f32>, b: &Point3<f32>, mvp: &Matrix4<f32>, camera: &Camera, color: Color) {
        let (w, h) = (self.width as u32, self.height as u32);
        let (Some(p0), Some(p1)) = (
            camera.project_to_screen(a, mvp, w, h),
            camera.project_to_screen(b, mvp, w, h),
        ) else {
            return;
        };

        let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
        let character = line_char(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = p0.0 + dx * t;
            let y = p0.1 + dy * t;
            let depth = p0.2 + (p1.2 - p0.2) * t - LINE_DEPTH_BIAS;
            self.plot(x.floor() as i32, y.floor() as i32, depth, character, color);
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pick a glyph that follows the on-screen direction of a line.
fn line_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > 2.0 * ay {
        '-'
    } else if ay > 2.0 * ax {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
