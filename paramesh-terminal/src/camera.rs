//! Orbit camera and projection for the terminal viewer.
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// A stored eye/target pair the camera can return to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPosition {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraPosition {
    pub fn new(eye: Point3<f32>, target: Point3<f32>) -> Self {
        Self { eye, target }
    }
}

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;
const MIN_DISTANCE: f32 = 1.0;
const MAX_PITCH: f32 = 1.5;

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
    default_position: CameraPosition,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let default_position = CameraPosition::new(Point3::new(0.0, 0.0, 18.0), Point3::origin());
        Self {
            position: default_position.eye,
            target: default_position.target,
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 * CELL_ASPECT / height.max(1) as f32,
            near: 0.1,
            far: 200.0,
            mode: ProjectionMode::Perspective,
            default_position,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 * CELL_ASPECT / height.max(1) as f32;
    }

    /// Remember `position` as the place [`Self::reset_to_default_position`] returns to.
    pub fn set_default_position(&mut self, position: CameraPosition) {
        self.default_position = position;
    }

    pub fn reset_to_default_position(&mut self) {
        self.position = self.default_position.eye;
        self.target = self.default_position.target;
    }

    /// Rotate the eye around the target by yaw (about the up axis) and pitch.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }
        let yaw = offset.x.atan2(offset.z) + d_yaw;
        let pitch = ((offset.y / radius).asin() + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
        let eye = Vector3::new(
            radius * pitch.cos() * yaw.sin(),
            radius * pitch.sin(),
            radius * pitch.cos() * yaw.cos(),
        );
        self.position = self.target + eye;
    }

    /// Scale the eye-target distance by `factor`.
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        let distance = (offset.norm() * factor).clamp(MIN_DISTANCE, self.far * 0.5);
        if let Some(dir) = offset.try_normalize(f32::EPSILON) {
            self.position = self.target + dir * distance;
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a 3D point to screen space.
    ///
    /// Returns `(x, y, depth)` with depth in normalized device units, or
    /// `None` when the point is behind the camera or outside the frustum.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        mvp: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip: Vector4<f32> = mvp * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Clip test
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) || !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
