//! 3D transformation matrices, rotation state and per-renderable transform nodes
use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Overwrite the given axes, leaving `None` axes untouched.
    pub fn set_axes(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        assign(&mut self.x, x);
        assign(&mut self.y, y);
        assign(&mut self.z, z);
    }

    /// Add deltas to the given axes, leaving `None` axes untouched.
    pub fn inc_axes(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.rotate(dx.unwrap_or(0.0), dy.unwrap_or(0.0), dz.unwrap_or(0.0));
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

fn assign(target: &mut f32, value: Option<f32>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Position, rotation and scale of one renderable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformNode {
    pub position: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl TransformNode {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn set_position(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        assign(&mut self.position.x, x);
        assign(&mut self.position.y, y);
        assign(&mut self.position.z, z);
    }

    pub fn inc_position(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.position.x += dx.unwrap_or(0.0);
        self.position.y += dy.unwrap_or(0.0);
        self.position.z += dz.unwrap_or(0.0);
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vector3::new(x, y, z);
    }

    /// Model matrix: translation * rotation * scale
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.position.x, self.position.y, self.position.z)
            * Transform::rotation_matrix(&self.rotation)
            * Transform::scale_matrix(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for TransformNode {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }
}
