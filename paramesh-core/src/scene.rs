//! Minimal scene graph that renderers consume.
//!
//! Nodes are shared between the part that owns them and the scene they are
//! attached to, so visibility and transform changes made through a part are
//! seen by the renderer without copying. Geometry and material are fixed at
//! construction; only the small `Copy` state lives in cells.
use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{LineSegments, PointCloud, Polyline, TessellatedMesh};
use crate::transform::TransformNode;

/// Number of render layers a node can be assigned to.
pub const LAYER_COUNT: u8 = 32;

/// 24-bit RGB color, e.g. `Color(0xff2222)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

/// Shading parameters handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
            ..Self::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            double_sided: true,
        }
    }
}

/// What a node draws.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Indexed triangles.
    Mesh(TessellatedMesh),
    /// Disconnected segments.
    Segments(LineSegments),
    /// One connected line.
    Strip(Polyline),
    /// Point markers.
    Points(PointCloud),
}

impl Geometry {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Mesh(mesh) => mesh.is_empty(),
            Geometry::Segments(segments) => segments.is_empty(),
            Geometry::Strip(line) => line.is_degenerate(),
            Geometry::Points(cloud) => cloud.is_empty(),
        }
    }
}

/// A renderable with its own transform and visibility.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub geometry: Geometry,
    pub material: Material,
    transform: Cell<TransformNode>,
    visible: Cell<bool>,
    /// Bit `n` set means the node is drawn on layer `n`.
    layers: Cell<u32>,
}

impl SceneNode {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            transform: Cell::new(TransformNode::identity()),
            visible: Cell::new(true),
            layers: Cell::new(1),
        }
    }

    pub fn transform(&self) -> TransformNode {
        self.transform.get()
    }

    pub fn set_transform(&self, transform: TransformNode) {
        self.transform.set(transform);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn layers(&self) -> u32 {
        self.layers.get()
    }

    pub fn set_layers(&self, layers: u32) {
        self.layers.set(layers);
    }

    pub fn on_layer(&self, layer: u8) -> bool {
        layer < LAYER_COUNT && self.layers.get() & (1 << layer) != 0
    }
}

pub type NodeHandle = Rc<SceneNode>;

pub fn node_handle(node: SceneNode) -> NodeHandle {
    Rc::new(node)
}

/// The set of nodes a renderer draws each frame.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<NodeHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a node. Returns `false` if it was already attached.
    pub fn add(&mut self, node: &NodeHandle) -> bool {
        if self.contains(node) {
            return false;
        }
        self.nodes.push(Rc::clone(node));
        true
    }

    /// Detach a node. Returns `false` if it was not attached.
    pub fn remove(&mut self, node: &NodeHandle) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| !Rc::ptr_eq(n, node));
        self.nodes.len() != before
    }

    pub fn contains(&self, node: &NodeHandle) -> bool {
        self.nodes.iter().any(|n| Rc::ptr_eq(n, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeHandle> {
        self.nodes.iter()
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &NodeHandle> {
        self.nodes.iter().filter(|n| n.is_visible())
    }

    pub fn visible_nodes_on(&self, layer: u8) -> impl Iterator<Item = &NodeHandle> {
        self.visible_nodes().filter(move |n| n.on_layer(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn line_node() -> NodeHandle {
        let line = Polyline::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        node_handle(SceneNode::new(Geometry::Strip(line), Material::default()))
    }

    #[test]
    fn test_add_is_guarded() {
        let mut scene = Scene::new();
        let node = line_node();
        assert!(scene.add(&node));
        assert!(!scene.add(&node));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut scene = Scene::new();
        let a = line_node();
        let b = line_node();
        scene.add(&a);
        scene.add(&b);
        assert!(scene.remove(&a));
        assert!(!scene.remove(&a));
        assert!(scene.contains(&b));
    }

    #[test]
    fn test_visibility_and_layers() {
        let mut scene = Scene::new();
        let a = line_node();
        let b = line_node();
        scene.add(&a);
        scene.add(&b);
        b.set_visible(false);
        assert_eq!(scene.visible_nodes().count(), 1);

        a.set_layers(1 << 3);
        assert_eq!(scene.visible_nodes_on(0).count(), 0);
        assert_eq!(scene.visible_nodes_on(3).count(), 1);
    }

    #[test]
    fn test_color_channels() {
        assert_eq!(Color(0x003356).rgb(), (0x00, 0x33, 0x56));
    }

    #[test]
    fn test_material_from_json_fills_defaults() {
        let material: Material = serde_json::from_str(r#"{"color": 16711680}"#).unwrap();
        assert_eq!(material.color, Color(0xff0000));
        assert_eq!(material.opacity, 1.0);
        assert!(material.double_sided);
    }
}
