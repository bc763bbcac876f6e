//! Renderable parts owned by a composite model.
use nalgebra::Point3;

use crate::curve::ParametricCurve;
use crate::edges::{extract_sharp_edges, DEFAULT_THRESHOLD_DEGREES};
use crate::error::{GeometryError, Result};
use crate::geometry::{LineSegments, PointCloud, Polyline, TessellatedMesh};
use crate::scene::{node_handle, Color, Geometry, Material, NodeHandle, Scene, SceneNode};
use crate::transform::TransformNode;

/// A shaded triangle mesh.
#[derive(Debug, Clone)]
pub struct SolidPart {
    node: NodeHandle,
}

impl SolidPart {
    pub fn new(mesh: TessellatedMesh, material: Material) -> Self {
        Self {
            node: node_handle(SceneNode::new(Geometry::Mesh(mesh), material)),
        }
    }
}

/// The sharp-edge outline of a mesh, drawn as line segments.
#[derive(Debug, Clone)]
pub struct WireframePart {
    node: NodeHandle,
}

impl WireframePart {
    /// Outline `source` with the default crease angle.
    ///
    /// With `show_material` false the lines are drawn translucent at
    /// `opacity`.
    pub fn new(source: &TessellatedMesh, color: Color, show_material: bool, opacity: f32) -> Self {
        Self::with_threshold(source, DEFAULT_THRESHOLD_DEGREES, color, show_material, opacity)
    }

    pub fn with_threshold(
        source: &TessellatedMesh,
        threshold_degrees: f32,
        color: Color,
        show_material: bool,
        opacity: f32,
    ) -> Self {
        let edges = extract_sharp_edges(source, threshold_degrees);
        let material = Material {
            color,
            opacity,
            transparent: !show_material,
            double_sided: true,
        };
        Self {
            node: node_handle(SceneNode::new(Geometry::Segments(edges), material)),
        }
    }
}

/// Marker size used when none is given, in world units.
pub const DEFAULT_MARKER_SIZE: f32 = 0.1;

/// A line built directly from points, optionally with a marker on every
/// point.
#[derive(Debug, Clone)]
pub struct LinePart {
    node: NodeHandle,
    markers: Option<NodeHandle>,
}

impl LinePart {
    /// Connected line through every point.
    pub fn strip(line: Polyline, color: Color) -> Self {
        Self::from_geometry(Geometry::Strip(line), color)
    }

    /// Disconnected segments.
    pub fn segments(segments: LineSegments, color: Color) -> Self {
        Self::from_geometry(Geometry::Segments(segments), color)
    }

    /// Sample `f` over `[min_t, max_t]` into a connected line.
    pub fn from_curve<F>(f: F, min_t: f32, max_t: f32, step_t: f32, color: Color) -> Result<Self>
    where
        F: Fn(f32) -> Point3<f32>,
    {
        let curve = ParametricCurve::new(f, min_t, max_t, step_t)?;
        Ok(Self::strip(curve.sample(), color))
    }

    /// Draw a marker of `size` on every point of the line. Markers take the
    /// line color unless `color` is given.
    pub fn with_markers(mut self, color: Option<Color>, size: f32) -> Self {
        let points = match &self.node.geometry {
            Geometry::Strip(line) => line.points.clone(),
            Geometry::Segments(segments) => segments.segments.iter().flatten().copied().collect(),
            Geometry::Mesh(_) | Geometry::Points(_) => Vec::new(),
        };
        let color = color.unwrap_or(self.node.material.color);
        let node = SceneNode::new(Geometry::Points(PointCloud::new(points, size)), Material::solid(color));
        node.set_transform(self.node.transform());
        node.set_layers(self.node.layers());
        node.set_visible(self.node.is_visible());
        self.markers = Some(node_handle(node));
        self
    }

    pub fn has_markers(&self) -> bool {
        self.markers.is_some()
    }

    fn from_geometry(geometry: Geometry, color: Color) -> Self {
        Self {
            node: node_handle(SceneNode::new(geometry, Material::solid(color))),
            markers: None,
        }
    }
}

/// A named, independently visible renderable.
#[derive(Debug, Clone)]
pub enum Part {
    Solid(SolidPart),
    Wireframe(WireframePart),
    Line(LinePart),
}

impl Part {
    /// The node holding the part's main geometry.
    fn node(&self) -> &NodeHandle {
        match self {
            Part::Solid(p) => &p.node,
            Part::Wireframe(p) => &p.node,
            Part::Line(p) => &p.node,
        }
    }

    /// Every node the part puts in a scene.
    fn nodes(&self) -> impl Iterator<Item = &NodeHandle> {
        let markers = match self {
            Part::Line(p) => p.markers.as_ref(),
            _ => None,
        };
        std::iter::once(self.node()).chain(markers)
    }

    fn kind(&self) -> &'static str {
        match self {
            Part::Solid(_) => "solid",
            Part::Wireframe(_) => "wireframe",
            Part::Line(_) => "line",
        }
    }

    /// Fails with `MissingGeometry` when there is nothing to draw.
    pub fn check_geometry(&self) -> Result<()> {
        if self.node().geometry.is_empty() {
            return Err(GeometryError::MissingGeometry(format!(
                "{} part has no geometry",
                self.kind()
            )));
        }
        Ok(())
    }

    /// Attach the renderable to `scene`. Attaching twice is a no-op.
    pub fn attach_to_scene(&self, scene: &mut Scene) -> Result<()> {
        self.check_geometry()?;
        for node in self.nodes() {
            scene.add(node);
        }
        Ok(())
    }

    pub fn detach_from_scene(&self, scene: &mut Scene) -> bool {
        let mut removed = false;
        for node in self.nodes() {
            removed |= scene.remove(node);
        }
        removed
    }

    pub fn set_enabled(&self, enabled: bool) {
        for node in self.nodes() {
            node.set_visible(enabled);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.node().is_visible()
    }

    pub fn set_transform(&self, transform: TransformNode) {
        for node in self.nodes() {
            node.set_transform(transform);
        }
    }

    pub fn transform(&self) -> TransformNode {
        self.node().transform()
    }

    pub(crate) fn set_layers(&self, layers: u32) {
        for node in self.nodes() {
            node.set_layers(layers);
        }
    }

    /// What the part draws. Geometry never changes after construction.
    pub fn geometry(&self) -> &Geometry {
        &self.node().geometry
    }

    pub fn material(&self) -> Material {
        self.node().material
    }
}

impl From<SolidPart> for Part {
    fn from(part: SolidPart) -> Self {
        Part::Solid(part)
    }
}

impl From<WireframePart> for Part {
    fn from(part: WireframePart) -> Self {
        Part::Wireframe(part)
    }
}

impl From<LinePart> for Part {
    fn from(part: LinePart) -> Self {
        Part::Line(part)
    }
}
