//! Multi-part models that move as one.
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::part::Part;
use crate::scene::{Scene, LAYER_COUNT};
use crate::transform::TransformNode;

/// Named parts sharing one aggregate transform.
///
/// Every set/increment call updates the aggregate and copies it to each
/// part's transform node, so parts never drift apart.
#[derive(Debug, Default)]
pub struct CompositeModel {
    parts: BTreeMap<String, Part>,
    transform: TransformNode,
    layer: u8,
}

impl CompositeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `part` under `name`.
    ///
    /// Empty names and names already in use are rejected without touching
    /// the registered parts.
    pub fn add_part(&mut self, name: impl Into<String>, part: impl Into<Part>) -> Result<&Part> {
        let name = name.into();
        if name.is_empty() {
            return Err(GeometryError::InvalidName);
        }
        if self.parts.contains_key(&name) {
            return Err(GeometryError::DuplicateName(name));
        }

        let part = part.into();
        part.set_transform(self.transform);
        part.set_layers(1 << self.layer);
        Ok(self.parts.entry(name).or_insert(part))
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn parts(&self) -> impl Iterator<Item = (&str, &Part)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Show or hide one part. Unknown names are ignored.
    pub fn set_part_enabled(&self, name: &str, enabled: bool) {
        match self.parts.get(name) {
            Some(part) => part.set_enabled(enabled),
            None => debug!(name, "ignoring visibility change for unknown part"),
        }
    }

    pub fn is_part_enabled(&self, name: &str) -> Option<bool> {
        self.parts.get(name).map(Part::is_enabled)
    }

    pub fn transform(&self) -> &TransformNode {
        &self.transform
    }

    pub fn set_position(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        self.transform.set_position(x, y, z);
        self.push_transform();
    }

    pub fn inc_position(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.transform.inc_position(dx, dy, dz);
        self.push_transform();
    }

    pub fn set_rotation(&mut self, rx: Option<f32>, ry: Option<f32>, rz: Option<f32>) {
        self.transform.rotation.set_axes(rx, ry, rz);
        self.push_transform();
    }

    pub fn inc_rotation(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.transform.rotation.inc_axes(dx, dy, dz);
        self.push_transform();
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_scale(x, y, z);
        self.push_transform();
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }

    /// Move every part onto render layer `layer` (0..=31).
    pub fn set_layer(&mut self, layer: u8) -> Result<()> {
        if layer >= LAYER_COUNT {
            return Err(GeometryError::InvalidLayer(layer));
        }
        self.layer = layer;
        for part in self.parts.values() {
            part.set_layers(1 << layer);
        }
        Ok(())
    }

    /// Attach every part to `scene`.
    ///
    /// All parts are checked first, so a part without geometry leaves the
    /// scene untouched. Parts already attached are not added again.
    pub fn add_to_scene(&self, scene: &mut Scene) -> Result<()> {
        for (name, part) in &self.parts {
            part.check_geometry().map_err(|err| match err {
                GeometryError::MissingGeometry(msg) => {
                    GeometryError::MissingGeometry(format!("{name}: {msg}"))
                }
                other => other,
            })?;
        }
        for part in self.parts.values() {
            part.attach_to_scene(scene)?;
        }
        Ok(())
    }

    /// Detach every part from `scene`.
    pub fn remove_from_scene(&self, scene: &mut Scene) {
        for part in self.parts.values() {
            part.detach_from_scene(scene);
        }
    }

    fn push_transform(&self) {
        for part in self.parts.values() {
            part.set_transform(self.transform);
        }
    }
}
