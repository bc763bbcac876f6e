//! WASM bindings for paramesh composite models.
//!
//! Exposes the hollow cylinder as flat vertex/index buffers plus its
//! aggregate model matrix, so a WebGL or three.js front end can draw it.

use paramesh_core::{CompositeModel, Geometry, HollowCylinder, HollowCylinderConfig};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (sets up panic hook for better error messages).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Parse a JSON config; an empty string selects the defaults.
fn parse_config(config_json: &str) -> Result<HollowCylinderConfig, String> {
    if config_json.trim().is_empty() {
        return Ok(HollowCylinderConfig::default());
    }
    serde_json::from_str(config_json).map_err(|e| format!("invalid config: {e}"))
}

fn build_cylinder(config_json: &str) -> Result<HollowCylinder, String> {
    let config = parse_config(config_json)?;
    HollowCylinder::build(config).map_err(|e| e.to_string())
}

fn mesh_buffer<T>(model: &CompositeModel, name: &str, f: impl Fn(&paramesh_core::TessellatedMesh) -> Vec<T>) -> Option<Vec<T>> {
    match model.part(name)?.geometry() {
        Geometry::Mesh(mesh) => Some(f(mesh)),
        _ => None,
    }
}

fn line_buffer(model: &CompositeModel, name: &str) -> Option<Vec<f32>> {
    match model.part(name)?.geometry() {
        Geometry::Segments(segments) => Some(segments.positions()),
        Geometry::Strip(line) => Some(line.to_segments().positions()),
        Geometry::Mesh(_) | Geometry::Points(_) => None,
    }
}

/// A hollow cylinder with a section cut away.
///
/// Solid parts are fetched as indexed triangle buffers, outline parts as
/// line-segment position pairs. Every part shares [`Self::model_matrix`].
#[wasm_bindgen]
pub struct WasmHollowCylinder {
    inner: HollowCylinder,
}

#[wasm_bindgen]
impl WasmHollowCylinder {
    /// Build from a JSON config; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmHollowCylinder, JsValue> {
        let inner = build_cylinder(config_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(WasmHollowCylinder { inner })
    }

    /// All part names, sorted.
    #[wasm_bindgen(js_name = partNames)]
    pub fn part_names(&self) -> Vec<String> {
        self.inner.model().part_names().map(str::to_string).collect()
    }

    /// Names of the outline parts.
    #[wasm_bindgen(js_name = wireframeNames)]
    pub fn wireframe_names(&self) -> Vec<String> {
        self.inner.wireframe_names().to_vec()
    }

    /// Flat vertex positions of a solid part.
    pub fn positions(&self, name: &str) -> Option<Vec<f32>> {
        mesh_buffer(self.inner.model(), name, |mesh| mesh.positions.clone())
    }

    /// Flat vertex normals of a solid part.
    pub fn normals(&self, name: &str) -> Option<Vec<f32>> {
        mesh_buffer(self.inner.model(), name, |mesh| mesh.normals.clone())
    }

    /// Triangle indices of a solid part.
    pub fn indices(&self, name: &str) -> Option<Vec<u32>> {
        mesh_buffer(self.inner.model(), name, |mesh| mesh.indices.clone())
    }

    /// Segment endpoints of an outline part, two points per segment.
    #[wasm_bindgen(js_name = linePositions)]
    pub fn line_positions(&self, name: &str) -> Option<Vec<f32>> {
        line_buffer(self.inner.model(), name)
    }

    /// Packed `0xRRGGBB` color of a part.
    #[wasm_bindgen(js_name = partColor)]
    pub fn part_color(&self, name: &str) -> Option<u32> {
        self.inner.model().part(name).map(|part| part.material().color.0)
    }

    #[wasm_bindgen(js_name = partOpacity)]
    pub fn part_opacity(&self, name: &str) -> Option<f32> {
        self.inner.model().part(name).map(|part| part.material().opacity)
    }

    /// Column-major 4x4 model matrix shared by all parts.
    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self) -> Vec<f32> {
        self.inner.model().transform().model_matrix().as_slice().to_vec()
    }

    /// Column-major model matrix of one part.
    #[wasm_bindgen(js_name = partModelMatrix)]
    pub fn part_model_matrix(&self, name: &str) -> Option<Vec<f32>> {
        let part = self.inner.model().part(name)?;
        Some(part.transform().model_matrix().as_slice().to_vec())
    }

    #[wasm_bindgen(js_name = setPartEnabled)]
    pub fn set_part_enabled(&self, name: &str, enabled: bool) {
        if self.inner.model().part(name).is_none() {
            web_sys::console::warn_1(&format!("[paramesh] unknown part `{name}`").into());
            return;
        }
        self.inner.model().set_part_enabled(name, enabled);
    }

    #[wasm_bindgen(js_name = isPartEnabled)]
    pub fn is_part_enabled(&self, name: &str) -> Option<bool> {
        self.inner.model().is_part_enabled(name)
    }

    #[wasm_bindgen(js_name = setWireframeEnabled)]
    pub fn set_wireframe_enabled(&self, enabled: bool) {
        self.inner.set_wireframe_enabled(enabled);
    }

    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        self.inner.model_mut().set_position(x, y, z);
    }

    #[wasm_bindgen(js_name = incPosition)]
    pub fn inc_position(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.inner.model_mut().inc_position(dx, dy, dz);
    }

    #[wasm_bindgen(js_name = setRotation)]
    pub fn set_rotation(&mut self, rx: Option<f32>, ry: Option<f32>, rz: Option<f32>) {
        self.inner.model_mut().set_rotation(rx, ry, rz);
    }

    #[wasm_bindgen(js_name = incRotation)]
    pub fn inc_rotation(&mut self, dx: Option<f32>, dy: Option<f32>, dz: Option<f32>) {
        self.inner.model_mut().inc_rotation(dx, dy, dz);
    }
}
