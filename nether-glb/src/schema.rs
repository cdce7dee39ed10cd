//! glTF JSON chunk schema
//!
//! Mirrors the subset of the glTF 2.0 document the scene builder consumes.
//! Unknown fields are ignored; absent optional fields take the glTF defaults.

use hashbrown::HashMap;
use serde::Deserialize;

use crate::accessor::{ComponentType, ElementShape};

/// Scene name used when the default scene has none
pub const DEFAULT_SCENE_NAME: &str = "untitled";

/// glTF sampler wrap mode REPEAT
pub const WRAP_REPEAT: u32 = 10497;

/// Root of the JSON chunk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gltf {
    #[serde(default)]
    pub asset: Asset,
    /// Default scene index
    #[serde(default)]
    pub scene: usize,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub samplers: Vec<Sampler>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub min_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default = "default_scene_name")]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mesh: Option<usize>,
    #[serde(default)]
    pub children: Vec<u32>,
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Quaternion `[x, y, z, w]`
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub translation: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Primitive {
    /// Attribute semantic (e.g. `POSITION`) to accessor index
    #[serde(default)]
    pub attributes: HashMap<String, usize>,
    #[serde(default)]
    pub indices: Option<usize>,
    #[serde(default)]
    pub material: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    #[serde(default = "default_color_factor")]
    pub base_color_factor: [f32; 4],
    #[serde(default)]
    pub base_color_texture: Option<TextureInfo>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
    #[serde(default)]
    pub tex_coord: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Texture {
    #[serde(default)]
    pub sampler: Option<usize>,
    pub source: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    #[serde(default)]
    pub mag_filter: Option<u32>,
    #[serde(default)]
    pub min_filter: Option<u32>,
    #[serde(default = "default_wrap")]
    pub wrap_s: u32,
    #[serde(default = "default_wrap")]
    pub wrap_t: u32,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: None,
            min_filter: None,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    #[serde(default)]
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: ComponentType,
    #[serde(default)]
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub shape: ElementShape,
    #[serde(default)]
    pub min: Option<Vec<f32>>,
    #[serde(default)]
    pub max: Option<Vec<f32>>,
    /// Only checked for presence; sparse storage is rejected
    #[serde(default)]
    pub sparse: Option<serde_json::Value>,
}

impl Accessor {
    /// Size in bytes of one element
    pub fn item_size(&self) -> usize {
        self.shape.component_count() * self.component_type.size()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    pub byte_length: usize,
    #[serde(default)]
    pub byte_offset: usize,
    #[serde(default)]
    pub byte_stride: Option<usize>,
    #[serde(default)]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,
    #[serde(default)]
    pub uri: Option<String>,
}

fn default_scene_name() -> String {
    DEFAULT_SCENE_NAME.to_string()
}
fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
fn default_color_factor() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}
fn default_wrap() -> u32 {
    WRAP_REPEAT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_defaults() {
        let gltf: Gltf = serde_json::from_str(r#"{"asset":{"version":"2.0"}}"#).unwrap();
        assert_eq!(gltf.asset.version, "2.0");
        assert_eq!(gltf.scene, 0);
        assert!(gltf.scenes.is_empty());
        assert!(gltf.buffer_views.is_empty());
    }

    #[test]
    fn test_node_defaults() {
        let node: Node = serde_json::from_str("{}").unwrap();
        assert_eq!(node.mesh, None);
        assert!(node.children.is_empty());
        assert_eq!(node.scale, [1.0, 1.0, 1.0]);
        assert_eq!(node.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(node.translation, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scene_name_placeholder() {
        let scene: Scene = serde_json::from_str(r#"{"nodes":[0,2]}"#).unwrap();
        assert_eq!(scene.name, DEFAULT_SCENE_NAME);
        assert_eq!(scene.nodes, vec![0, 2]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{
            "asset": {"version": "2.0", "copyright": "nobody"},
            "extensionsUsed": ["KHR_materials_unlit"],
            "animations": [{"channels": [], "samplers": []}],
            "nodes": [{"camera": 0, "mesh": 1}]
        }"#;
        let gltf: Gltf = serde_json::from_str(json).unwrap();
        assert_eq!(gltf.nodes.len(), 1);
        assert_eq!(gltf.nodes[0].mesh, Some(1));
    }

    #[test]
    fn test_accessor_parsing() {
        let json = r#"{
            "bufferView": 2,
            "componentType": 5123,
            "count": 36,
            "type": "SCALAR"
        }"#;
        let accessor: Accessor = serde_json::from_str(json).unwrap();
        assert_eq!(accessor.buffer_view, Some(2));
        assert_eq!(accessor.byte_offset, 0);
        assert_eq!(accessor.component_type, ComponentType::U16);
        assert_eq!(accessor.shape, ElementShape::Scalar);
        assert_eq!(accessor.item_size(), 2);
        assert!(!accessor.normalized);
    }

    #[test]
    fn test_accessor_rejects_unknown_component_type() {
        let json = r#"{"componentType": 5124, "count": 1, "type": "SCALAR"}"#;
        assert!(serde_json::from_str::<Accessor>(json).is_err());
    }

    #[test]
    fn test_accessor_missing_count_fails() {
        let json = r#"{"componentType": 5126, "type": "VEC3"}"#;
        assert!(serde_json::from_str::<Accessor>(json).is_err());
    }

    #[test]
    fn test_primitive_attributes() {
        let json = r#"{
            "attributes": {"POSITION": 0, "TEXCOORD_0": 2},
            "indices": 3,
            "material": 0
        }"#;
        let primitive: Primitive = serde_json::from_str(json).unwrap();
        assert_eq!(primitive.attributes.get("POSITION"), Some(&0));
        assert_eq!(primitive.attributes.get("TEXCOORD_0"), Some(&2));
        assert_eq!(primitive.indices, Some(3));
        assert_eq!(primitive.material, Some(0));
    }

    #[test]
    fn test_material_base_color() {
        let json = r#"{
            "pbrMetallicRoughness": {"baseColorTexture": {"index": 1}}
        }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        let pbr = material.pbr_metallic_roughness.unwrap();
        assert_eq!(pbr.base_color_factor, [1.0; 4]);
        assert_eq!(pbr.base_color_texture.unwrap().index, 1);
    }

    #[test]
    fn test_sampler_wrap_defaults() {
        let sampler: Sampler = serde_json::from_str(r#"{"magFilter": 9729}"#).unwrap();
        assert_eq!(sampler.mag_filter, Some(9729));
        assert_eq!(sampler.wrap_s, WRAP_REPEAT);
        assert_eq!(sampler.wrap_t, WRAP_REPEAT);
    }

    #[test]
    fn test_buffer_view_stride_optional() {
        let view: BufferView =
            serde_json::from_str(r#"{"buffer": 0, "byteLength": 48, "target": 34962}"#).unwrap();
        assert_eq!(view.byte_offset, 0);
        assert_eq!(view.byte_stride, None);
        assert_eq!(view.target, Some(34962));
    }
}
