//! Programmatic GLB generation for integration tests.
//!
//! [`GlbWriter`] packs attribute data into one binary buffer, records a
//! buffer view and accessor per array, and assembles the container. Scene
//! structure (scenes, nodes, meshes, materials) is supplied as JSON.

#![allow(dead_code)]

#[path = "../../src/test_utils/assembly.rs"]
mod assembly;

use std::io::Cursor;

use nether_glb::{CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, GLB_MAGIC, GLB_VERSION, HEADER_SIZE};
use serde_json::{Map, Value, json};

pub const FLOAT: u32 = 5126;
pub const UNSIGNED_BYTE: u32 = 5121;
pub const UNSIGNED_SHORT: u32 = 5123;
pub const UNSIGNED_INT: u32 = 5125;

/// Incremental GLB builder
#[derive(Debug, Default)]
pub struct GlbWriter {
    buffer: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    root: Map<String, Value>,
}

impl GlbWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a buffer view holding `bytes`, aligned to 4 bytes
    pub fn push_view(&mut self, bytes: &[u8], stride: Option<usize>) -> usize {
        while !self.buffer.len().is_multiple_of(4) {
            self.buffer.push(0);
        }
        let mut view = json!({
            "buffer": 0,
            "byteOffset": self.buffer.len(),
            "byteLength": bytes.len(),
        });
        if let Some(stride) = stride {
            view["byteStride"] = json!(stride);
        }
        self.buffer.extend_from_slice(bytes);
        self.views.push(view);
        self.views.len() - 1
    }

    /// Append an accessor over an existing view; `extra` fields are merged in
    pub fn push_accessor(
        &mut self,
        view: usize,
        byte_offset: usize,
        component: u32,
        shape: &str,
        count: usize,
        extra: Value,
    ) -> usize {
        let mut accessor = json!({
            "bufferView": view,
            "byteOffset": byte_offset,
            "componentType": component,
            "type": shape,
            "count": count,
        });
        if let (Some(accessor), Value::Object(extra)) = (accessor.as_object_mut(), extra) {
            accessor.extend(extra);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Tightly packed float accessor. VEC3 data gets min/max bounds.
    pub fn f32_accessor(&mut self, shape: &str, values: &[f32]) -> usize {
        let width = shape_width(shape);
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, None);

        let extra = if width == 3 {
            let (min, max) = bounds(values);
            json!({"min": min, "max": max})
        } else {
            json!({})
        };
        self.push_accessor(view, 0, FLOAT, shape, values.len() / width, extra)
    }

    pub fn u16_accessor(&mut self, shape: &str, values: &[u16], normalized: bool) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, None);
        let count = values.len() / shape_width(shape);
        self.push_accessor(
            view,
            0,
            UNSIGNED_SHORT,
            shape,
            count,
            json!({"normalized": normalized}),
        )
    }

    pub fn u8_accessor(&mut self, shape: &str, values: &[u8], normalized: bool) -> usize {
        let view = self.push_view(values, None);
        let count = values.len() / shape_width(shape);
        self.push_accessor(
            view,
            0,
            UNSIGNED_BYTE,
            shape,
            count,
            json!({"normalized": normalized}),
        )
    }

    pub fn u32_accessor(&mut self, values: &[u32]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let view = self.push_view(&bytes, None);
        self.push_accessor(view, 0, UNSIGNED_INT, "SCALAR", values.len(), json!({}))
    }

    /// Set a top-level JSON field (`scenes`, `nodes`, `meshes`, ...)
    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.root.insert(key.to_string(), value);
        self
    }

    /// Assemble the GLB
    pub fn finish(self) -> Vec<u8> {
        let mut root = self.root;
        root.insert("asset".into(), json!({"version": "2.0", "generator": "glb_generator"}));
        root.insert("bufferViews".into(), Value::Array(self.views));
        root.insert("accessors".into(), Value::Array(self.accessors));
        root.insert("buffers".into(), json!([{"byteLength": self.buffer.len()}]));
        assembly::assemble_glb(&Value::Object(root), &self.buffer)
    }
}

fn shape_width(shape: &str) -> usize {
    match shape {
        "SCALAR" => 1,
        "VEC2" => 2,
        "VEC3" => 3,
        "VEC4" => 4,
        other => panic!("unsupported test shape {other}"),
    }
}

fn bounds(values: &[f32]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for v in values.chunks_exact(3) {
        for i in 0..3 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
    }
    (min, max)
}

/// Scene with one node pointing at mesh 0
pub fn single_node_scene(writer: &mut GlbWriter, primitive: Value) {
    writer
        .set("scene", json!(0))
        .set("scenes", json!([{"name": "TestScene", "nodes": [0]}]))
        .set("nodes", json!([{"name": "Root", "mesh": 0}]))
        .set("meshes", json!([{"primitives": [primitive]}]));
}

/// Positions of a unit right triangle in the XY plane
pub const TRIANGLE_POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// Minimal scene: one node, one mesh, positions and u16 indices
pub fn generate_triangle_glb() -> Vec<u8> {
    let mut writer = GlbWriter::new();
    let position = writer.f32_accessor("VEC3", &TRIANGLE_POSITIONS);
    let indices = writer.u16_accessor("SCALAR", &[0, 1, 2], false);
    single_node_scene(
        &mut writer,
        json!({"attributes": {"POSITION": position}, "indices": indices}),
    );
    writer.finish()
}

/// Encode a PNG whose pixel (x, y) is `[x * 100, y * 100, 7, 255]`
pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 100) as u8, (y * 100) as u8, 7, 255])
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes.into_inner()
}
