//! Decoded scene graph
//!
//! A [`Document`] owns everything a decode produced. Structural data lives in
//! its [`Arena`] and is addressed through [`Span`] handles; texture pixels
//! are owned by the materials and handed back to the image codec when the
//! document is dropped.

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};

use crate::accessor::AttributeKind;
use crate::arena::{Arena, ArenaItem, Span, TextSpan};
use crate::codec::ImageCodec;
use crate::schema::Sampler;

/// A scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Mesh index (`None` is distinct from mesh 0)
    pub mesh: Option<usize>,
    /// Child node indices
    pub children: Span<u32>,
    pub name: Option<TextSpan>,
    pub scale: Vec3,
    /// First three stored components of the rotation quaternion
    pub rotation: Vec3,
    /// Full rotation quaternion
    pub orientation: Quat,
    pub translation: Vec3,
}

/// A mesh with at least one primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
}

/// One draw batch of a mesh. Every attribute is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Primitive {
    pub indices: Option<Span<u32>>,
    pub position: Option<Span<[f32; 3]>>,
    pub normal: Option<Span<[f32; 3]>>,
    pub tangent: Option<Span<[f32; 4]>>,
    pub texcoord0: Option<Span<[f32; 2]>>,
    pub texcoord1: Option<Span<[f32; 2]>>,
    pub color0: Option<Span<[f32; 4]>>,
    pub joints0: Option<Span<[u16; 4]>>,
    pub weights0: Option<Span<[f32; 4]>>,
    pub material: Option<usize>,
}

impl Primitive {
    /// Element count of an attribute, if present
    pub fn attribute_len(&self, kind: AttributeKind) -> Option<usize> {
        match kind {
            AttributeKind::Indices => self.indices.map(|s| s.len()),
            AttributeKind::Position => self.position.map(|s| s.len()),
            AttributeKind::Normal => self.normal.map(|s| s.len()),
            AttributeKind::Tangent => self.tangent.map(|s| s.len()),
            AttributeKind::TexCoord0 => self.texcoord0.map(|s| s.len()),
            AttributeKind::TexCoord1 => self.texcoord1.map(|s| s.len()),
            AttributeKind::Color0 => self.color0.map(|s| s.len()),
            AttributeKind::Joints0 => self.joints0.map(|s| s.len()),
            AttributeKind::Weights0 => self.weights0.map(|s| s.len()),
        }
    }
}

/// Decoded RGBA8 texture.
///
/// The pixel buffer belongs to the image codec that produced it and goes
/// back through [`ImageCodec::release`] when the document is dropped, so
/// textures cannot be cloned out of a document:
///
/// ```compile_fail
/// fn copy(texture: &nether_glb::Texture) -> nether_glb::Texture {
///     texture.clone()
/// }
/// ```
#[derive(PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, no padding
    pub pixels: Vec<u8>,
    pub mime_type: Option<String>,
    pub sampler: Sampler,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("[{} bytes]", self.pixels.len()))
            .field("mime_type", &self.mime_type)
            .field("sampler", &self.sampler)
            .finish()
    }
}

#[derive(Debug, PartialEq)]
pub struct Material {
    /// Base color texture
    pub albedo: Option<Texture>,
    pub base_color_factor: Vec4,
}

/// Materials whose pixel buffers go back to the codec on drop
pub(crate) struct MaterialSet {
    codec: Arc<dyn ImageCodec>,
    materials: Vec<Material>,
}

impl MaterialSet {
    pub fn new(codec: Arc<dyn ImageCodec>, capacity: usize) -> Self {
        Self {
            codec,
            materials: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, material: Material) {
        self.materials.push(material);
    }

    pub fn codec(&self) -> &dyn ImageCodec {
        self.codec.as_ref()
    }
}

impl Drop for MaterialSet {
    fn drop(&mut self) {
        let mut released = 0usize;
        for material in &mut self.materials {
            if let Some(texture) = material.albedo.as_mut() {
                self.codec.release(std::mem::take(&mut texture.pixels));
                released += 1;
            }
        }
        if released > 0 {
            tracing::trace!(released, "released texture pixels");
        }
    }
}

/// A fully decoded GLB scene
pub struct Document {
    pub(crate) arena: Arena,
    pub(crate) scene_name: TextSpan,
    pub(crate) scene_nodes: Span<u32>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) meshes: Vec<Mesh>,
    pub(crate) materials: MaterialSet,
}

impl Document {
    /// Name of the default scene (`"untitled"` when unnamed)
    pub fn scene_name(&self) -> &str {
        self.arena.text(self.scene_name)
    }

    /// Root node indices of the default scene, in order
    pub fn scene_nodes(&self) -> &[u32] {
        self.arena.get(self.scene_nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials.materials
    }

    /// Resolve an attribute or index span
    pub fn get<T: ArenaItem>(&self, span: Span<T>) -> &[T] {
        self.arena.get(span)
    }

    /// Resolve an optional attribute, treating absence as empty
    pub fn get_or_empty<T: ArenaItem>(&self, span: Option<Span<T>>) -> &[T] {
        match span {
            Some(span) => self.arena.get(span),
            None => &[],
        }
    }

    pub fn text(&self, span: TextSpan) -> &str {
        self.arena.text(span)
    }

    pub fn node_children(&self, node: &Node) -> &[u32] {
        self.arena.get(node.children)
    }

    pub fn node_name(&self, node: &Node) -> Option<&str> {
        node.name.map(|n| self.arena.text(n))
    }

    /// Bytes reserved by the arena
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity_bytes()
    }

    /// Bytes of the arena actually filled
    pub fn arena_used(&self) -> usize {
        self.arena.used_bytes()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("scene_name", &self.scene_name())
            .field("scene_nodes", &self.scene_nodes())
            .field("nodes", &self.nodes.len())
            .field("meshes", &self.meshes.len())
            .field("materials", &self.materials().len())
            .field("arena_used", &self.arena_used())
            .finish()
    }
}
