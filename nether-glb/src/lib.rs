//! Nether-GLB: binary glTF (GLB) scene decoder for Nethercore
//!
//! Decodes a fully buffered `.glb` file into a [`Document`]: the default
//! scene, its nodes, meshes with typed vertex attributes, and materials with
//! decoded base color textures.
//!
//! # Key Features
//!
//! - **Single arena**: all structural output lives in one region sized
//!   exactly up front and released at once
//! - **Checked reads**: every accessor window is bounds-checked and converted
//!   through a tagged component union, never a pointer cast
//! - **Pluggable images**: texture decoding goes through an [`ImageCodec`]
//! - **Recoverable errors**: malformed input is a [`GlbError`], never a panic
//!
//! # Usage
//!
//! ```ignore
//! use nether_glb::decode_glb_default;
//!
//! let data = std::fs::read("model.glb").unwrap();
//! let doc = decode_glb_default(&data).unwrap();
//!
//! println!("Scene: {}", doc.scene_name());
//! for mesh in doc.meshes() {
//!     for primitive in &mesh.primitives {
//!         let positions = doc.get_or_empty(primitive.position);
//!         println!("{} vertices", positions.len());
//!     }
//! }
//! ```

use std::sync::Arc;

mod accessor;
mod arena;
mod builder;
mod codec;
mod container;
mod document;
mod error;
mod options;
pub mod schema;

#[cfg(test)]
mod test_utils;

pub use accessor::{AttributeKind, ComponentType, ElementShape};
pub use arena::{ArenaItem, Span, TextSpan};
pub use builder::build_document;
pub use codec::{CodecError, DecodedImage, ImageCodec, ImageCrateCodec, SkipImages};
pub use container::{ChunkHeader, Container, GlbHeader, read_container};
pub use document::{Document, Material, Mesh, Node, Primitive, Texture};
pub use error::{GlbError, StructureError};
pub use options::{DecodeOptions, Normalization, OptionsError};
pub use schema::{DEFAULT_SCENE_NAME, Gltf, Sampler, WRAP_REPEAT};

/// GLB magic ("glTF" little-endian)
pub const GLB_MAGIC: u32 = 0x4654_6C67;

/// Supported container version
pub const GLB_VERSION: u32 = 2;

/// Chunk type of the JSON metadata chunk ("JSON")
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Chunk type of the binary chunk ("BIN\0")
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// File header size in bytes
pub const HEADER_SIZE: usize = 12;

/// Chunk header size in bytes
pub const CHUNK_HEADER_SIZE: usize = ChunkHeader::SIZE;

/// Decode a GLB file into a document.
///
/// # Arguments
/// * `data` - The complete file contents
/// * `codec` - Decoder for embedded images
/// * `options` - Attribute decoding options
///
/// # Returns
/// * `Ok(Document)` - The decoded scene
/// * `Err(GlbError)` - Nothing is retained; decoded textures were released
pub fn decode_glb(
    data: &[u8],
    codec: Arc<dyn ImageCodec>,
    options: &DecodeOptions,
) -> Result<Document, GlbError> {
    let container = read_container(data)?;
    build_document(&container.metadata, container.binary, codec, options)
}

/// Decode with the `image` crate codec and default options
pub fn decode_glb_default(data: &[u8]) -> Result<Document, GlbError> {
    decode_glb(data, Arc::new(ImageCrateCodec), &DecodeOptions::default())
}
