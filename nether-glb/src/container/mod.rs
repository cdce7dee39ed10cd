//! GLB container reader
//!
//! # Layout
//! ```text
//! 0x00: magic u32 ("glTF")
//! 0x04: version u32 (must be 2)
//! 0x08: total length u32 (> 12)
//! 0x0C: chunk0 length u32 (multiple of 4)
//! 0x10: chunk0 type u32 ("JSON")
//! 0x14: chunk0 payload (JSON metadata)
//! var:  chunk1 length u32 (multiple of 4)
//! var:  chunk1 type u32 ("BIN\0")
//! var:  chunk1 payload (binary buffer 0)
//! ```

use std::io::Cursor;

use crate::error::{GlbError, StructureError};
use crate::schema::Gltf;
use crate::{CHUNK_BIN, CHUNK_JSON, GLB_MAGIC, GLB_VERSION, HEADER_SIZE};

mod helpers;

use helpers::{read_slice, read_u32};

/// GLB file header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    /// Declared total file length
    pub length: u32,
}

/// Chunk header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub kind: u32,
}

impl ChunkHeader {
    pub const SIZE: usize = 8;
}

/// A validated container: parsed metadata plus the borrowed binary payload
#[derive(Debug)]
pub struct Container<'a> {
    pub header: GlbHeader,
    pub metadata: Gltf,
    /// Bytes of buffer 0
    pub binary: &'a [u8],
}

/// Validate the GLB envelope and parse its JSON chunk.
///
/// # Arguments
/// * `data` - The complete file contents
///
/// # Returns
/// * `Ok(Container)` - Metadata and a slice of `data` holding the binary payload
/// * `Err(GlbError)` - Envelope or metadata error
pub fn read_container(data: &[u8]) -> Result<Container<'_>, GlbError> {
    let mut cursor = Cursor::new(data);

    let header = read_header(&mut cursor)?;

    let json_chunk = read_chunk_header(&mut cursor, CHUNK_JSON, "first chunk is not JSON")?;
    let json = read_slice(&mut cursor, json_chunk.length as usize, "truncated JSON chunk")?;
    let metadata: Gltf = serde_json::from_slice(json)?;

    let bin_chunk = read_chunk_header(&mut cursor, CHUNK_BIN, "second chunk is not BIN")?;
    let binary = binary_payload(data, cursor.position() as usize, bin_chunk, &metadata)?;

    tracing::debug!(
        json_bytes = json_chunk.length,
        bin_bytes = binary.len(),
        "read GLB container"
    );

    Ok(Container {
        header,
        metadata,
        binary,
    })
}

fn read_header(cursor: &mut Cursor<&[u8]>) -> Result<GlbHeader, GlbError> {
    let magic = read_u32(cursor, "truncated header")?;
    if magic != GLB_MAGIC {
        return Err(GlbError::CorruptFile("invalid magic (expected 'glTF')"));
    }

    let version = read_u32(cursor, "truncated header")?;
    if version != GLB_VERSION {
        return Err(GlbError::OldGltf(version));
    }

    let length = read_u32(cursor, "truncated header")?;
    if length as usize <= HEADER_SIZE {
        return Err(StructureError::TotalLengthTooSmall(length).into());
    }
    if length as usize > cursor.get_ref().len() {
        return Err(GlbError::CorruptFile("file is shorter than its declared length"));
    }

    Ok(GlbHeader {
        magic,
        version,
        length,
    })
}

fn read_chunk_header(
    cursor: &mut Cursor<&[u8]>,
    expected: u32,
    wrong_kind: &'static str,
) -> Result<ChunkHeader, GlbError> {
    let length = read_u32(cursor, "truncated chunk header")?;
    let kind = read_u32(cursor, "truncated chunk header")?;

    if length % 4 != 0 {
        return Err(GlbError::CorruptFile("chunk length is not 4-byte aligned"));
    }
    if kind != expected {
        return Err(GlbError::CorruptFile(wrong_kind));
    }

    Ok(ChunkHeader { length, kind })
}

/// Slice buffer 0 out of the BIN chunk.
///
/// The payload ends at the first buffer's declared byte length. Without any
/// buffer entry the whole chunk is used.
fn binary_payload<'a>(
    data: &'a [u8],
    start: usize,
    chunk: ChunkHeader,
    metadata: &Gltf,
) -> Result<&'a [u8], GlbError> {
    let chunk_len = chunk.length as usize;
    let len = match metadata.buffers.first() {
        Some(buffer) => buffer.byte_length,
        None => chunk_len,
    };
    if metadata.buffers.len() > 1 {
        tracing::warn!(
            buffers = metadata.buffers.len(),
            "only buffer 0 is read from the BIN chunk, ignoring the rest"
        );
    }

    if len > chunk_len {
        return Err(GlbError::OutOfBounds {
            what: "buffer 0 byte",
            index: len,
            len: chunk_len,
        });
    }
    data.get(start..start + len).ok_or(GlbError::OutOfBounds {
        what: "binary payload byte",
        index: start + len,
        len: data.len(),
    })
}
