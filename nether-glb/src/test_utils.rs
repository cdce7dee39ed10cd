//! Shared test utilities for unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::codec::{CodecError, DecodedImage, ImageCodec};
use crate::{CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, GLB_MAGIC, GLB_VERSION, HEADER_SIZE};

mod assembly;

pub(crate) use assembly::assemble_glb;

/// Little-endian bytes of a float slice
pub(crate) fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a u16 slice
pub(crate) fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// ============================================================================
// Counting codec
// ============================================================================

/// Codec that fabricates a 1x1 image per call and counts decodes and
/// releases. Bytes starting with `0xFF` are rejected.
#[derive(Debug, Default)]
pub(crate) struct CountingCodec {
    pub decoded: AtomicUsize,
    pub released: AtomicUsize,
}

impl CountingCodec {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn decoded(&self) -> usize {
        self.decoded.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ImageCodec for CountingCodec {
    fn decode(&self, bytes: &[u8], _mime_type: Option<&str>) -> Result<DecodedImage, CodecError> {
        if bytes.first() == Some(&0xFF) {
            return Err(CodecError::Other("rejected test image".to_string()));
        }
        self.decoded.fetch_add(1, Ordering::SeqCst);
        Ok(DecodedImage {
            width: 1,
            height: 1,
            pixels: vec![bytes.first().copied().unwrap_or(0), 0, 0, 255],
        })
    }

    fn release(&self, pixels: Vec<u8>) {
        assert_eq!(pixels.len(), 4, "released buffer was not produced by decode");
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
