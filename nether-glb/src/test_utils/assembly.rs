//! GLB container writer used by the unit and integration tests

use super::{CHUNK_BIN, CHUNK_HEADER_SIZE, CHUNK_JSON, GLB_MAGIC, GLB_VERSION, HEADER_SIZE};

/// Assemble a GLB from a JSON document and a binary buffer.
///
/// The JSON chunk is padded with spaces and the BIN chunk with zeros.
pub fn assemble_glb(json: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let json = serde_json::to_vec(json).unwrap();
    let chunks = [(CHUNK_JSON, json.as_slice(), b' '), (CHUNK_BIN, bin, 0)];
    let total = HEADER_SIZE
        + chunks
            .iter()
            .map(|(_, data, _)| CHUNK_HEADER_SIZE + data.len().next_multiple_of(4))
            .sum::<usize>();

    let mut glb = Vec::with_capacity(total);
    for word in [GLB_MAGIC, GLB_VERSION, total as u32] {
        glb.extend_from_slice(&word.to_le_bytes());
    }
    for (kind, data, pad) in chunks {
        let length = data.len().next_multiple_of(4);
        glb.extend_from_slice(&(length as u32).to_le_bytes());
        glb.extend_from_slice(&kind.to_le_bytes());
        glb.extend_from_slice(data);
        glb.resize(glb.len() + length - data.len(), pad);
    }
    glb
}
