//! Error types for GLB decoding

use crate::accessor::{AttributeKind, ComponentType, ElementShape};
use crate::codec::CodecError;

/// Errors that can occur while decoding a GLB container into a [`Document`].
///
/// Every variant is recoverable: decoding aborts, anything already decoded is
/// released, and the caller may retry with different input.
///
/// [`Document`]: crate::Document
#[derive(Debug, thiserror::Error)]
pub enum GlbError {
    /// Bad magic, misaligned or mistyped chunk header, truncated read
    #[error("Corrupt GLB file: {0}")]
    CorruptFile(&'static str),

    /// Recognized container with an unsupported version
    #[error("Unsupported glTF container version {0} (only version 2 is supported)")]
    OldGltf(u32),

    /// Malformed JSON chunk or missing required field
    #[error("Failed to parse glTF metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A metadata index or byte range points outside its target
    #[error("{what} {index} is out of bounds (length {len})")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The arena ran out of its precomputed budget
    #[error("Arena exhausted: requested {requested} bytes, {remaining} remaining")]
    ArenaExhausted { requested: usize, remaining: usize },

    /// The image codec rejected an embedded image
    #[error("Failed to decode image {image}: {source}")]
    Image {
        image: usize,
        #[source]
        source: CodecError,
    },

    /// Image data referenced by URI instead of a buffer view
    #[error("Image {image} is not embedded in the binary chunk")]
    UnsupportedImageSource { image: usize },

    /// Sparse accessors are not supported
    #[error("Accessor {accessor} is sparse (unsupported)")]
    SparseAccessor { accessor: usize },

    /// Structural invariant violated by the input
    #[error("Invalid GLB structure: {0}")]
    Structure(#[from] StructureError),
}

impl GlbError {
    /// Whether the error belongs to the corrupt-file class.
    ///
    /// Structural violations count as corrupt input.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptFile(_) | Self::Structure(_))
    }
}

/// Structural violations of the container or metadata.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    #[error("declared total length {0} does not exceed the 12-byte header")]
    TotalLengthTooSmall(u32),

    #[error("mesh {mesh} has no primitives")]
    EmptyMesh { mesh: usize },

    #[error(
        "buffer view {view} is {byte_length} bytes but accessor {accessor} needs {count} x {stride}"
    )]
    ViewLengthMismatch {
        accessor: usize,
        view: usize,
        byte_length: usize,
        count: usize,
        stride: usize,
    },

    #[error("accessor {accessor} has zero elements")]
    EmptyAccessor { accessor: usize },

    #[error("accessor {accessor} has no buffer view")]
    MissingBufferView { accessor: usize },

    #[error("accessor {accessor}: {shape:?} of {component:?} is not a valid {kind} encoding")]
    UnsupportedFormat {
        accessor: usize,
        kind: AttributeKind,
        shape: ElementShape,
        component: ComponentType,
    },

    #[error("index {position} of accessor {accessor} holds the sentinel value {value}")]
    SentinelIndex {
        accessor: usize,
        position: usize,
        value: u32,
    },

    #[error("tangent {position} of accessor {accessor} has handedness {w} outside [-1, 1]")]
    TangentOutOfRange {
        accessor: usize,
        position: usize,
        w: f32,
    },

    #[error("color {position} of accessor {accessor} has channel value {value} outside [0, 1]")]
    ColorOutOfRange {
        accessor: usize,
        position: usize,
        value: f32,
    },

    #[error("image {image} uses strided buffer view {view}")]
    StridedImageView { image: usize, view: usize },

    #[error("position accessor {accessor} does not declare min and max bounds")]
    MissingPositionBounds { accessor: usize },

    #[error("buffer view {view} has stride {stride} smaller than its {item_size}-byte elements")]
    StrideTooSmall {
        view: usize,
        stride: usize,
        item_size: usize,
    },
}
