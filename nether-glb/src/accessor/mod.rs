//! Accessor resolution and attribute decoding
//!
//! Every attribute goes through the same path: accessor -> buffer view ->
//! byte range of the binary payload -> `count` windows of `item_size` bytes
//! spaced `stride` apart -> per-kind conversion into arena storage.

use std::fmt;

use crate::arena::{Arena, ArenaItem, Span};
use crate::error::{GlbError, StructureError};
use crate::options::DecodeOptions;
use crate::schema::{Accessor, Gltf};

mod component;

pub use component::{ComponentType, Components, ElementShape};

/// Attribute kinds the scene builder decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Indices,
    Position,
    Normal,
    Tangent,
    TexCoord0,
    TexCoord1,
    Color0,
    Joints0,
    Weights0,
}

impl AttributeKind {
    /// Per-vertex kinds, in decode order
    pub const VERTEX: [Self; 8] = [
        Self::Position,
        Self::Normal,
        Self::Tangent,
        Self::TexCoord0,
        Self::TexCoord1,
        Self::Color0,
        Self::Joints0,
        Self::Weights0,
    ];

    /// glTF attribute semantic (`"INDICES"` for the index buffer)
    pub const fn semantic(self) -> &'static str {
        match self {
            Self::Indices => "INDICES",
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Tangent => "TANGENT",
            Self::TexCoord0 => "TEXCOORD_0",
            Self::TexCoord1 => "TEXCOORD_1",
            Self::Color0 => "COLOR_0",
            Self::Joints0 => "JOINTS_0",
            Self::Weights0 => "WEIGHTS_0",
        }
    }

    /// Per-vertex kind for a glTF semantic
    pub fn from_semantic(semantic: &str) -> Option<Self> {
        Self::VERTEX.into_iter().find(|k| k.semantic() == semantic)
    }

    /// Bytes of arena storage per decoded element
    pub fn decoded_size(self) -> usize {
        match self {
            Self::Indices => Arena::footprint::<u32>(1),
            Self::Position | Self::Normal => Arena::footprint::<[f32; 3]>(1),
            Self::TexCoord0 | Self::TexCoord1 => Arena::footprint::<[f32; 2]>(1),
            Self::Tangent | Self::Color0 | Self::Weights0 => Arena::footprint::<[f32; 4]>(1),
            Self::Joints0 => Arena::footprint::<[u16; 4]>(1),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.semantic())
    }
}

/// A validated, strided run of elements inside the binary payload
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementWindows<'a> {
    kind: AttributeKind,
    index: usize,
    accessor: &'a Accessor,
    /// Buffer view bytes
    bytes: &'a [u8],
    stride: usize,
    item_size: usize,
}

impl<'a> ElementWindows<'a> {
    fn count(&self) -> usize {
        self.accessor.count
    }

    /// Bytes of element `i`; bounds were checked when the windows were built
    fn window(&self, i: usize) -> &'a [u8] {
        let start = self.accessor.byte_offset + i * self.stride;
        &self.bytes[start..start + self.item_size]
    }

    fn components(&self, i: usize) -> Result<Components<'a>, GlbError> {
        Components::new(self.accessor.component_type, self.window(i))
            .ok_or_else(|| self.unsupported())
    }

    fn uint(&self, i: usize, c: usize) -> Result<u32, GlbError> {
        self.components(i)?
            .uint(c)
            .ok_or_else(|| self.out_of_bounds(i))
    }

    fn float(&self, i: usize, c: usize, normalize: bool) -> Result<f32, GlbError> {
        self.components(i)?
            .float(c, normalize)
            .ok_or_else(|| self.out_of_bounds(i))
    }

    fn out_of_bounds(&self, i: usize) -> GlbError {
        GlbError::OutOfBounds {
            what: "accessor element",
            index: i,
            len: self.count(),
        }
    }

    fn unsupported(&self) -> GlbError {
        StructureError::UnsupportedFormat {
            accessor: self.index,
            kind: self.kind,
            shape: self.accessor.shape,
            component: self.accessor.component_type,
        }
        .into()
    }
}

/// Decodes accessors of one document into an arena
pub(crate) struct AttributeReader<'a> {
    gltf: &'a Gltf,
    binary: &'a [u8],
    options: &'a DecodeOptions,
}

impl<'a> AttributeReader<'a> {
    pub fn new(gltf: &'a Gltf, binary: &'a [u8], options: &'a DecodeOptions) -> Self {
        Self {
            gltf,
            binary,
            options,
        }
    }

    /// Arena bytes needed to decode accessor `index` as `kind`.
    ///
    /// Only accessors whose elements fit inside their buffer view are
    /// counted, so the result is bounded by the payload size. Accessors that
    /// fail validation measure as zero; decoding reports them.
    pub fn measure(&self, kind: AttributeKind, index: usize) -> Result<usize, GlbError> {
        let Ok(w) = self.windows(kind, index) else {
            return Ok(0);
        };
        w.count()
            .checked_mul(kind.decoded_size())
            .ok_or_else(|| w.out_of_bounds(w.count()))
    }

    /// Resolve accessor `index` to its element windows, validating the view
    pub fn windows(
        &self,
        kind: AttributeKind,
        index: usize,
    ) -> Result<ElementWindows<'a>, GlbError> {
        let accessor = self.gltf.accessors.get(index).ok_or(GlbError::OutOfBounds {
            what: "accessor",
            index,
            len: self.gltf.accessors.len(),
        })?;
        if accessor.sparse.is_some() {
            return Err(GlbError::SparseAccessor { accessor: index });
        }

        let view_index = accessor
            .buffer_view
            .ok_or(StructureError::MissingBufferView { accessor: index })?;
        let view = self
            .gltf
            .buffer_views
            .get(view_index)
            .ok_or(GlbError::OutOfBounds {
                what: "buffer view",
                index: view_index,
                len: self.gltf.buffer_views.len(),
            })?;
        if view.buffer != 0 {
            return Err(GlbError::OutOfBounds {
                what: "buffer",
                index: view.buffer,
                len: 1,
            });
        }

        let item_size = accessor.item_size();
        let stride = view.byte_stride.unwrap_or(item_size);
        if stride < item_size {
            return Err(StructureError::StrideTooSmall {
                view: view_index,
                stride,
                item_size,
            }
            .into());
        }

        let count = accessor.count;
        if count == 0 {
            return Err(StructureError::EmptyAccessor { accessor: index }.into());
        }
        if self.options.strict_view_length && count.checked_mul(stride) != Some(view.byte_length)
        {
            return Err(StructureError::ViewLengthMismatch {
                accessor: index,
                view: view_index,
                byte_length: view.byte_length,
                count,
                stride,
            }
            .into());
        }

        let bytes = self.view_bytes(view_index)?;

        let end = (count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(accessor.byte_offset))
            .and_then(|n| n.checked_add(item_size))
            .unwrap_or(usize::MAX);
        if end > bytes.len() {
            return Err(GlbError::OutOfBounds {
                what: "accessor byte",
                index: end,
                len: bytes.len(),
            });
        }

        Ok(ElementWindows {
            kind,
            index,
            accessor,
            bytes,
            stride,
            item_size,
        })
    }

    /// Bytes of buffer view `view_index` inside the binary payload
    pub fn view_bytes(&self, view_index: usize) -> Result<&'a [u8], GlbError> {
        let view = self
            .gltf
            .buffer_views
            .get(view_index)
            .ok_or(GlbError::OutOfBounds {
                what: "buffer view",
                index: view_index,
                len: self.gltf.buffer_views.len(),
            })?;
        let end = view.byte_offset.saturating_add(view.byte_length);
        self.binary
            .get(view.byte_offset..end)
            .ok_or(GlbError::OutOfBounds {
                what: "buffer view byte",
                index: end,
                len: self.binary.len(),
            })
    }

    /// Index buffer, widened to u32
    pub fn indices(&self, arena: &mut Arena, index: usize) -> Result<Span<u32>, GlbError> {
        let kind = AttributeKind::Indices;
        let w = self.windows(kind, index)?;
        let component = w.accessor.component_type;
        let max = match (w.accessor.shape, component.unsigned_max()) {
            (ElementShape::Scalar, Some(max)) => max,
            _ => return Err(w.unsupported()),
        };
        let reject_sentinel = self.options.reject_sentinel_indices;

        let span = arena.alloc_with(w.count(), |i| {
            let value = w.uint(i, 0)?;
            if reject_sentinel && value == max {
                return Err(StructureError::SentinelIndex {
                    accessor: index,
                    position: i,
                    value,
                }
                .into());
            }
            Ok(value)
        })?;
        trace_decoded(kind, index, component, span);
        Ok(span)
    }

    pub fn position(&self, arena: &mut Arena, index: usize) -> Result<Span<[f32; 3]>, GlbError> {
        let w = self.windows(AttributeKind::Position, index)?;
        if w.accessor.min.is_none() || w.accessor.max.is_none() {
            return Err(StructureError::MissingPositionBounds { accessor: index }.into());
        }
        self.float_vec3(arena, w)
    }

    pub fn normal(&self, arena: &mut Arena, index: usize) -> Result<Span<[f32; 3]>, GlbError> {
        let w = self.windows(AttributeKind::Normal, index)?;
        self.float_vec3(arena, w)
    }

    /// Tangents; the handedness sign `w` must lie in [-1, 1]
    pub fn tangent(&self, arena: &mut Arena, index: usize) -> Result<Span<[f32; 4]>, GlbError> {
        let kind = AttributeKind::Tangent;
        let w = self.windows(kind, index)?;
        if (w.accessor.shape, w.accessor.component_type)
            != (ElementShape::Vec4, ComponentType::F32)
        {
            return Err(w.unsupported());
        }

        let span = arena.alloc_with(w.count(), |i| {
            let v = [
                w.float(i, 0, false)?,
                w.float(i, 1, false)?,
                w.float(i, 2, false)?,
                w.float(i, 3, false)?,
            ];
            if !(-1.0..=1.0).contains(&v[3]) {
                return Err(StructureError::TangentOutOfRange {
                    accessor: index,
                    position: i,
                    w: v[3],
                }
                .into());
            }
            Ok(v)
        })?;
        trace_decoded(kind, index, w.accessor.component_type, span);
        Ok(span)
    }

    pub fn texcoord(
        &self,
        arena: &mut Arena,
        index: usize,
        kind: AttributeKind,
    ) -> Result<Span<[f32; 2]>, GlbError> {
        let w = self.windows(kind, index)?;
        if w.accessor.shape != ElementShape::Vec2 || !is_unorm_or_float(w.accessor.component_type)
        {
            return Err(w.unsupported());
        }
        let normalize = self.normalize(w.accessor);

        let span = arena.alloc_with(w.count(), |i| {
            Ok([w.float(i, 0, normalize)?, w.float(i, 1, normalize)?])
        })?;
        trace_decoded(kind, index, w.accessor.component_type, span);
        Ok(span)
    }

    /// Vertex colors as RGBA; RGB input gets an alpha of 1. Every channel
    /// must lie in [0, 1].
    pub fn color(&self, arena: &mut Arena, index: usize) -> Result<Span<[f32; 4]>, GlbError> {
        let kind = AttributeKind::Color0;
        let w = self.windows(kind, index)?;
        let channels = match w.accessor.shape {
            ElementShape::Vec3 => 3,
            ElementShape::Vec4 => 4,
            _ => return Err(w.unsupported()),
        };
        if !is_unorm_or_float(w.accessor.component_type) {
            return Err(w.unsupported());
        }
        let normalize = self.normalize(w.accessor);

        let span = arena.alloc_with(w.count(), |i| {
            let mut rgba = [1.0f32; 4];
            for (c, channel) in rgba.iter_mut().enumerate().take(channels) {
                *channel = w.float(i, c, normalize)?;
            }
            if let Some(&value) = rgba.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(StructureError::ColorOutOfRange {
                    accessor: index,
                    position: i,
                    value,
                }
                .into());
            }
            Ok(rgba)
        })?;
        trace_decoded(kind, index, w.accessor.component_type, span);
        Ok(span)
    }

    /// Joint indices, widened to u16 without float conversion
    pub fn joints(&self, arena: &mut Arena, index: usize) -> Result<Span<[u16; 4]>, GlbError> {
        let kind = AttributeKind::Joints0;
        let w = self.windows(kind, index)?;
        if w.accessor.shape != ElementShape::Vec4
            || !matches!(
                w.accessor.component_type,
                ComponentType::U8 | ComponentType::U16
            )
        {
            return Err(w.unsupported());
        }

        let span = arena.alloc_with(w.count(), |i| {
            let mut joints = [0u16; 4];
            for (c, joint) in joints.iter_mut().enumerate() {
                // u8/u16 components always fit
                *joint = w.uint(i, c)? as u16;
            }
            Ok(joints)
        })?;
        trace_decoded(kind, index, w.accessor.component_type, span);
        Ok(span)
    }

    pub fn weights(&self, arena: &mut Arena, index: usize) -> Result<Span<[f32; 4]>, GlbError> {
        let kind = AttributeKind::Weights0;
        let w = self.windows(kind, index)?;
        if w.accessor.shape != ElementShape::Vec4 || !is_unorm_or_float(w.accessor.component_type)
        {
            return Err(w.unsupported());
        }
        let normalize = self.normalize(w.accessor);

        let span = arena.alloc_with(w.count(), |i| {
            Ok([
                w.float(i, 0, normalize)?,
                w.float(i, 1, normalize)?,
                w.float(i, 2, normalize)?,
                w.float(i, 3, normalize)?,
            ])
        })?;
        trace_decoded(kind, index, w.accessor.component_type, span);
        Ok(span)
    }

    fn float_vec3(
        &self,
        arena: &mut Arena,
        w: ElementWindows<'a>,
    ) -> Result<Span<[f32; 3]>, GlbError> {
        if (w.accessor.shape, w.accessor.component_type)
            != (ElementShape::Vec3, ComponentType::F32)
        {
            return Err(w.unsupported());
        }

        let span = arena.alloc_with(w.count(), |i| {
            Ok([
                w.float(i, 0, false)?,
                w.float(i, 1, false)?,
                w.float(i, 2, false)?,
            ])
        })?;
        trace_decoded(w.kind, w.index, w.accessor.component_type, span);
        Ok(span)
    }

    fn normalize(&self, accessor: &Accessor) -> bool {
        self.options.normalization.applies(accessor.normalized)
    }
}

fn is_unorm_or_float(component: ComponentType) -> bool {
    matches!(
        component,
        ComponentType::U8 | ComponentType::U16 | ComponentType::F32
    )
}

fn trace_decoded<T: ArenaItem>(
    kind: AttributeKind,
    accessor: usize,
    component: ComponentType,
    span: Span<T>,
) {
    tracing::trace!(%kind, accessor, ?component, count = span.len(), "decoded attribute");
}
