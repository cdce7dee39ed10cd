//! Component types, element shapes and bounds-checked byte conversion

use serde::Deserialize;

/// Numeric type of a single accessor component (glTF `componentType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u32")]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Size in bytes of one component
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    /// glTF enum code
    pub const fn code(self) -> u32 {
        match self {
            Self::I8 => 5120,
            Self::U8 => 5121,
            Self::I16 => 5122,
            Self::U16 => 5123,
            Self::U32 => 5125,
            Self::F32 => 5126,
        }
    }

    /// Largest representable value for unsigned integer types
    pub const fn unsigned_max(self) -> Option<u32> {
        match self {
            Self::U8 => Some(u8::MAX as u32),
            Self::U16 => Some(u16::MAX as u32),
            Self::U32 => Some(u32::MAX),
            _ => None,
        }
    }
}

impl TryFrom<u32> for ComponentType {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            5120 => Ok(Self::I8),
            5121 => Ok(Self::U8),
            5122 => Ok(Self::I16),
            5123 => Ok(Self::U16),
            5125 => Ok(Self::U32),
            5126 => Ok(Self::F32),
            other => Err(format!("unknown accessor componentType {other}")),
        }
    }
}

/// Element shape of an accessor (glTF `type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ElementShape {
    #[serde(rename = "SCALAR")]
    Scalar,
    #[serde(rename = "VEC2")]
    Vec2,
    #[serde(rename = "VEC3")]
    Vec3,
    #[serde(rename = "VEC4")]
    Vec4,
    #[serde(rename = "MAT2")]
    Mat2,
    #[serde(rename = "MAT3")]
    Mat3,
    #[serde(rename = "MAT4")]
    Mat4,
}

impl ElementShape {
    /// Number of components per element
    pub const fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A window of raw element bytes tagged with its component encoding.
///
/// Each read is bounds-checked against the window; nothing is reinterpreted
/// through pointers.
#[derive(Debug, Clone, Copy)]
pub enum Components<'a> {
    U8(&'a [u8]),
    U16(&'a [u8]),
    U32(&'a [u8]),
    F32(&'a [u8]),
}

impl<'a> Components<'a> {
    /// Tag `window` with `component`. Signed encodings have no attribute use
    /// and yield `None`.
    pub fn new(component: ComponentType, window: &'a [u8]) -> Option<Self> {
        match component {
            ComponentType::U8 => Some(Self::U8(window)),
            ComponentType::U16 => Some(Self::U16(window)),
            ComponentType::U32 => Some(Self::U32(window)),
            ComponentType::F32 => Some(Self::F32(window)),
            ComponentType::I8 | ComponentType::I16 => None,
        }
    }

    /// Component `i` widened to u32. Float components yield `None`.
    pub fn uint(&self, i: usize) -> Option<u32> {
        match *self {
            Self::U8(bytes) => bytes.get(i).map(|&b| b as u32),
            Self::U16(bytes) => read_array::<2>(bytes, i).map(|b| u16::from_le_bytes(b) as u32),
            Self::U32(bytes) => read_array::<4>(bytes, i).map(u32::from_le_bytes),
            Self::F32(_) => None,
        }
    }

    /// Component `i` converted to f32.
    ///
    /// With `normalize`, unsigned integers are divided by their type maximum;
    /// otherwise they are widened as-is.
    pub fn float(&self, i: usize, normalize: bool) -> Option<f32> {
        match *self {
            Self::F32(bytes) => read_array::<4>(bytes, i).map(f32::from_le_bytes),
            Self::U8(_) => self
                .uint(i)
                .map(|v| if normalize { v as f32 / 255.0 } else { v as f32 }),
            Self::U16(_) => self
                .uint(i)
                .map(|v| if normalize { v as f32 / 65535.0 } else { v as f32 }),
            Self::U32(_) => self.uint(i).map(|v| v as f32),
        }
    }
}

fn read_array<const N: usize>(bytes: &[u8], index: usize) -> Option<[u8; N]> {
    let start = index.checked_mul(N)?;
    bytes.get(start..start + N)?.try_into().ok()
}
