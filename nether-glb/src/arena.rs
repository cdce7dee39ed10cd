//! Single-region arena for decoded scene data
//!
//! All structural output of a decode (attribute arrays, index lists, names)
//! lives in one word-addressed region sized up front. Values are addressed
//! through typed [`Span`] handles and the whole region is released at once
//! when the owning document is dropped.
//!
//! The region never grows: an allocation that would exceed the budget fails
//! with [`GlbError::ArenaExhausted`] instead of reallocating.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::Pod;

use crate::error::GlbError;

const WORD: usize = std::mem::size_of::<u32>();

/// Plain data that can be stored in the arena.
///
/// Implemented for the element types the scene builder produces; every one
/// has a size that is a multiple of 4 and an alignment of at most 4.
pub trait ArenaItem: Pod + sealed::Sealed {}

mod sealed {
    pub trait Sealed {}
}

macro_rules! arena_items {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl ArenaItem for $ty {}
        )*
    };
}

arena_items!(u32, [f32; 2], [f32; 3], [f32; 4], [u16; 4]);

/// Handle to a run of `T` values inside an [`Arena`]
pub struct Span<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Span<T> {
    /// Span of zero elements, never backed by storage
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for Span<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Span<T> {}

impl<T> PartialEq for Span<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for Span<T> {}

impl<T> fmt::Debug for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span[{}..+{}]", self.start, self.len)
    }
}

/// Handle to UTF-8 text inside an [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    start: u32,
    len: u32,
}

impl TextSpan {
    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-budget word arena
#[derive(Debug)]
pub struct Arena {
    words: Vec<u32>,
    budget: usize,
}

impl Arena {
    /// Create an arena able to hold `bytes` bytes (rounded up to whole words).
    ///
    /// The region is reserved up front; if the allocator refuses it the
    /// request is reported as [`GlbError::ArenaExhausted`] with nothing
    /// remaining.
    pub fn with_budget(bytes: usize) -> Result<Self, GlbError> {
        let budget = bytes.div_ceil(WORD);
        let mut words = Vec::new();
        words
            .try_reserve_exact(budget)
            .map_err(|_| GlbError::ArenaExhausted {
                requested: bytes,
                remaining: 0,
            })?;
        Ok(Self { words, budget })
    }

    /// Bytes reserved for a run of `count` values of `T`
    pub fn footprint<T: ArenaItem>(count: usize) -> usize {
        count * std::mem::size_of::<T>()
    }

    /// Bytes reserved for `len` bytes of text
    pub fn text_footprint(len: usize) -> usize {
        len.div_ceil(WORD) * WORD
    }

    pub fn capacity_bytes(&self) -> usize {
        self.budget * WORD
    }

    pub fn used_bytes(&self) -> usize {
        self.words.len() * WORD
    }

    pub fn remaining_bytes(&self) -> usize {
        self.capacity_bytes() - self.used_bytes()
    }

    /// Allocate `count` values produced by `f(0..count)`.
    ///
    /// If `f` fails part-way, the partial run is rolled back and the error is
    /// returned. Zero-length requests return [`Span::EMPTY`] without touching
    /// the region.
    pub fn alloc_with<T, F>(&mut self, count: usize, mut f: F) -> Result<Span<T>, GlbError>
    where
        T: ArenaItem,
        F: FnMut(usize) -> Result<T, GlbError>,
    {
        if count == 0 {
            return Ok(Span::EMPTY);
        }
        let words = self.reserve(Self::footprint::<T>(count))?;
        let start = self.words.len();

        for i in 0..count {
            match f(i) {
                Ok(value) => self.push_value(&value),
                Err(e) => {
                    self.words.truncate(start);
                    return Err(e);
                }
            }
        }
        debug_assert_eq!(self.words.len() - start, words);

        Ok(Span {
            start: start as u32,
            len: count as u32,
            _marker: PhantomData,
        })
    }

    /// Copy a slice into the arena
    #[cfg(test)]
    pub fn alloc_slice<T: ArenaItem>(&mut self, values: &[T]) -> Result<Span<T>, GlbError> {
        self.alloc_with(values.len(), |i| Ok(values[i]))
    }

    /// Copy a string into the arena
    pub fn alloc_str(&mut self, text: &str) -> Result<TextSpan, GlbError> {
        let words = self.reserve(Self::text_footprint(text.len()))?;
        let start = self.words.len();
        for chunk in text.as_bytes().chunks(WORD) {
            let mut word = [0u8; WORD];
            word[..chunk.len()].copy_from_slice(chunk);
            self.words.push(u32::from_ne_bytes(word));
        }
        debug_assert_eq!(self.words.len() - start, words);

        Ok(TextSpan {
            start: start as u32,
            len: text.len() as u32,
        })
    }

    /// Resolve a span to its values
    pub fn get<T: ArenaItem>(&self, span: Span<T>) -> &[T] {
        if span.is_empty() {
            return &[];
        }
        let start = span.start as usize;
        let end = start + Self::footprint::<T>(span.len()) / WORD;
        bytemuck::cast_slice(&self.words[start..end])
    }

    /// Resolve a text span
    pub fn text(&self, span: TextSpan) -> &str {
        let start = span.start as usize;
        let end = start + span.len().div_ceil(WORD);
        let bytes: &[u8] = bytemuck::cast_slice(&self.words[start..end]);
        std::str::from_utf8(&bytes[..span.len()]).unwrap_or_default()
    }

    /// Check the budget for `bytes` more bytes and return the word count
    fn reserve(&self, bytes: usize) -> Result<usize, GlbError> {
        let words = bytes.div_ceil(WORD);
        if self.words.len() + words > self.budget {
            return Err(GlbError::ArenaExhausted {
                requested: bytes,
                remaining: self.remaining_bytes(),
            });
        }
        Ok(words)
    }

    fn push_value<T: ArenaItem>(&mut self, value: &T) {
        for chunk in bytemuck::bytes_of(value).chunks_exact(WORD) {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            self.words.push(u32::from_ne_bytes(word));
        }
    }
}
