//! # Chunk Store
//!
//! Ordered, immutable sequence of document segments produced by an external
//! splitter. Chunks are addressed by a stable zero-based index and never
//! mutated after the store is built.

use std::ops::Index;

/// Immutable, indexable sequence of chunks.
///
/// The chunk type is generic: production callers store text segments,
/// tests may store any value a judge can inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStore<T> {
    chunks: Vec<T>,
}

impl<T> ChunkStore<T> {
    /// Freeze a sequence of chunks.
    pub fn new(chunks: Vec<T>) -> Self {
        Self { chunks }
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the document produced no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.chunks.get(index)
    }

    /// Iterate chunks in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.chunks.iter()
    }

    /// Borrow the chunks as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.chunks
    }
}

impl<T> Index<usize> for ChunkStore<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.chunks[index]
    }
}

impl<T> FromIterator<T> for ChunkStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for ChunkStore<T> {
    fn from(chunks: Vec<T>) -> Self {
        Self::new(chunks)
    }
}

impl<'a, T> IntoIterator for &'a ChunkStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
