//! Chunk geometry of served arrays.
//!
//! The chunk shape is a fixed policy of the array shape alone:
//! arrays of rank 2 or less get chunks of up to [`MAX_CHUNK_LENGTH`] elements along every
//! dimension, higher rank arrays get unit chunks along the first two dimensions and up to
//! [`MAX_TRAILING_CHUNK_LENGTH`] along the rest.

use std::ops::Range;

use zarrs::array::ArraySubset;

use crate::chunk_key_encoding::{ChunkKey, ChunkKeys};

pub const MAX_CHUNK_LENGTH: u64 = 1000;
pub const MAX_TRAILING_CHUNK_LENGTH: u64 = 100;

fn chunk_length(length: u64, limit: u64) -> u64 {
    length.min(limit).max(1)
}

/// The canonical chunk shape of an array.
///
/// A scalar is treated as the shape `[1]`.
/// Zero-length dimensions get a chunk length of 1.
pub fn chunk_shape(shape: &[u64]) -> Vec<u64> {
    if shape.is_empty() {
        return vec![1];
    }
    if shape.len() <= 2 {
        return shape
            .iter()
            .map(|&n| chunk_length(n, MAX_CHUNK_LENGTH))
            .collect();
    }
    shape
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            if i <= 1 {
                1
            } else {
                chunk_length(n, MAX_TRAILING_CHUNK_LENGTH)
            }
        })
        .collect()
}

/// Number of whole chunks along each dimension.
///
/// Listings enumerate `count + 1` indices per dimension, so a dimension that is an exact multiple
/// of its chunk length lists one trailing empty chunk.
pub fn chunk_count(shape: &[u64], chunk_shape: &[u64]) -> Vec<u64> {
    shape
        .iter()
        .zip(chunk_shape)
        .map(|(&n, &c)| n / c)
        .collect()
}

/// The chunk grid of a single array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGrid {
    array_shape: Vec<u64>,
    chunk_shape: Vec<u64>,
}

impl ChunkGrid {
    pub fn new(array_shape: &[u64]) -> Self {
        Self {
            array_shape: array_shape.to_vec(),
            chunk_shape: chunk_shape(array_shape),
        }
    }

    pub fn array_shape(&self) -> &[u64] {
        &self.array_shape
    }

    pub fn chunk_shape(&self) -> &[u64] {
        &self.chunk_shape
    }

    pub fn is_scalar(&self) -> bool {
        self.array_shape.is_empty()
    }

    /// Number of elements in every chunk, including the padding of boundary chunks.
    pub fn chunk_num_elements(&self) -> u64 {
        self.chunk_shape.iter().product()
    }

    pub fn chunk_count(&self) -> Vec<u64> {
        if self.is_scalar() {
            return vec![1];
        }
        chunk_count(&self.array_shape, &self.chunk_shape)
    }

    /// All chunk keys listed for the array.
    pub fn chunk_keys(&self) -> ChunkKeys {
        if self.is_scalar() {
            return ChunkKeys::new(&[1]);
        }
        let extents: Vec<u64> = self.chunk_count().iter().map(|n| n + 1).collect();
        ChunkKeys::new(&extents)
    }

    /// The subset of the array covered by a chunk.
    ///
    /// Chunks lying partly or wholly outside the array are clamped to its bounds,
    /// so an out of range chunk resolves to an empty subset.
    /// Every key of a scalar resolves to the rank-0 subset.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedAddress`] if the key does not have one index per dimension.
    pub fn chunk_subset(&self, key: &ChunkKey) -> crate::Result<ArraySubset> {
        if self.is_scalar() {
            return Ok(ArraySubset::new_empty(0));
        }
        let indices = key.indices();
        if indices.len() != self.array_shape.len() {
            return Err(crate::Error::malformed(key.encode()));
        }
        indices
            .iter()
            .zip(&self.chunk_shape)
            .zip(&self.array_shape)
            .map(|((&idx, &chunk_len), &len)| -> crate::Result<Range<u64>> {
                let start = idx
                    .checked_mul(chunk_len)
                    .ok_or_else(|| crate::Error::malformed(key.encode()))?;
                let end = start.saturating_add(chunk_len).min(len);
                Ok(start.min(end)..end)
            })
            .collect::<crate::Result<Vec<_>>>()
            .map(|ranges| ArraySubset::new_with_ranges(&ranges))
    }
}
