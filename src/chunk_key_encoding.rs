use std::fmt::{self, Write};
use std::str::FromStr;

use zarrs::array::ArraySubset;
use zarrs::array::iterators::IndicesIntoIterator;

/// Separator between the per-dimension indices of a chunk key.
pub const SEPARATOR: char = '.';

/// The grid coordinates of a chunk, encoded with the Zarr v2 `.` separated key scheme.
///
/// The key of the only chunk of a scalar array is `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(Vec<u64>);

impl ChunkKey {
    pub fn new(indices: Vec<u64>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[u64] {
        &self.0
    }

    /// Parse a chunk key such as `0.2.1`.
    ///
    /// Every component must be a non-negative integer.
    pub fn decode(path: &str) -> crate::Result<Self> {
        path.split(SEPARATOR)
            .map(|part| part.parse::<u64>().map_err(|_| crate::Error::malformed(path)))
            .collect::<crate::Result<Vec<_>>>()
            .map(Self)
    }

    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return "0".to_string();
        }
        let mut s = String::with_capacity(self.0.len() * 2);
        let mut is_first = true;
        for idx in &self.0 {
            if is_first {
                is_first = false;
            } else {
                s.push(SEPARATOR);
            }
            // writing to a String cannot fail
            let _ = write!(s, "{idx}");
        }
        s
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ChunkKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<Vec<u64>> for ChunkKey {
    fn from(value: Vec<u64>) -> Self {
        Self(value)
    }
}

/// Iterator over chunk keys, outermost dimension varying slowest.
#[derive(Clone)]
pub struct ChunkKeys(IndicesIntoIterator);

impl ChunkKeys {
    /// Enumerate keys `0..extents[i]` along each dimension.
    pub fn new(extents: &[u64]) -> Self {
        Self(
            ArraySubset::new_with_shape(extents.to_vec())
                .indices()
                .into_iter(),
        )
    }
}

impl fmt::Debug for ChunkKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkKeys").finish_non_exhaustive()
    }
}

impl Iterator for ChunkKeys {
    type Item = ChunkKey;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|idx| ChunkKey(idx.to_vec()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
