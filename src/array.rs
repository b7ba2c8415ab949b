use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use zarrs::array::ArraySubset;

use crate::data_type::{DataType, Element};

/// Read access to the data of an array.
pub trait ArraySource: Send + Sync + fmt::Debug {
    fn shape(&self) -> &[u64];

    fn data_type(&self) -> DataType;

    /// Read a subset of the array as little-endian row-major bytes.
    ///
    /// The returned buffer holds exactly `subset.num_elements() * data_type().size()` bytes.
    /// May block while the backend computes or fetches data.
    ///
    /// # Errors
    /// Returns [`crate::Error::BackendRead`] if the subset is outside the array or the
    /// backend fails.
    fn read_subset(&self, subset: &ArraySubset) -> crate::Result<Vec<u8>>;
}

fn check_subset(shape: &[u64], subset: &ArraySubset) -> crate::Result<()> {
    if subset.dimensionality() == shape.len() && subset.inbounds_shape(shape) {
        Ok(())
    } else {
        Err(crate::Error::backend(format!(
            "subset {subset} is outside of array with shape {shape:?}"
        )))
    }
}

/// An eagerly materialized array held in memory.
#[derive(Clone)]
pub struct MemoryArray {
    shape: Vec<u64>,
    data_type: DataType,
    bytes: Bytes,
}

impl fmt::Debug for MemoryArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryArray")
            .field("shape", &self.shape)
            .field("data_type", &self.data_type)
            .field("num_bytes", &self.bytes.len())
            .finish()
    }
}

impl MemoryArray {
    /// Wrap little-endian row-major bytes.
    ///
    /// # Errors
    /// Returns an error if the number of bytes does not match the shape and data type.
    pub fn new(
        shape: Vec<u64>,
        data_type: DataType,
        bytes: impl Into<Bytes>,
    ) -> crate::Result<Self> {
        let bytes = bytes.into();
        let expected = shape.iter().product::<u64>() * data_type.size() as u64;
        if bytes.len() as u64 != expected {
            return Err(crate::Error::general(format!(
                "{} bytes given for {data_type} array with shape {shape:?}, expected {expected}",
                bytes.len()
            )));
        }
        Ok(Self {
            shape,
            data_type,
            bytes,
        })
    }

    /// Build an array from row-major elements.
    ///
    /// # Errors
    /// Returns an error if the number of elements does not match the shape.
    pub fn from_elements<T: Element>(shape: Vec<u64>, elements: &[T]) -> crate::Result<Self> {
        let mut bytes = Vec::with_capacity(elements.len() * T::DATA_TYPE.size());
        for el in elements {
            el.write_le(&mut bytes);
        }
        Self::new(shape, T::DATA_TYPE, bytes)
    }

    /// An array with every element set to `value`.
    pub fn filled<T: Element>(shape: Vec<u64>, value: T) -> Self {
        let mut element = Vec::with_capacity(T::DATA_TYPE.size());
        value.write_le(&mut element);
        let num_elements = shape.iter().product::<u64>() as usize;
        Self {
            shape,
            data_type: T::DATA_TYPE,
            bytes: Bytes::from(element.repeat(num_elements)),
        }
    }
}

impl ArraySource for MemoryArray {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn read_subset(&self, subset: &ArraySubset) -> crate::Result<Vec<u8>> {
        check_subset(&self.shape, subset)?;
        let size = self.data_type.size();
        if subset.dimensionality() == 0 {
            return Ok(self.bytes.to_vec());
        }
        let mut out = Vec::with_capacity(subset.num_elements_usize() * size);
        if subset.is_empty() {
            return Ok(out);
        }
        let runs = subset
            .contiguous_linearised_indices(&self.shape)
            .map_err(|e| crate::Error::backend(e.to_string()))?;
        let run = runs.contiguous_elements_usize() * size;
        for (element, _) in &runs {
            let offset = element as usize * size;
            out.extend_from_slice(&self.bytes[offset..offset + run]);
        }
        Ok(out)
    }
}

type Generator<T> = Arc<dyn Fn(&[u64]) -> T + Send + Sync>;

/// An array whose elements are computed on demand from their index.
///
/// Nothing is stored: reading a region evaluates the generator for every element in it,
/// so reads of the same region are identical as long as the generator is pure.
#[derive(Clone)]
pub struct LazyArray<T> {
    shape: Vec<u64>,
    generator: Generator<T>,
}

impl<T: Element> LazyArray<T> {
    pub fn new(
        shape: Vec<u64>,
        generator: impl Fn(&[u64]) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            shape,
            generator: Arc::new(generator),
        }
    }
}

impl<T> fmt::Debug for LazyArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl<T: Element> ArraySource for LazyArray<T> {
    fn shape(&self) -> &[u64] {
        &self.shape
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn read_subset(&self, subset: &ArraySubset) -> crate::Result<Vec<u8>> {
        check_subset(&self.shape, subset)?;
        let mut out = Vec::with_capacity(subset.num_elements_usize() * T::DATA_TYPE.size());
        for idx in subset.indices() {
            (self.generator)(idx.as_slice()).write_le(&mut out);
        }
        Ok(out)
    }
}
