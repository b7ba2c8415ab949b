use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::array::{LazyArray, MemoryArray};
use crate::dataset::{Dataset, Registry, Variable};

pub const ONES: &str = "generated-ones";
pub const RANDOM: &str = "generated-random";

const ONES_LEN: u64 = 101;
const RANDOM_LEN: u64 = 40_000;

/// `num` evenly spaced values from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, num: u64) -> Vec<f64> {
    if num < 2 {
        return vec![start; num as usize];
    }
    let step = (stop - start) / (num - 1) as f64;
    (0..num).map(|i| start + step * i as f64).collect()
}

/// Dataset with a float32 cube of ones and float64 coordinates along each axis.
///
/// # Errors
/// Returns an error if the dataset cannot be assembled.
pub fn generated_ones() -> crate::Result<Dataset> {
    let shape = vec![ONES_LEN; 3];
    let ones = Variable::data(["x", "y", "z"], MemoryArray::filled(shape, 1.0f32))?
        .with_attribute("abc", "xyz")
        .with_attribute("integer", 1i64)
        .with_attribute("floating", 1.5f64);
    let mut dataset = Dataset::new()
        .with_attribute("global-attributes", "yes")
        .with_variable("ones", ones)?;
    for (name, start, stop) in [("x", 0.0, 1.0), ("y", -100.0, 0.0), ("z", 0.0, 1000.0)] {
        let values = linspace(start, stop, ONES_LEN);
        let source = MemoryArray::from_elements(vec![ONES_LEN], values.as_slice())?;
        let coordinate = Variable::coordinate([name], source)?;
        dataset = dataset.with_variable(name, coordinate)?;
    }
    Ok(dataset)
}

/// Seeded by the linear element index so every read of an element draws the same value.
fn element_rng(seed: u64, idx: &[u64], shape: &[u64]) -> SmallRng {
    let linear = idx
        .iter()
        .zip(shape)
        .fold(0u64, |acc, (&i, &n)| acc.wrapping_mul(n).wrapping_add(i));
    SmallRng::seed_from_u64(seed ^ linear)
}

/// Dataset of lazily generated uniform random floats in `[0, 1)` and integers in `[0, 100)`.
///
/// # Errors
/// Returns an error if the dataset cannot be assembled.
pub fn generated_random() -> crate::Result<Dataset> {
    const FLOAT_SEED: u64 = 0x5eed_f10a;
    const INT_SEED: u64 = 0x5eed_0001;
    let shape = vec![RANDOM_LEN; 2];

    let float_shape = shape.clone();
    let float = LazyArray::new(shape.clone(), move |idx: &[u64]| {
        element_rng(FLOAT_SEED, idx, &float_shape).gen_range(0.0..1.0f64)
    });
    let int_shape = shape.clone();
    let int = LazyArray::new(shape, move |idx: &[u64]| {
        element_rng(INT_SEED, idx, &int_shape).gen_range(0..100i64)
    });

    Dataset::new()
        .with_variable("float", Variable::data(["dim_0", "dim_1"], float)?)?
        .with_variable("int", Variable::data(["dim_0", "dim_1"], int)?)
}

/// Registry of the example datasets; the random dataset is optional.
///
/// # Errors
/// Returns an error if a dataset cannot be assembled.
pub fn registry(include_random: bool) -> crate::Result<Registry> {
    let registry = Registry::new().with_dataset(ONES, generated_ones()?)?;
    if include_random {
        registry.with_dataset(RANDOM, generated_random()?)
    } else {
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::retrieve_chunk;
    use crate::chunk_key_encoding::ChunkKey;

    #[test]
    fn linspace_endpoints() {
        let values = linspace(-100.0, 0.0, 101);
        assert_eq!(values.len(), 101);
        assert_eq!(values[0], -100.0);
        assert!((values[100] - 0.0).abs() < 1e-9);
        assert!((values[50] + 50.0).abs() < 1e-9);
    }

    #[test]
    fn ones_layout() {
        let ds = generated_ones().unwrap();
        let names: Vec<_> = ds.variables().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ones", "x", "y", "z"]);
        assert_eq!(ds.coordinates().count(), 3);
        assert_eq!(ds.variable("ones").unwrap().shape(), &[101, 101, 101]);
    }

    #[test]
    fn random_is_deterministic_and_in_range() {
        let ds = generated_random().unwrap();
        let float = ds.variable("float").unwrap();
        let key = ChunkKey::new(vec![39, 2]);
        let first = retrieve_chunk(float.source(), &key).unwrap();
        let second = retrieve_chunk(float.source(), &key).unwrap();
        assert_eq!(first.len(), 1000 * 1000 * 8);
        assert_eq!(first, second);
        let values: Vec<f64> = first
            .chunks_exact(8)
            .take(1000)
            .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
            .collect();
        assert!(values.iter().all(|v| (0.0..1.0).contains(v)));

        let int = ds.variable("int").unwrap();
        let payload = retrieve_chunk(int.source(), &ChunkKey::new(vec![40, 0])).unwrap();
        assert!(payload.iter().all(|&b| b == 0));
    }

    #[test]
    fn registry_names() {
        let names: Vec<String> = registry(false)
            .unwrap()
            .dataset_names()
            .map(String::from)
            .collect();
        assert_eq!(names, vec![ONES]);
    }
}
