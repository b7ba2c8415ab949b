use bytes::Bytes;
use log::debug;
use zarrs::array::ArraySubset;

use crate::array::ArraySource;
use crate::chunk_grid::ChunkGrid;
use crate::chunk_key_encoding::ChunkKey;

/// Place the row-major `data` of a region with shape `region_shape` at the origin of a
/// zero-filled buffer with shape `chunk_shape`.
///
/// A rank-0 region is treated as the shape `[1]`.
///
/// # Errors
/// Returns an error if the region does not fit in the chunk,
/// or [`crate::Error::BackendRead`] if `data` has the wrong length.
pub fn pad_to_chunk(
    data: &[u8],
    region_shape: &[u64],
    chunk_shape: &[u64],
    element_size: usize,
) -> crate::Result<Vec<u8>> {
    let region_shape = if region_shape.is_empty() {
        &[1][..]
    } else {
        region_shape
    };
    if region_shape.len() != chunk_shape.len()
        || region_shape.iter().zip(chunk_shape).any(|(r, c)| r > c)
    {
        return Err(crate::Error::general(format!(
            "region with shape {region_shape:?} does not fit in chunk with shape {chunk_shape:?}"
        )));
    }

    let expected = region_shape.iter().product::<u64>() as usize * element_size;
    if data.len() != expected {
        return Err(crate::Error::backend(format!(
            "read {} bytes for region with shape {region_shape:?}, expected {expected}",
            data.len()
        )));
    }
    if region_shape == chunk_shape {
        return Ok(data.to_vec());
    }

    let mut out = vec![0u8; chunk_shape.iter().product::<u64>() as usize * element_size];
    if expected == 0 {
        return Ok(out);
    }
    let runs = ArraySubset::new_with_shape(region_shape.to_vec())
        .contiguous_linearised_indices(chunk_shape)
        .map_err(|e| crate::Error::general(e.to_string()))?;
    let run = runs.contiguous_elements_usize() * element_size;
    for (n, (element, _)) in runs.iter().enumerate() {
        let dst = element as usize * element_size;
        let src = n * run;
        out[dst..dst + run].copy_from_slice(&data[src..src + run]);
    }
    Ok(out)
}

/// Materialize the chunk at `key` as a full-size, zero-padded row-major payload.
///
/// The payload always holds `product(chunk_shape) * element_size` bytes.
/// Chunks outside the array are all zeros and do not read the backend.
///
/// # Errors
/// Returns [`crate::Error::MalformedAddress`] if the key does not fit the grid,
/// or [`crate::Error::BackendRead`] if reading the source fails.
pub fn retrieve_chunk(source: &dyn ArraySource, key: &ChunkKey) -> crate::Result<Bytes> {
    let grid = ChunkGrid::new(source.shape());
    let subset = grid.chunk_subset(key)?;
    let element_size = source.data_type().size();
    let data = if subset.is_empty() {
        Vec::new()
    } else {
        source.read_subset(&subset)?
    };
    debug!("chunk {key} of {:?}: subset {subset}", grid.array_shape());
    let payload = pad_to_chunk(&data, subset.shape(), grid.chunk_shape(), element_size)?;
    Ok(Bytes::from(payload))
}
