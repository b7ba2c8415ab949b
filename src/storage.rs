use std::sync::Arc;

use bytes::Bytes;
use zarrs::storage::{
    ListableStorageTraits, MaybeBytes, MaybeBytesIterator, ReadableStorageTraits, StorageError,
    StoreKey, StoreKeys, StoreKeysPrefixes, StorePrefix,
    byte_range::{ByteRange, ByteRangeIterator, InvalidByteRangeError},
};

use crate::dataset::Registry;
use crate::resource::{Content, Resource};

/// A read-only zarrs store exposing a [`Registry`] as a Zarr v2 hierarchy.
///
/// Store keys are the HTTP paths of the served values without the leading `/`,
/// e.g. `generated-ones/ones/.zarray` or `generated-ones/ones/0.0.1`.
#[derive(Debug, Clone)]
pub struct ZarrV2Store {
    registry: Arc<Registry>,
}

impl ZarrV2Store {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Map a key to the stored value it names, if any.
    fn resolve(&self, key: &StoreKey) -> Option<Resource> {
        Resource::parse(key.as_str()).filter(|r| !r.is_listing())
    }

    /// Convert a registry error, treating not-found class errors as missing keys.
    fn convert_error<T>(result: crate::Result<Option<T>>) -> Result<Option<T>, StorageError> {
        match result {
            Ok(v) => Ok(v),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => {
                log::warn!("store read failed: {e}");
                Err(StorageError::Other(e.to_string()))
            }
        }
    }

    fn get_value(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        let Some(resource) = self.resolve(key) else {
            return Ok(None);
        };
        Self::convert_error(
            self.registry
                .fetch(&resource)
                .map(Content::into_bytes),
        )
    }

    fn value_size(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        let Some(resource) = self.resolve(key) else {
            return Ok(None);
        };
        Self::convert_error(self.registry.value_size(&resource))
    }

    /// Every stored value of the hierarchy, listings excluded.
    fn all_resources(&self) -> Vec<Resource> {
        let mut resources = Vec::new();
        for (name, dataset) in self.registry.datasets() {
            resources.push(Resource::DatasetAttributes(name.to_string()));
            resources.push(Resource::Group(name.to_string()));
            resources.push(Resource::ConsolidatedMetadata(name.to_string()));
            for (var_name, variable) in dataset.variables() {
                resources.push(Resource::ArrayMetadata {
                    dataset: name.to_string(),
                    variable: var_name.to_string(),
                });
                resources.push(Resource::ArrayAttributes {
                    dataset: name.to_string(),
                    variable: var_name.to_string(),
                });
                let chunks = variable.chunk_grid().chunk_keys();
                resources.extend(chunks.map(|chunk| Resource::Chunk {
                    dataset: name.to_string(),
                    variable: var_name.to_string(),
                    chunk: chunk.encode(),
                }));
            }
        }
        resources
    }

    fn all_keys(&self) -> Result<StoreKeys, StorageError> {
        let mut keys = self
            .all_resources()
            .iter()
            .filter_map(Resource::key)
            .map(StoreKey::new)
            .collect::<Result<StoreKeys, _>>()?;
        keys.sort();
        Ok(keys)
    }

    fn keys_with_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        Ok(self
            .all_keys()?
            .into_iter()
            .filter(|k| k.has_prefix(prefix))
            .collect())
    }

    fn dir_entries(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        let mut keys = Vec::new();
        let mut prefixes = Vec::new();
        let listing = match Resource::parse(prefix.as_str()) {
            Some(resource) if resource.is_listing() => self.registry.fetch(&resource),
            _ => Ok(Content::Listing(Vec::new())),
        };
        let entries = match listing {
            Ok(Content::Listing(entries)) => entries,
            Ok(_) => Vec::new(),
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(StorageError::Other(e.to_string())),
        };
        for entry in entries {
            let path = format!("{}{entry}", prefix.as_str());
            if entry.ends_with('/') {
                prefixes.push(StorePrefix::new(path)?);
            } else {
                keys.push(StoreKey::new(path)?);
            }
        }
        Ok(StoreKeysPrefixes::new(keys, prefixes))
    }

    fn prefix_size(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        let mut size = 0;
        for key in self.keys_with_prefix(prefix)? {
            if let Some(key_size) = self.value_size(&key)? {
                size += key_size;
            }
        }
        Ok(size)
    }
}

fn slice_value(data: &Bytes, byte_range: ByteRange) -> Result<Bytes, StorageError> {
    let len = data.len() as u64;
    let out_of_bounds = match byte_range {
        ByteRange::FromStart(offset, length) => offset
            .checked_add(length.unwrap_or(0))
            .is_none_or(|end| end > len),
        ByteRange::Suffix(length) => length > len,
    };
    if out_of_bounds {
        return Err(InvalidByteRangeError::new(byte_range, len).into());
    }
    Ok(data.slice(byte_range.to_range_usize(len)))
}

impl ReadableStorageTraits for ZarrV2Store {
    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        self.value_size(key)
    }

    fn supports_get_partial(&self) -> bool {
        true
    }

    fn get(&self, key: &StoreKey) -> Result<MaybeBytes, StorageError> {
        self.get_value(key)
    }

    fn get_partial_many<'a>(
        &'a self,
        key: &StoreKey,
        byte_ranges: ByteRangeIterator<'a>,
    ) -> Result<MaybeBytesIterator<'a>, StorageError> {
        let Some(data) = self.get_value(key)? else {
            return Ok(None);
        };
        Ok(Some(Box::new(
            byte_ranges.map(move |byte_range| slice_value(&data, byte_range)),
        )))
    }
}

impl ListableStorageTraits for ZarrV2Store {
    fn list(&self) -> Result<StoreKeys, StorageError> {
        self.all_keys()
    }

    fn list_prefix(&self, prefix: &StorePrefix) -> Result<StoreKeys, StorageError> {
        self.keys_with_prefix(prefix)
    }

    fn list_dir(&self, prefix: &StorePrefix) -> Result<StoreKeysPrefixes, StorageError> {
        self.dir_entries(prefix)
    }

    fn size_prefix(&self, prefix: &StorePrefix) -> Result<u64, StorageError> {
        self.prefix_size(prefix)
    }

    fn size(&self) -> Result<u64, StorageError> {
        self.prefix_size(&StorePrefix::root())
    }
}
