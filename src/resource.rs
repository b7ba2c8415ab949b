//! Resolution of hierarchy paths to the listings, documents and chunks they name.
//!
//! Paths are those of the HTTP routes, with or without the leading `/`:
//!
//! | path                 | resource                      |
//! |----------------------|-------------------------------|
//! | (empty)              | listing of datasets           |
//! | `ds/`                | listing of a dataset          |
//! | `ds/.zgroup`         | group metadata                |
//! | `ds/.zattrs`         | dataset attributes            |
//! | `ds/.zmetadata`      | consolidated metadata         |
//! | `ds/var/`            | listing of a variable         |
//! | `ds/var/.zarray`     | array metadata                |
//! | `ds/var/.zattrs`     | array attributes              |
//! | `ds/var/<chunk>`     | chunk payload                 |

use bytes::Bytes;
use serde::Serialize;

use crate::chunk::retrieve_chunk;
use crate::chunk_key_encoding::ChunkKey;
use crate::dataset::Registry;
use crate::metadata::{
    ArrayMetadataV2, ConsolidatedMetadata, GroupMetadataV2, ZARRAY, ZATTRS, ZGROUP, ZMETADATA,
    array_attributes,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Root,
    Dataset(String),
    Group(String),
    DatasetAttributes(String),
    ConsolidatedMetadata(String),
    Variable { dataset: String, variable: String },
    ArrayMetadata { dataset: String, variable: String },
    ArrayAttributes { dataset: String, variable: String },
    Chunk {
        dataset: String,
        variable: String,
        chunk: String,
    },
}

impl Resource {
    /// Parse a path into a resource.
    ///
    /// Returns [`None`] for paths that cannot name anything in the hierarchy,
    /// such as `favicon.ico`.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return Some(Self::Root);
        }
        let parts: Vec<&str> = path.split('/').collect();
        if parts[..parts.len() - 1].iter().any(|p| p.is_empty()) {
            return None;
        }
        let resource = match parts.as_slice() {
            [dataset, ""] => Self::Dataset(dataset.to_string()),
            [dataset, name] => {
                let dataset = dataset.to_string();
                match *name {
                    ZGROUP => Self::Group(dataset),
                    ZATTRS => Self::DatasetAttributes(dataset),
                    ZMETADATA => Self::ConsolidatedMetadata(dataset),
                    _ => return None,
                }
            }
            [dataset, variable, name] => {
                let dataset = dataset.to_string();
                let variable = variable.to_string();
                match *name {
                    "" => Self::Variable { dataset, variable },
                    ZARRAY => Self::ArrayMetadata { dataset, variable },
                    ZATTRS => Self::ArrayAttributes { dataset, variable },
                    chunk => Self::Chunk {
                        dataset,
                        variable,
                        chunk: chunk.to_string(),
                    },
                }
            }
            _ => return None,
        };
        Some(resource)
    }

    /// Whether the resource is a directory listing rather than a stored value.
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::Root | Self::Dataset(_) | Self::Variable { .. })
    }

    /// The store key of a stored value, without leading `/`.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Root | Self::Dataset(_) | Self::Variable { .. } => None,
            Self::Group(ds) => Some(format!("{ds}/{ZGROUP}")),
            Self::DatasetAttributes(ds) => Some(format!("{ds}/{ZATTRS}")),
            Self::ConsolidatedMetadata(ds) => Some(format!("{ds}/{ZMETADATA}")),
            Self::ArrayMetadata { dataset, variable } => {
                Some(format!("{dataset}/{variable}/{ZARRAY}"))
            }
            Self::ArrayAttributes { dataset, variable } => {
                Some(format!("{dataset}/{variable}/{ZATTRS}"))
            }
            Self::Chunk {
                dataset,
                variable,
                chunk,
            } => Some(format!("{dataset}/{variable}/{chunk}")),
        }
    }
}

/// What a resource resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Sorted directory entries; sub-directories end with `/`.
    Listing(Vec<String>),
    /// A serialized JSON document.
    Json(Bytes),
    /// A raw chunk payload.
    Chunk(Bytes),
}

impl Content {
    fn json<T: Serialize>(document: &T) -> crate::Result<Self> {
        Ok(Self::Json(Bytes::from(serde_json::to_vec(document)?)))
    }

    /// The bytes of a stored value; [`None`] for listings.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Self::Listing(_) => None,
            Self::Json(b) | Self::Chunk(b) => Some(b),
        }
    }
}

impl Registry {
    /// Sorted entries of the root listing.
    pub fn list_root(&self) -> Vec<String> {
        self.dataset_names().map(|n| format!("{n}/")).collect()
    }

    /// Sorted entries of a dataset listing: its variables and metadata documents.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownDataset`] if there is no such dataset.
    pub fn list_dataset(&self, dataset: &str) -> crate::Result<Vec<String>> {
        let ds = self.dataset(dataset)?;
        let mut entries: Vec<String> = ds.variables().map(|(n, _)| format!("{n}/")).collect();
        entries.extend([ZGROUP, ZATTRS, ZMETADATA].map(String::from));
        entries.sort();
        Ok(entries)
    }

    /// Sorted entries of a variable listing: its chunk keys and metadata documents.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownDataset`] or [`crate::Error::UnknownVariable`].
    pub fn list_variable(&self, dataset: &str, variable: &str) -> crate::Result<Vec<String>> {
        let var = self.variable(dataset, variable)?;
        let mut entries: Vec<String> = var.chunk_grid().chunk_keys().map(|k| k.encode()).collect();
        entries.extend([ZARRAY, ZATTRS].map(String::from));
        entries.sort();
        Ok(entries)
    }

    /// Resolve a resource.
    ///
    /// Chunk resources read the backing array and may block.
    ///
    /// # Errors
    /// Returns a not-found class error (see [`crate::Error::is_not_found`]) if the resource
    /// does not exist, or [`crate::Error::BackendRead`] if a chunk cannot be read.
    pub fn fetch(&self, resource: &Resource) -> crate::Result<Content> {
        match resource {
            Resource::Root => Ok(Content::Listing(self.list_root())),
            Resource::Dataset(ds) => self.list_dataset(ds).map(Content::Listing),
            Resource::Group(ds) => {
                self.dataset(ds)?;
                Content::json(&GroupMetadataV2::default())
            }
            Resource::DatasetAttributes(ds) => Content::json(self.dataset(ds)?.attributes()),
            Resource::ConsolidatedMetadata(ds) => {
                Content::json(&ConsolidatedMetadata::new(self.dataset(ds)?))
            }
            Resource::Variable { dataset, variable } => {
                self.list_variable(dataset, variable).map(Content::Listing)
            }
            Resource::ArrayMetadata { dataset, variable } => {
                Content::json(&ArrayMetadataV2::new(self.variable(dataset, variable)?))
            }
            Resource::ArrayAttributes { dataset, variable } => {
                Content::json(&array_attributes(self.variable(dataset, variable)?))
            }
            Resource::Chunk {
                dataset,
                variable,
                chunk,
            } => {
                let var = self.variable(dataset, variable)?;
                let key = ChunkKey::decode(chunk)?;
                retrieve_chunk(var.source(), &key).map(Content::Chunk)
            }
        }
    }

    /// Size in bytes of a stored value, without reading chunk data.
    ///
    /// # Errors
    /// As [`Registry::fetch`], except that backend reads cannot fail.
    pub fn value_size(&self, resource: &Resource) -> crate::Result<Option<u64>> {
        if let Resource::Chunk {
            dataset,
            variable,
            chunk,
        } = resource
        {
            let var = self.variable(dataset, variable)?;
            let grid = var.chunk_grid();
            grid.chunk_subset(&ChunkKey::decode(chunk)?)?;
            return Ok(Some(
                grid.chunk_num_elements() * var.data_type().size() as u64,
            ));
        }
        Ok(self
            .fetch(resource)?
            .into_bytes()
            .map(|b| b.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::MemoryArray;
    use crate::dataset::{Dataset, Variable};

    fn registry() -> Registry {
        let v = Variable::data(["x"], MemoryArray::filled(vec![1000], 2u16)).unwrap();
        let s = Variable::data(Vec::<String>::new(), MemoryArray::filled(vec![], 1.0f64)).unwrap();
        let ds = Dataset::new()
            .with_variable("v", v)
            .unwrap()
            .with_variable("s", s)
            .unwrap();
        Registry::new().with_dataset("ds", ds).unwrap()
    }

    #[test]
    fn parse_paths() {
        assert_eq!(Resource::parse("/"), Some(Resource::Root));
        assert_eq!(Resource::parse(""), Some(Resource::Root));
        assert_eq!(
            Resource::parse("/ds/"),
            Some(Resource::Dataset("ds".into()))
        );
        assert_eq!(
            Resource::parse("ds/.zmetadata"),
            Some(Resource::ConsolidatedMetadata("ds".into()))
        );
        assert_eq!(
            Resource::parse("/ds/v/"),
            Some(Resource::Variable {
                dataset: "ds".into(),
                variable: "v".into()
            })
        );
        assert_eq!(
            Resource::parse("/ds/v/0.1"),
            Some(Resource::Chunk {
                dataset: "ds".into(),
                variable: "v".into(),
                chunk: "0.1".into()
            })
        );
    }

    #[test]
    fn parse_unknown_paths() {
        for path in ["/favicon.ico", "/ds", "/ds/other", "//", "/ds//.zarray", "/a/b/c/d"] {
            assert_eq!(Resource::parse(path), None, "{path}");
        }
    }

    #[test]
    fn keys_round_trip() {
        for path in ["ds/.zgroup", "ds/v/.zarray", "ds/v/.zattrs", "ds/v/3"] {
            let resource = Resource::parse(path).unwrap();
            assert!(!resource.is_listing());
            assert_eq!(resource.key().as_deref(), Some(path));
        }
    }

    #[test]
    fn listings() {
        let registry = registry();
        assert_eq!(registry.list_root(), vec!["ds/"]);
        assert_eq!(
            registry.list_dataset("ds").unwrap(),
            vec![".zattrs", ".zgroup", ".zmetadata", "s/", "v/"]
        );
        assert_eq!(
            registry.list_variable("ds", "v").unwrap(),
            vec![".zarray", ".zattrs", "0", "1"]
        );
        assert_eq!(
            registry.list_variable("ds", "s").unwrap(),
            vec![".zarray", ".zattrs", "0"]
        );
    }

    #[test]
    fn unknown_dataset_not_found() {
        let registry = registry();
        for path in [
            "/missing/",
            "/missing/.zattrs",
            "/missing/.zgroup",
            "/missing/v/.zarray",
            "/missing/v/0",
        ] {
            let err = registry.fetch(&Resource::parse(path).unwrap()).unwrap_err();
            assert!(matches!(err, crate::Error::UnknownDataset(_)), "{path}");
        }
    }

    #[test]
    fn unknown_variable_not_found() {
        let registry = registry();
        let err = registry
            .fetch(&Resource::parse("/ds/missing/.zattrs").unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_chunk_not_found() {
        let registry = registry();
        let err = registry
            .fetch(&Resource::parse("/ds/v/.zgroup").unwrap())
            .unwrap_err();
        assert!(matches!(err, crate::Error::MalformedAddress(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn chunk_sizes() {
        let registry = registry();
        let resource = Resource::parse("ds/v/1").unwrap();
        assert_eq!(registry.value_size(&resource).unwrap(), Some(2000));
        let Content::Chunk(bytes) = registry.fetch(&resource).unwrap() else {
            panic!("expected a chunk");
        };
        assert_eq!(bytes.len(), 2000);
        let resource = Resource::parse("ds/s/0").unwrap();
        assert_eq!(registry.value_size(&resource).unwrap(), Some(8));
    }
}
