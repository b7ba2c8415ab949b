use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValue, Attributes};
use crate::dataset::{Dataset, Variable};

/// Attribute key holding the dimension names of an array, as used by xarray.
pub const ARRAY_DIMENSIONS_KEY: &str = "_ARRAY_DIMENSIONS";

pub const ZGROUP: &str = ".zgroup";
pub const ZATTRS: &str = ".zattrs";
pub const ZARRAY: &str = ".zarray";
pub const ZMETADATA: &str = ".zmetadata";

/// Contents of a `.zgroup` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadataV2 {
    pub zarr_format: u8,
}

impl Default for GroupMetadataV2 {
    fn default() -> Self {
        Self { zarr_format: 2 }
    }
}

/// Memory layout of chunks. Only C order is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayOrder {
    C,
}

/// The fill value advertised for floating point arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillValueMetadataV2 {
    NaN,
}

/// Contents of a `.zarray` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayMetadataV2 {
    /// Chunk shape.
    pub chunks: Vec<u64>,
    /// Always `null`: chunks are uncompressed.
    pub compressor: Option<serde_json::Value>,
    /// NumPy type string, e.g. `<f4`.
    pub dtype: String,
    /// `"NaN"` for floating point arrays, otherwise `null`.
    pub fill_value: Option<FillValueMetadataV2>,
    /// Always `null`: there is no filter pipeline.
    pub filters: Option<Vec<serde_json::Value>>,
    pub order: ArrayOrder,
    /// Array shape.
    pub shape: Vec<u64>,
    pub zarr_format: u8,
}

impl ArrayMetadataV2 {
    pub fn new(variable: &Variable) -> Self {
        let data_type = variable.data_type();
        Self {
            chunks: variable.chunk_grid().chunk_shape().to_vec(),
            compressor: None,
            dtype: data_type.numpy_str().to_string(),
            fill_value: data_type.is_float().then_some(FillValueMetadataV2::NaN),
            filters: None,
            order: ArrayOrder::C,
            shape: variable.shape().to_vec(),
            zarr_format: 2,
        }
    }
}

/// Contents of the `.zattrs` document of an array:
/// the attributes of the variable plus its dimension names.
pub fn array_attributes(variable: &Variable) -> Attributes {
    let mut attributes = variable.attributes().clone();
    attributes.insert(
        ARRAY_DIMENSIONS_KEY.to_string(),
        AttributeValue::Sequence(
            variable
                .dimensions()
                .iter()
                .map(|d| AttributeValue::String(d.clone()))
                .collect(),
        ),
    );
    attributes
}

/// Any of the documents aggregated by consolidated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataDocument {
    Array(ArrayMetadataV2),
    Group(GroupMetadataV2),
    Attributes(Attributes),
}

impl From<ArrayMetadataV2> for MetadataDocument {
    fn from(value: ArrayMetadataV2) -> Self {
        Self::Array(value)
    }
}

impl From<GroupMetadataV2> for MetadataDocument {
    fn from(value: GroupMetadataV2) -> Self {
        Self::Group(value)
    }
}

impl From<Attributes> for MetadataDocument {
    fn from(value: Attributes) -> Self {
        Self::Attributes(value)
    }
}

/// Contents of a `.zmetadata` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedMetadata {
    /// Documents keyed by their path relative to the dataset root.
    pub metadata: BTreeMap<String, MetadataDocument>,
    pub zarr_consolidated_format: u8,
}

impl ConsolidatedMetadata {
    pub fn new(dataset: &Dataset) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(ZATTRS.to_string(), dataset.attributes().clone().into());
        metadata.insert(ZGROUP.to_string(), GroupMetadataV2::default().into());
        for (name, variable) in dataset.variables() {
            metadata.insert(
                format!("{name}/{ZARRAY}"),
                ArrayMetadataV2::new(variable).into(),
            );
            metadata.insert(
                format!("{name}/{ZATTRS}"),
                array_attributes(variable).into(),
            );
        }
        Self {
            metadata,
            zarr_consolidated_format: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::array::MemoryArray;

    fn ones() -> Variable {
        Variable::data(["x", "y", "z"], MemoryArray::filled(vec![250, 250, 250], 1.0f32))
            .unwrap()
            .with_attribute("abc", "xyz")
            .with_attribute("integer", 1i64)
    }

    #[test]
    fn zgroup() {
        let json = serde_json::to_string(&GroupMetadataV2::default()).unwrap();
        assert_eq!(json, r#"{"zarr_format":2}"#);
    }

    #[test]
    fn zarray_float() {
        let json = serde_json::to_string(&ArrayMetadataV2::new(&ones())).unwrap();
        let expected = concat!(
            r#"{"chunks":[1,1,100],"compressor":null,"dtype":"<f4","fill_value":"NaN","#,
            r#""filters":null,"order":"C","shape":[250,250,250],"zarr_format":2}"#
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn zarray_int() {
        let v = Variable::data(["t"], MemoryArray::filled(vec![5], 3i64)).unwrap();
        let value = serde_json::to_value(ArrayMetadataV2::new(&v)).unwrap();
        assert_eq!(value["fill_value"], serde_json::Value::Null);
        assert_eq!(value["dtype"], json!("<i8"));
        assert_eq!(value["chunks"], json!([5]));
    }

    #[test]
    fn zarray_scalar() {
        let v = Variable::data(Vec::<String>::new(), MemoryArray::filled(vec![], 1.0f64)).unwrap();
        let value = serde_json::to_value(ArrayMetadataV2::new(&v)).unwrap();
        assert_eq!(value["shape"], json!([]));
        assert_eq!(value["chunks"], json!([1]));
    }

    #[test]
    fn zattrs_include_dimensions() {
        let value = serde_json::to_value(array_attributes(&ones())).unwrap();
        assert_eq!(
            value,
            json!({"_ARRAY_DIMENSIONS": ["x", "y", "z"], "abc": "xyz", "integer": 1})
        );
    }

    #[test]
    fn consolidated() {
        let x = Variable::coordinate(["x"], MemoryArray::filled(vec![250], 0.0f64)).unwrap();
        let ds = Dataset::new()
            .with_attribute("global-attributes", "yes")
            .with_variable("ones", ones())
            .unwrap()
            .with_variable("x", x)
            .unwrap();
        let value = serde_json::to_value(ConsolidatedMetadata::new(&ds)).unwrap();
        assert_eq!(value["zarr_consolidated_format"], json!(1));
        let metadata = value["metadata"].as_object().unwrap();
        let keys: Vec<_> = metadata.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![".zattrs", ".zgroup", "ones/.zarray", "ones/.zattrs", "x/.zarray", "x/.zattrs"]
        );
        assert_eq!(metadata[".zgroup"], json!({"zarr_format": 2}));
        assert_eq!(metadata[".zattrs"], json!({"global-attributes": "yes"}));
        assert_eq!(metadata["x/.zattrs"], json!({"_ARRAY_DIMENSIONS": ["x"]}));
        assert_eq!(metadata["ones/.zarray"]["chunks"], json!([1, 1, 100]));
    }

    #[test]
    fn consolidated_is_reproducible() {
        let ds = Dataset::new().with_variable("ones", ones()).unwrap();
        let first = serde_json::to_vec(&ConsolidatedMetadata::new(&ds)).unwrap();
        let second = serde_json::to_vec(&ConsolidatedMetadata::new(&ds)).unwrap();
        assert_eq!(first, second);
    }
}
