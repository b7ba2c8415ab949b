use std::collections::BTreeMap;
use std::sync::Arc;

use crate::array::ArraySource;
use crate::attributes::{AttributeValue, Attributes};
use crate::chunk_grid::ChunkGrid;
use crate::data_type::DataType;

/// Whether a variable is a coordinate of its dataset or a data variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Coordinate,
    Data,
}

/// A named array with dimension names and attributes.
#[derive(Debug, Clone)]
pub struct Variable {
    kind: VariableKind,
    dimensions: Vec<String>,
    attributes: Attributes,
    source: Arc<dyn ArraySource>,
}

impl Variable {
    /// Create a variable with one dimension name per dimension of `source`.
    ///
    /// # Errors
    /// Returns an error if the number of dimension names differs from the rank of `source`.
    pub fn new<S: Into<String>>(
        kind: VariableKind,
        dimensions: impl IntoIterator<Item = S>,
        source: Arc<dyn ArraySource>,
    ) -> crate::Result<Self> {
        let dimensions: Vec<String> = dimensions.into_iter().map(Into::into).collect();
        if dimensions.len() != source.shape().len() {
            return Err(crate::Error::general(format!(
                "{} dimension names given for array with shape {:?}",
                dimensions.len(),
                source.shape()
            )));
        }
        Ok(Self {
            kind,
            dimensions,
            attributes: Attributes::new(),
            source,
        })
    }

    pub fn data(
        dimensions: impl IntoIterator<Item = impl Into<String>>,
        source: impl ArraySource + 'static,
    ) -> crate::Result<Self> {
        Self::new(VariableKind::Data, dimensions, Arc::new(source))
    }

    pub fn coordinate(
        dimensions: impl IntoIterator<Item = impl Into<String>>,
        source: impl ArraySource + 'static,
    ) -> crate::Result<Self> {
        Self::new(VariableKind::Coordinate, dimensions, Arc::new(source))
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn shape(&self) -> &[u64] {
        self.source.shape()
    }

    pub fn data_type(&self) -> DataType {
        self.source.data_type()
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn source(&self) -> &dyn ArraySource {
        self.source.as_ref()
    }

    pub fn chunk_grid(&self) -> ChunkGrid {
        ChunkGrid::new(self.shape())
    }
}

/// A named collection of variables plus dataset-level attributes.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    attributes: Attributes,
    variables: BTreeMap<String, Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a variable.
    ///
    /// # Errors
    /// Returns an error if the name is empty, contains `/`, or is already taken.
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        variable: Variable,
    ) -> crate::Result<Self> {
        let name = name.into();
        check_name(&name)?;
        if self.variables.contains_key(&name) {
            return Err(crate::Error::general(format!("duplicate variable {name:?}")));
        }
        self.variables.insert(name, variable);
        Ok(self)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Variables in name order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn data_variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables()
            .filter(|(_, v)| v.kind() == VariableKind::Data)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables()
            .filter(|(_, v)| v.kind() == VariableKind::Coordinate)
    }
}

fn check_name(name: &str) -> crate::Result<()> {
    if name.is_empty() || name.contains('/') || name.starts_with('.') {
        Err(crate::Error::general(format!("invalid name {name:?}")))
    } else {
        Ok(())
    }
}

/// The datasets served by one process, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    datasets: BTreeMap<String, Dataset>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset.
    ///
    /// # Errors
    /// Returns an error if the name is invalid or already registered.
    pub fn with_dataset(
        mut self,
        name: impl Into<String>,
        dataset: Dataset,
    ) -> crate::Result<Self> {
        let name = name.into();
        check_name(&name)?;
        if self.datasets.contains_key(&name) {
            return Err(crate::Error::general(format!("duplicate dataset {name:?}")));
        }
        self.datasets.insert(name, dataset);
        Ok(self)
    }

    /// Look up a dataset.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownDataset`] if there is no such dataset.
    pub fn dataset(&self, name: &str) -> crate::Result<&Dataset> {
        self.datasets
            .get(name)
            .ok_or_else(|| crate::Error::UnknownDataset(name.to_string()))
    }

    /// Look up a variable of a dataset.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownDataset`] or [`crate::Error::UnknownVariable`].
    pub fn variable(&self, dataset: &str, variable: &str) -> crate::Result<&Variable> {
        self.dataset(dataset)?
            .variable(variable)
            .ok_or_else(|| crate::Error::UnknownVariable {
                dataset: dataset.to_string(),
                variable: variable.to_string(),
            })
    }

    /// Dataset names in sorted order.
    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn datasets(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.datasets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::MemoryArray;

    fn dataset() -> Dataset {
        let x = Variable::coordinate(["x"], MemoryArray::filled(vec![4], 0.5f64)).unwrap();
        let v = Variable::data(["x", "y"], MemoryArray::filled(vec![4, 2], 1i32))
            .unwrap()
            .with_attribute("units", "K");
        Dataset::new()
            .with_attribute("title", "test")
            .with_variable("x", x)
            .unwrap()
            .with_variable("v", v)
            .unwrap()
    }

    #[test]
    fn dimension_count_checked() {
        let err = Variable::data(["x"], MemoryArray::filled(vec![4, 2], 1u8)).unwrap_err();
        assert!(matches!(err, crate::Error::General(_)));
    }

    #[test]
    fn kinds() {
        let ds = dataset();
        let data: Vec<_> = ds.data_variables().map(|(n, _)| n).collect();
        let coords: Vec<_> = ds.coordinates().map(|(n, _)| n).collect();
        assert_eq!(data, vec!["v"]);
        assert_eq!(coords, vec!["x"]);
    }

    #[test]
    fn duplicates_rejected() {
        let x = Variable::coordinate(["x"], MemoryArray::filled(vec![4], 0.5f64)).unwrap();
        assert!(dataset().with_variable("x", x).is_err());
        let registry = Registry::new().with_dataset("a", Dataset::new()).unwrap();
        assert!(registry.with_dataset("a", Dataset::new()).is_err());
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(Registry::new().with_dataset("a/b", Dataset::new()).is_err());
        assert!(Registry::new().with_dataset(".zgroup", Dataset::new()).is_err());
        assert!(Registry::new().with_dataset("", Dataset::new()).is_err());
    }

    #[test]
    fn lookups() {
        let registry = Registry::new().with_dataset("ds", dataset()).unwrap();
        assert_eq!(registry.variable("ds", "v").unwrap().shape(), &[4, 2]);
        assert!(matches!(
            registry.variable("missing", "v"),
            Err(crate::Error::UnknownDataset(_))
        ));
        assert!(matches!(
            registry.variable("ds", "missing"),
            Err(crate::Error::UnknownVariable { .. })
        ));
    }
}
