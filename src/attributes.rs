use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute mapping of a dataset or variable, ordered by name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A JSON-compatible attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<AttributeValue>),
    Mapping(BTreeMap<String, AttributeValue>),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(value: Vec<T>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_untagged() {
        let mut nested = BTreeMap::new();
        nested.insert("units".to_string(), AttributeValue::from("m"));
        let mut attrs = Attributes::new();
        attrs.insert("integer".into(), 1i64.into());
        attrs.insert("floating".into(), 1.5f64.into());
        attrs.insert("flag".into(), true.into());
        attrs.insert("range".into(), vec![0.0f64, 1.0].into());
        attrs.insert("nested".into(), AttributeValue::Mapping(nested));
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(
            json,
            r#"{"flag":true,"floating":1.5,"integer":1,"nested":{"units":"m"},"range":[0.0,1.0]}"#
        );
    }

    #[test]
    fn integers_stay_integers() {
        let value: AttributeValue = serde_json::from_str("3").unwrap();
        assert_eq!(value, AttributeValue::Int(3));
        let value: AttributeValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(value, AttributeValue::Float(3.5));
    }
}
