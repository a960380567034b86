use crate::{AlgorithmError, Value, Weight};
use std::collections::HashMap;

/// Named algorithm parameters supplied across the registry boundary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Edge weight selection; `weight` defaults to the `"weight"` attribute.
    pub fn weight(&self) -> Result<Weight, AlgorithmError> {
        match self.values.get("weight") {
            None | Some(Value::Null) => Ok(Weight::default()),
            Some(Value::String(name)) => Ok(Weight::attribute(name.clone())),
            Some(other) => Err(AlgorithmError::InvalidParameter(format!(
                "weight must be an attribute name, got {:?}",
                other
            ))),
        }
    }

    /// Like [`Params::weight`] but `None` when the caller asked for an
    /// unweighted run (no `weight` key or an explicit null).
    pub fn optional_weight(&self) -> Result<Option<Weight>, AlgorithmError> {
        match self.values.get("weight") {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.weight().map(Some),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, AlgorithmError> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| {
                AlgorithmError::InvalidParameter(format!("{} must be a boolean", key))
            }),
        }
    }

    pub fn f64_opt(&self, key: &str) -> Result<Option<f64>, AlgorithmError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                AlgorithmError::InvalidParameter(format!("{} must be a number", key))
            }),
        }
    }

    /// Optional list of node labels, e.g. `nbunch`
    pub fn labels_opt(&self, key: &str) -> Result<Option<Vec<String>>, AlgorithmError> {
        let invalid = || AlgorithmError::InvalidParameter(format!("{} must be a list of node names", key));
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(invalid()),
        }
    }

    pub fn str_opt(&self, key: &str) -> Result<Option<&str>, AlgorithmError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| {
                AlgorithmError::InvalidParameter(format!("{} must be a string", key))
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
