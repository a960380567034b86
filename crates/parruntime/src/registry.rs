use crate::engine::Engine;
use crate::executor::ExecutionMode;
use parcore::{EngineError, GraphArg, Params, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed per-item results streamed out of a lazy algorithm
pub type ValueStream = Box<dyn Iterator<Item = Result<(String, Value), EngineError>> + Send>;

/// Output of an algorithm invoked through the registry
pub enum AlgorithmOutput {
    Aggregate(Value),
    Stream(ValueStream),
}

impl AlgorithmOutput {
    /// Lift a keyed result stream into a registry output.
    pub fn stream<I>(items: I) -> Self
    where
        I: Iterator<Item = Result<(String, Value), EngineError>> + Send + 'static,
    {
        AlgorithmOutput::Stream(Box::new(items))
    }

    /// Stream of typed `(key, value)` results, converted to [`Value`] on read
    pub fn keyed<I, V>(items: I) -> Self
    where
        I: Iterator<Item = Result<(String, V), EngineError>> + Send + 'static,
        V: Into<Value>,
    {
        Self::stream(items.map(|item| item.map(|(key, value)| (key, value.into()))))
    }

    /// Drain a stream into an object keyed by item; aggregates pass through.
    pub fn into_value(self) -> Result<Value, EngineError> {
        match self {
            AlgorithmOutput::Aggregate(value) => Ok(value),
            AlgorithmOutput::Stream(items) => {
                let object = items.collect::<Result<_, _>>()?;
                Ok(Value::Object(object))
            }
        }
    }
}

/// Trait implemented by every algorithm exposed through the registry
pub trait AlgorithmEntry: Send + Sync {
    /// Registered name; a dotted name places the entry in a namespace.
    fn name(&self) -> &str;

    fn metadata(&self) -> AlgorithmMetadata {
        AlgorithmMetadata::default()
    }

    fn invoke(&self, engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError>;
}

/// Metadata about an algorithm
#[derive(Debug, Clone)]
pub struct AlgorithmMetadata {
    pub description: String,
    pub family: String,
    pub mode: ExecutionMode,
    pub parameters: Vec<ParamDefinition>,
}

impl Default for AlgorithmMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            family: "general".to_string(),
            mode: ExecutionMode::Eager,
            parameters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ParamDefinition {
    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
        }
    }
}

/// Registry of available algorithms.
///
/// Plain names live in the root table. `family.name` entries live in a
/// namespace table keyed by `family`; lookups split on the last dot.
pub struct AlgorithmRegistry {
    root: HashMap<String, Arc<dyn AlgorithmEntry>>,
    namespaces: HashMap<String, HashMap<String, Arc<dyn AlgorithmEntry>>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self {
            root: HashMap::new(),
            namespaces: HashMap::new(),
        }
    }

    /// Register an algorithm
    pub fn register(&mut self, entry: Arc<dyn AlgorithmEntry>) {
        let name = entry.name().to_string();
        tracing::info!("Registering algorithm: {}", name);
        match name.rsplit_once('.') {
            Some((namespace, attr)) => {
                self.namespaces
                    .entry(namespace.to_string())
                    .or_default()
                    .insert(attr.to_string(), entry);
            }
            None => {
                self.root.insert(name, entry);
            }
        }
    }

    /// Look up an algorithm by plain or dotted name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AlgorithmEntry>, EngineError> {
        let found = match name.rsplit_once('.') {
            Some((namespace, attr)) => self
                .namespaces
                .get(namespace)
                .and_then(|entries| entries.get(attr)),
            None => self.root.get(name),
        };
        found
            .cloned()
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }

    /// Every registered fully-qualified name, sorted
    pub fn list_algorithms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.root.keys().cloned().collect();
        for (namespace, entries) in &self.namespaces {
            names.extend(entries.keys().map(|attr| format!("{}.{}", namespace, attr)));
        }
        names.sort();
        names
    }

    /// Get metadata for an algorithm
    pub fn get_metadata(&self, name: &str) -> Option<AlgorithmMetadata> {
        self.resolve(name).ok().map(|entry| entry.metadata())
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(&'static str);

    impl AlgorithmEntry for Constant {
        fn name(&self) -> &str {
            self.0
        }

        fn invoke(&self, _: &Engine, graph: GraphArg, _: &Params) -> Result<AlgorithmOutput, EngineError> {
            Ok(AlgorithmOutput::Aggregate(Value::from(graph.concrete().node_count())))
        }
    }

    fn registry() -> AlgorithmRegistry {
        let mut registry = AlgorithmRegistry::new();
        registry.register(Arc::new(Constant("number_of_isolates")));
        registry.register(Arc::new(Constant("connectivity.all_pairs_node_connectivity")));
        registry
    }

    #[test]
    fn dotted_names_resolve_through_namespace() {
        let registry = registry();
        let entry = registry
            .resolve("connectivity.all_pairs_node_connectivity")
            .unwrap();
        assert_eq!(entry.name(), "connectivity.all_pairs_node_connectivity");
        assert!(registry.resolve("number_of_isolates").is_ok());
    }

    #[test]
    fn unknown_namespace_or_attribute_is_not_found() {
        let registry = registry();
        for name in ["foo.bar", "connectivity.missing", "all_pairs_node_connectivity", ""] {
            assert!(
                matches!(registry.resolve(name), Err(EngineError::NotFound(n)) if n == name),
                "{name} should not resolve"
            );
        }
    }

    #[test]
    fn listing_is_sorted_and_qualified() {
        assert_eq!(
            registry().list_algorithms(),
            vec![
                "connectivity.all_pairs_node_connectivity".to_string(),
                "number_of_isolates".to_string(),
            ]
        );
    }

    #[test]
    fn stream_output_collects_into_object() {
        let items = vec![Ok(("a".to_string(), Value::from(1.0))), Ok(("b".to_string(), Value::from(2.0)))];
        let value = AlgorithmOutput::stream(items.into_iter()).into_value().unwrap();
        assert_eq!(value.as_object().map(|o| o.len()), Some(2));
    }
}
