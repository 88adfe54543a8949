//! Model name to kind classification

use crate::node::{Kind, Node, NodeModel, COLLECTION_MODEL, FILE_MODEL, OBJECT_MODEL};
use std::collections::HashMap;

/// Classifies nodes into the closed set of kinds the graphs understand
///
/// Classification is a pure lookup on the node's model name. Any model that
/// was never registered is `Kind::Other`, which callers use to reject input.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    models: HashMap<String, Kind>,
}

impl TypeRegistry {
    /// Registry knowing the three PCDM model names
    pub fn new() -> Self {
        Self::empty()
            .with_model(COLLECTION_MODEL, Kind::Collection)
            .with_model(OBJECT_MODEL, Kind::Object)
            .with_model(FILE_MODEL, Kind::File)
    }

    /// Registry that classifies everything as `Other`
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register a model name as an alias of a kind
    pub fn with_model(mut self, model: impl Into<String>, kind: Kind) -> Self {
        self.models.insert(model.into(), kind);
        self
    }

    pub fn classify(&self, node: &Node) -> Kind {
        self.classify_model(&node.model)
    }

    pub fn classify_model(&self, model: &NodeModel) -> Kind {
        self.models
            .get(model.as_str())
            .copied()
            .unwrap_or(Kind::Other)
    }

    /// Registered model names, sorted
    pub fn models(&self) -> Vec<(&str, Kind)> {
        let mut models: Vec<_> = self.models.iter().map(|(m, k)| (m.as_str(), *k)).collect();
        models.sort_by(|a, b| a.0.cmp(b.0));
        models
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
