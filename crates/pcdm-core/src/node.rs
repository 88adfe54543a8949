//! Node identity and model types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ulid::Ulid;

/// Model name for PCDM collections
pub const COLLECTION_MODEL: &str = "pcdm:Collection";

/// Model name for PCDM objects
pub const OBJECT_MODEL: &str = "pcdm:Object";

/// Model name for PCDM files
pub const FILE_MODEL: &str = "pcdm:File";

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Ulid);

impl NodeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Closed classification of a node, as seen by the aggregation graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Collection,
    Object,
    File,
    /// Anything that is not a PCDM node
    Other,
}

impl Kind {
    /// Kinds allowed on the parent side of a membership edge
    pub fn can_contain(self) -> bool {
        matches!(self, Kind::Collection | Kind::Object)
    }

    /// Kinds allowed on the child side of a membership edge
    pub fn can_be_member(self) -> bool {
        matches!(self, Kind::Object | Kind::File)
    }

    /// Kinds allowed on either side of a relation edge
    pub fn can_relate(self) -> bool {
        self == Kind::Object
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Collection => "collection",
            Kind::Object => "object",
            Kind::File => "file",
            Kind::Other => "other",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collection" => Ok(Kind::Collection),
            "object" => Ok(Kind::Object),
            "file" => Ok(Kind::File),
            "other" => Ok(Kind::Other),
            _ => Err(format!("unknown node kind: {}", s)),
        }
    }
}

/// Model name a node was created as (e.g. `pcdm:Object`, `af:Base`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeModel(pub String);

impl NodeModel {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeModel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeModel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for NodeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node record owned by the node store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,

    /// Model the node was created as
    pub model: NodeModel,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Arbitrary metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a node of an arbitrary model
    pub fn new(model: impl Into<NodeModel>) -> Self {
        Self {
            id: NodeId::new(),
            model: model.into(),
            label: None,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn collection() -> Self {
        Self::new(COLLECTION_MODEL)
    }

    pub fn object() -> Self {
        Self::new(OBJECT_MODEL)
    }

    pub fn file() -> Self {
        Self::new(FILE_MODEL)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A node id paired with its classified kind
///
/// This is what the graph components work with; they never see the full
/// node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedNode {
    pub id: NodeId,
    pub kind: Kind,
}

impl TypedNode {
    pub fn new(id: NodeId, kind: Kind) -> Self {
        Self { id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_constructors() {
        assert_eq!(Node::collection().model.as_str(), COLLECTION_MODEL);
        assert_eq!(Node::object().model.as_str(), OBJECT_MODEL);
        assert_eq!(Node::file().model.as_str(), FILE_MODEL);

        let node = Node::new("af:Base").with_label("legacy");
        assert_eq!(node.model.as_str(), "af:Base");
        assert_eq!(node.label.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_node_id_parse() {
        let id = NodeId::new();
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!(NodeId::from_string("not-a-ulid").is_err());
    }

    #[test]
    fn test_kind_compatibility() {
        assert!(Kind::Collection.can_contain());
        assert!(Kind::Object.can_contain());
        assert!(!Kind::File.can_contain());
        assert!(!Kind::Other.can_contain());

        assert!(!Kind::Collection.can_be_member());
        assert!(Kind::Object.can_be_member());
        assert!(Kind::File.can_be_member());

        assert!(Kind::Object.can_relate());
        assert!(!Kind::File.can_relate());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Object".parse::<Kind>().unwrap(), Kind::Object);
        assert_eq!("file".parse::<Kind>().unwrap(), Kind::File);
        assert!("folder".parse::<Kind>().is_err());
    }
}
