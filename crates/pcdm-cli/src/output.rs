//! Output formatting utilities

use pcdm_core::{Kind, Node, NodeId};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Node as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub model: String,
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NodeView {
    pub fn new(node: &Node, kind: Kind) -> Self {
        Self {
            id: node.id,
            model: node.model.to_string(),
            kind,
            label: node.label.clone(),
        }
    }

    /// Placeholder for an id the store no longer knows
    pub fn missing(id: NodeId) -> Self {
        Self {
            id,
            model: "?".to_string(),
            kind: Kind::Other,
            label: None,
        }
    }

    pub fn table_row(&self) -> String {
        let label = self
            .label
            .as_ref()
            .map(|l| format!("  \"{}\"", l))
            .unwrap_or_default();
        format!("{}  {:<10}  {}{}", self.id, self.kind, self.model, label)
    }
}

/// Pretty JSON, falling back to an empty object
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Print a titled list of nodes in the requested format
pub fn print_nodes(title: &str, nodes: &[NodeView], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(&nodes)),
        OutputFormat::Table => {
            if nodes.is_empty() {
                println!("{}: none", title);
            } else {
                println!("{} ({}):", title, nodes.len());
                for node in nodes {
                    println!("  {}", node.table_row());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Table);
    }

    #[test]
    fn test_table_row() {
        let node = Node::object().with_label("Page 1");
        let row = NodeView::new(&node, Kind::Object).table_row();
        assert!(row.starts_with(&node.id.to_string()));
        assert!(row.contains("pcdm:Object"));
        assert!(row.contains("\"Page 1\""));
    }
}
