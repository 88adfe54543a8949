//! Node commands

use clap::{Args, Subcommand};

use super::{node_views, parse_id};
use crate::output::{print_nodes, to_json, NodeView, OutputFormat};
use crate::AppContext;
use pcdm_core::{Kind, Node, COLLECTION_MODEL, FILE_MODEL, OBJECT_MODEL};
use pcdm_storage::NodeRepository;

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Create a node
    Add {
        /// collection, object, file, or any other model name
        model: String,
        /// Human-readable label
        #[arg(short, long)]
        label: Option<String>,
    },
    /// List nodes
    List {
        /// Filter by kind: collection, object, file, other
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Show a node with its members and related objects
    Show {
        /// Node id
        id: String,
    },
    /// Delete a node; membership and related-object links to it are removed
    Delete {
        /// Node id
        id: String,
    },
}

/// Map the short names to PCDM model names; anything else is used verbatim
fn model_name(model: &str) -> &str {
    match model.to_lowercase().as_str() {
        "collection" => COLLECTION_MODEL,
        "object" => OBJECT_MODEL,
        "file" => FILE_MODEL,
        _ => model,
    }
}

pub async fn run(args: &NodeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running node command");

    match &args.command {
        NodeCommands::Add { model, label } => {
            let mut node = Node::new(model_name(model));
            if let Some(label) = label {
                node = node.with_label(label);
            }
            ctx.storage.save_node(&node).await?;

            let kind = ctx.service.registry().classify(&node);
            tracing::info!("Created {} node {}", kind, node.id);
            if kind == Kind::Other {
                tracing::warn!("Model '{}' is not a PCDM model; the node cannot be aggregated", node.model);
            }

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&NodeView::new(&node, kind))),
                OutputFormat::Table => println!("{}", node.id),
            }
        }
        NodeCommands::List { kind } => {
            let filter = kind
                .as_deref()
                .map(str::parse::<Kind>)
                .transpose()
                .map_err(anyhow::Error::msg)?;

            let views: Vec<NodeView> = ctx
                .storage
                .list_nodes()
                .await?
                .iter()
                .map(|n| NodeView::new(n, ctx.service.registry().classify(n)))
                .filter(|v| filter.map(|k| v.kind == k).unwrap_or(true))
                .collect();

            tracing::info!("Found {} nodes", views.len());
            print_nodes("Nodes", &views, ctx.format);
        }
        NodeCommands::Show { id } => {
            let id = parse_id(id)?;
            let node = ctx
                .storage
                .get_node(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Node {} not found", id))?;
            let view = NodeView::new(&node, ctx.service.registry().classify(&node));

            let members = node_views(ctx, ctx.service.list_members(&id)?).await?;
            let parents = node_views(ctx, ctx.service.list_parents(&id)?).await?;
            let related = node_views(ctx, ctx.service.list_related(&id)?).await?;

            match ctx.format {
                OutputFormat::Json => {
                    let out = serde_json::json!({
                        "node": view,
                        "members": members,
                        "parents": parents,
                        "related": related,
                    });
                    println!("{}", to_json(&out));
                }
                OutputFormat::Table => {
                    println!("{}", view.table_row());
                    print_nodes("Members", &members, ctx.format);
                    print_nodes("Member of", &parents, ctx.format);
                    print_nodes("Related objects", &related, ctx.format);
                }
            }
        }
        NodeCommands::Delete { id } => {
            let id = parse_id(id)?;
            let reports = ctx.storage.delete_node(&id).await?;
            ctx.persist().await?;

            let removed: usize = reports.iter().map(|r| r.edge_count()).sum();
            tracing::info!("Deleted node {} ({} edges removed)", id, removed);

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&reports)),
                OutputFormat::Table => println!("Deleted node {} ({} links removed)", id, removed),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        assert_eq!(model_name("collection"), COLLECTION_MODEL);
        assert_eq!(model_name("Object"), OBJECT_MODEL);
        assert_eq!(model_name("file"), FILE_MODEL);
        assert_eq!(model_name("af:Base"), "af:Base");
    }
}
