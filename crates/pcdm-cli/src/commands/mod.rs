//! CLI command implementations

pub mod completions;
pub mod config;
pub mod member;
pub mod node;
pub mod related;

use crate::output::NodeView;
use crate::AppContext;
use pcdm_core::NodeId;
use pcdm_storage::NodeRepository;

/// Parse a node id given on the command line
pub fn parse_id(s: &str) -> anyhow::Result<NodeId> {
    NodeId::from_string(s).map_err(|e| anyhow::anyhow!("Invalid node id '{}': {}", s, e))
}

/// Look up nodes for display; ids the store no longer has are shown as missing
pub async fn node_views(
    ctx: &AppContext,
    ids: impl IntoIterator<Item = NodeId>,
) -> anyhow::Result<Vec<NodeView>> {
    let mut views = Vec::new();
    for id in ids {
        let view = match ctx.storage.get_node(&id).await? {
            Some(node) => NodeView::new(&node, ctx.service.registry().classify(&node)),
            None => NodeView::missing(id),
        };
        views.push(view);
    }
    Ok(views)
}
