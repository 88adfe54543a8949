//! Related-object commands

use clap::{Args, Subcommand};

use super::{node_views, parse_id};
use crate::output::{print_nodes, to_json, OutputFormat};
use crate::AppContext;

#[derive(Args)]
pub struct RelatedArgs {
    #[command(subcommand)]
    pub command: RelatedCommands,
}

#[derive(Subcommand)]
pub enum RelatedCommands {
    /// Relate one object to another
    Add {
        /// Source object
        source: String,
        /// Related object
        target: String,
    },
    /// Remove a related object
    Remove {
        /// Source object
        source: String,
        /// Related object
        target: String,
    },
    /// List related objects
    List {
        /// Object
        node: String,
        /// List the objects that relate to this one instead
        #[arg(long)]
        incoming: bool,
    },
}

pub async fn run(args: &RelatedArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running related command");

    match &args.command {
        RelatedCommands::Add { source, target } => {
            let (source, target) = (parse_id(source)?, parse_id(target)?);
            let added = ctx.service.add_related(&source, &target).await?;
            if added {
                ctx.persist().await?;
            }

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&serde_json::json!({
                    "source": source,
                    "target": target,
                    "added": added,
                }))),
                OutputFormat::Table if added => println!("Related {} to {}", target, source),
                OutputFormat::Table => println!("{} already related to {}", target, source),
            }
        }
        RelatedCommands::Remove { source, target } => {
            let (source, target) = (parse_id(source)?, parse_id(target)?);
            let edge = ctx.service.remove_related(&source, &target).await?;
            ctx.persist().await?;

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&edge)),
                OutputFormat::Table => println!("Removed related object {} from {}", target, source),
            }
        }
        RelatedCommands::List { node, incoming } => {
            let node = parse_id(node)?;
            let (title, ids) = if *incoming {
                let mut sources: Vec<_> = ctx.service.list_related_by(&node)?.into_iter().collect();
                sources.sort();
                (format!("Objects relating to {}", node), sources)
            } else {
                (format!("Related objects of {}", node), ctx.service.list_related(&node)?)
            };

            tracing::info!("Found {} related objects", ids.len());
            let views = node_views(ctx, ids).await?;
            print_nodes(&title, &views, ctx.format);
        }
    }

    Ok(())
}
