//! Membership commands

use clap::{Args, Subcommand};

use super::{node_views, parse_id};
use crate::output::{print_nodes, to_json, OutputFormat};
use crate::AppContext;
use pcdm_core::Kind;

#[derive(Args)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommands,
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to a collection or object
    Add {
        /// Parent collection or object
        parent: String,
        /// Child object or file
        child: String,
    },
    /// Remove a member
    Remove {
        /// Parent collection or object
        parent: String,
        /// Child object or file
        child: String,
    },
    /// List members in insertion order
    List {
        /// Parent collection or object
        parent: String,
        /// Only members of this kind: object, file
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// List the parents of a member
    Parents {
        /// Child object or file
        child: String,
    },
}

pub async fn run(args: &MemberArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running member command");

    match &args.command {
        MemberCommands::Add { parent, child } => {
            let (parent, child) = (parse_id(parent)?, parse_id(child)?);
            let edge = ctx.service.add_member(&parent, &child).await?;
            ctx.persist().await?;

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&edge)),
                OutputFormat::Table => {
                    println!("Added {} to {} at position {}", child, parent, edge.position)
                }
            }
        }
        MemberCommands::Remove { parent, child } => {
            let (parent, child) = (parse_id(parent)?, parse_id(child)?);
            let edge = ctx.service.remove_member(&parent, &child).await?;
            ctx.persist().await?;

            match ctx.format {
                OutputFormat::Json => println!("{}", to_json(&edge)),
                OutputFormat::Table => println!("Removed {} from {}", child, parent),
            }
        }
        MemberCommands::List { parent, kind } => {
            let parent = parse_id(parent)?;
            let members = match kind.as_deref().map(str::parse::<Kind>).transpose() {
                Ok(None) => ctx.service.list_members(&parent)?,
                Ok(Some(Kind::Object)) => ctx.service.list_member_objects(&parent)?,
                Ok(Some(Kind::File)) => ctx.service.list_member_files(&parent)?,
                Ok(Some(other)) => anyhow::bail!("Members are objects or files, not {}", other),
                Err(e) => anyhow::bail!(e),
            };

            tracing::info!("Found {} members of {}", members.len(), parent);
            let views = node_views(ctx, members).await?;
            print_nodes(&format!("Members of {}", parent), &views, ctx.format);
        }
        MemberCommands::Parents { child } => {
            let child = parse_id(child)?;
            let mut parents: Vec<_> = ctx.service.list_parents(&child)?.into_iter().collect();
            parents.sort();

            let views = node_views(ctx, parents).await?;
            print_nodes(&format!("Parents of {}", child), &views, ctx.format);
        }
    }

    Ok(())
}
