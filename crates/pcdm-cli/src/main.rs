//! PCDM CLI - Command line interface for the aggregation core

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, member, node, related};
use config::Config;
use output::OutputFormat;
use pcdm_core::{AggregationService, DeletionNotifier};
use pcdm_storage::{NodeRepository, RedbStore};

#[derive(Parser)]
#[command(name = "pcdm")]
#[command(author, version, about = "Collections, objects and files with membership and related-object links")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "PCDM_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Config file
    #[arg(long, global = true, env = "PCDM_CONFIG")]
    pub config: Option<String>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(config::default_config_path)
    }

    /// Get the data directory path
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| config.data_dir.clone())
            .unwrap_or_else(config::default_data_dir)
    }

    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.format
            .as_deref()
            .or(config.format.as_deref())
            .map(OutputFormat::from)
            .unwrap_or(OutputFormat::Table)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage nodes
    Node(node::NodeArgs),
    /// Manage membership (containment)
    Member(member::MemberArgs),
    /// Manage related objects
    Related(related::RelatedArgs),
    /// Manage CLI configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend and aggregation service
pub struct AppContext {
    pub storage: Arc<RedbStore>,
    pub service: Arc<AggregationService>,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load(&cli.config_path());
        let data_dir = cli.data_dir(&config);
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("pcdm.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = Arc::new(RedbStore::open(&db_path)?);
        let service = Arc::new(AggregationService::with_config(storage.clone(), config.graph));
        let notifier: Weak<dyn DeletionNotifier> = Arc::downgrade(&service) as Weak<dyn DeletionNotifier>;
        storage.subscribe(notifier)?;

        let snapshot = storage.load_snapshot().await?;
        tracing::debug!(
            "Loaded {} membership and {} relation edges",
            snapshot.members.len(),
            snapshot.related.len()
        );
        service.restore(snapshot)?;

        Ok(Self {
            storage,
            service,
            format: cli.output_format(&config),
        })
    }

    /// Write the current edges back to storage
    pub async fn persist(&self) -> anyhow::Result<()> {
        let snapshot = self.service.snapshot()?;
        self.storage.save_snapshot(&snapshot).await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting pcdm CLI");

    // Storage is only opened by commands that touch the graph
    match &cli.command {
        Commands::Node(args) => node::run(args, &AppContext::new(&cli).await?).await?,
        Commands::Member(args) => member::run(args, &AppContext::new(&cli).await?).await?,
        Commands::Related(args) => related::run(args, &AppContext::new(&cli).await?).await?,
        Commands::Config(args) => config_cmd::run(args, &cli.config_path())?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
