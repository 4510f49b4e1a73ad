//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod counts;
pub mod import;
pub mod last;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use remark_core::admin::StaticAdminStore;
use remark_core::config::Config;
use remark_core::service::DataStore;
use remark_storage::FileSystemEngine;
use std::path::PathBuf;
use std::sync::Arc;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "remark.toml";

/// remark - comment store maintenance
#[derive(Debug, Parser)]
#[command(name = "remark")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding site data files (overrides [storage] path)
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import comments from a Disqus XML export
    Import(import::ImportArgs),

    /// Show the most recent comments of a site
    Last(last::LastArgs),

    /// Show comment counts for posts
    Counts(counts::CountsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Options shared by all commands
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub config_path: PathBuf,
    pub storage_dir: Option<PathBuf>,
}

impl GlobalOpts {
    /// Load the configuration, defaults when the file does not exist
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))
    }

    /// Open the file system engine, `--storage-dir` first, then `[storage] path`
    pub fn open_engine(&self, config: &Config) -> Result<FileSystemEngine> {
        let dir = self
            .storage_dir
            .clone()
            .or_else(|| config.storage.path.clone());
        let engine = match dir {
            Some(dir) => FileSystemEngine::new(&dir)
                .with_context(|| format!("Failed to open storage at {}", dir.display()))?,
            None => FileSystemEngine::default_location()
                .context("Failed to open default storage location")?,
        };
        tracing::debug!("Using storage directory {:?}", engine.base_dir());
        Ok(engine)
    }

    /// Build the comment service on top of the file system engine
    pub fn data_store(&self, config: &Config) -> Result<Arc<DataStore>> {
        let engine = self.open_engine(config)?;
        let admin = StaticAdminStore::from_config(&config.admin);
        Ok(Arc::new(DataStore::with_config(
            Arc::new(engine),
            Arc::new(admin),
            &config.service,
        )))
    }
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let opts = GlobalOpts {
        config_path: cli
            .config
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        storage_dir: cli.storage_dir,
    };

    // Dispatch to command handler
    match cli.command {
        Commands::Import(args) => import::execute(args, &opts),
        Commands::Last(args) => last::execute(args, &opts),
        Commands::Counts(args) => counts::execute(args, &opts),
        Commands::Config(cmd) => config::execute(cmd, &opts),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
