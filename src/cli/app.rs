//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::task;
use crate::domain::{FilterMode, TaskId};
use crate::manager::TaskStateManager;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(author, version, about = "A single-user task list that remembers its state")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the stored task list
    #[arg(long, global = true, env = "TASKLIST_STORE")]
    pub store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true, env = "TASKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a task done, or open again
    Toggle {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task
    #[command(alias = "remove")]
    Rm {
        /// Task ID
        id: TaskId,
    },

    /// Change the text of a task
    Edit {
        /// Task ID
        id: TaskId,

        /// New text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Which tasks to show (defaults to the configured filter)
        #[arg(long, value_enum)]
        filter: Option<FilterMode>,
    },

    /// Show completion statistics
    Stats,
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);
    init_logging(output.is_verbose());

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let backend = config.file_store(cli.store.as_deref())?;
    output.verbose_ctx(
        "store",
        &format!(
            "Using {} (key '{}')",
            backend.path_for(&config.storage_key).display(),
            config.storage_key
        ),
    );

    let mut manager = TaskStateManager::open(backend, config.storage_key.clone());
    if let Some(warning) = manager.load_warning() {
        output.warning(&warning.to_string());
    }

    match cli.command {
        Commands::Add { text } => task::add(&mut manager, &output, &text.join(" "))?,
        Commands::Toggle { id } => task::toggle(&mut manager, &output, id)?,
        Commands::Rm { id } => task::remove(&mut manager, &output, id)?,
        Commands::Edit { id, text } => task::edit(&mut manager, &output, id, &text.join(" "))?,
        Commands::List { filter } => {
            task::list(&manager, &output, filter.unwrap_or(config.default_filter))?
        }
        Commands::Stats => task::stats(&manager, &output)?,
    }

    Ok(())
}
