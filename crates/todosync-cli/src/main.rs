//! todosync CLI
//!
//! Command-line interface for a todo list kept in sync with a REST server.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use todosync_core::views::StatusFilter;
use todosync_core::{Config, TodoId};

mod commands;
mod output;

use commands::todo::{EditFields, ListQuery};
use commands::Session;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "todosync")]
#[command(about = "todosync - A todo list kept in sync with a REST server")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the server base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List todos
    #[command(alias = "ls")]
    List {
        /// Only show this category id ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Todos per page (defaults to page_size from the config)
        #[arg(long)]
        page_size: Option<usize>,
        /// Show todos in server order instead of newest first
        #[arg(long)]
        oldest_first: bool,
    },
    /// Add a todo
    #[command(alias = "create")]
    Add {
        /// What needs doing
        text: String,
        /// Category id
        #[arg(short, long)]
        category: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Edit a todo
    Edit {
        /// Todo ID
        id: TodoId,
        /// New text
        #[arg(short, long)]
        text: Option<String>,
        /// New category id
        #[arg(short, long)]
        category: Option<String>,
        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },
    /// Mark a todo completed
    Done {
        /// Todo ID
        id: TodoId,
    },
    /// Mark a todo active again
    Undo {
        /// Todo ID
        id: TodoId,
    },
    /// Flip a todo between active and completed
    Toggle {
        /// Todo ID
        id: TodoId,
    },
    /// Delete a todo
    #[command(name = "rm", alias = "delete")]
    Remove {
        /// Todo ID
        id: TodoId,
    },
    /// Show completion counts
    Stats,
    /// List categories
    Categories,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (base_url, page_size, write_policy, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't talk to the server
    if let Commands::Config { command } = &cli.command {
        handle_config_command(command.clone(), cli.config.as_ref(), &output)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    init_logging(&config);

    let session = Session::new(config)?;
    if needs_todos(&cli.command) {
        session.load().await;

        // Writes still run when the list could not be loaded
        if let Some(message) = session.store().error() {
            if !matches!(cli.command, Commands::List { .. } | Commands::Stats) {
                output.warn(&format!("Could not load todos: {}", message));
            }
        }
    }

    match cli.command {
        Commands::List {
            category,
            status,
            page,
            page_size,
            oldest_first,
        } => {
            let query = ListQuery {
                category,
                status,
                page,
                page_size,
                oldest_first,
            };
            commands::todo::list(&session, query, &output).await
        }
        Commands::Add {
            text,
            category,
            description,
        } => commands::todo::add(&session, text, category, description, &output).await,
        Commands::Edit {
            id,
            text,
            category,
            description,
            clear_description,
        } => {
            let fields = EditFields {
                text,
                category,
                description,
                clear_description,
            };
            commands::todo::edit(&session, id, fields, &output).await
        }
        Commands::Done { id } => commands::todo::set_completed(&session, id, true, &output).await,
        Commands::Undo { id } => commands::todo::set_completed(&session, id, false, &output).await,
        Commands::Toggle { id } => commands::todo::toggle(&session, id, &output).await,
        Commands::Remove { id } => commands::todo::remove(&session, id, &output).await,
        Commands::Stats => commands::stats::show(&session, &output),
        Commands::Categories => commands::category::list(&session, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Whether a command reads or writes todos and so needs the initial fetch
fn needs_todos(command: &Commands) -> bool {
    !matches!(command, Commands::Categories | Commands::Config { .. })
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Only initializes if TODOSYNC_LOG is set. Logs go to config.log_file,
/// or stderr when no log file is configured.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("TODOSYNC_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("todosync_core={},todosync={}", log_level, log_level));

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
