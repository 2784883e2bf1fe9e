//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use docchat_core::config;
use docchat_core::files::normalize_input_path;

mod commands;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(version)]
#[command(about = "Ask questions about PDFs and images")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Documents to attach when the chat starts
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Directory listed by the file picker (default: current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Override the backend URL from config
    #[arg(long, global = true, env = "DOCCHAT_BACKEND_URL", value_name = "URL")]
    backend_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Uploads documents and asks questions without the interface
    Ask {
        /// Document to attach (repeat for several images)
        #[arg(short, long = "file", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Questions, asked in order
        #[arg(value_name = "QUESTION", required = true)]
        questions: Vec<String>,
    },

    /// Uploads documents and prints the session id
    Upload {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Checks that the backend is reachable
    Ping,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config rendered from the built-in defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;

    let Cli {
        command,
        files,
        root,
        backend_url,
    } = cli;

    if let Some(url) = backend_url {
        config.backend_url = url;
    }

    // default to chat mode
    let Some(command) = command else {
        return commands::chat::run(&config, normalize_paths(&files), root).await;
    };

    match command {
        Commands::Ask { files, questions } => {
            commands::exec::ask(&config, &normalize_paths(&files), &questions).await
        }
        Commands::Upload { files } => {
            commands::exec::upload(&config, &normalize_paths(&files)).await
        }
        Commands::Ping => commands::ping::run(&config).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

/// Undoes drag-and-drop quoting and expands `~/` in user-supplied paths.
fn normalize_paths(files: &[PathBuf]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|path| normalize_input_path(&path.to_string_lossy()))
        .collect()
}
