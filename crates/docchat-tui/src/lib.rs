//! Full-screen TUI for DocChat.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{Write, stderr};
use std::path::PathBuf;

use anyhow::Result;
use docchat_core::config::Config;
pub use features::{chat, input, preview, statusline};
pub use runtime::TuiRuntime;

/// Runs the interactive chat client.
///
/// `files` are attached (and uploaded) as soon as the interface starts;
/// `root` is the directory the file picker lists.
///
/// # Errors
/// Returns an error if no terminal is attached or terminal I/O fails.
pub async fn run_interactive_chat(
    config: &Config,
    files: Vec<PathBuf>,
    root: PathBuf,
) -> Result<()> {
    terminal::ensure_interactive()?;

    // Replaced by the alternate screen once the TUI starts.
    let mut err = stderr();
    writeln!(err, "DocChat")?;
    writeln!(err, "Backend: {}", config.backend_url)?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(config.clone(), root, files)?;
    let result = runtime.run();
    drop(runtime);
    result?;

    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
