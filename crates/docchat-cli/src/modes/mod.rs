//! Runtime execution modes.
//!
//! - `exec`: Non-interactive upload/ask mode (stdout/stderr)
//! - `tui`: Full-screen interactive terminal UI (optional feature)

pub mod exec;

#[cfg(feature = "tui")]
pub use docchat_tui::run_interactive_chat;

#[cfg(not(feature = "tui"))]
pub async fn run_interactive_chat(
    _config: &docchat_core::config::Config,
    _files: Vec<std::path::PathBuf>,
    _root: std::path::PathBuf,
) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
