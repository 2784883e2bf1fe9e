//! Chat command handler.

use std::path::PathBuf;

use anyhow::{Context, Result};
use docchat_core::config::Config;
use docchat_core::logging;

use crate::modes;

pub async fn run(config: &Config, files: Vec<PathBuf>, root: PathBuf) -> Result<()> {
    // The interface owns the terminal, so logs go to a file.
    let _guard = logging::init_file(config)?;

    modes::run_interactive_chat(config, files, root)
        .await
        .context("interactive chat failed")?;

    Ok(())
}
