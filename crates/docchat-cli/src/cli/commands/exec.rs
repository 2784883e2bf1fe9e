//! Non-interactive `ask` and `upload` handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use docchat_core::config::Config;
use docchat_core::logging;

use crate::modes;

pub async fn ask(config: &Config, files: &[PathBuf], questions: &[String]) -> Result<()> {
    logging::init_stderr(config);

    let mut session = modes::exec::ExecSession::new(config)?;
    session.upload(files).await.context("upload documents")?;

    for question in questions {
        let answer = session.ask(question).await?;
        println!("{answer}");
    }

    Ok(())
}

pub async fn upload(config: &Config, files: &[PathBuf]) -> Result<()> {
    logging::init_stderr(config);

    let mut session = modes::exec::ExecSession::new(config)?;
    let id = session.upload(files).await.context("upload documents")?;
    println!("{id}");

    Ok(())
}
