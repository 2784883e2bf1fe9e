//! Non-interactive mode.
//!
//! Drives the same controller as the interface: select, upload, then ask
//! questions one at a time. Answers go to stdout; failures become errors
//! carrying the text the chat would have shown.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use docchat_core::backend::BackendClient;
use docchat_core::config::Config;
use docchat_core::core::controller::{ASK_FAILED_FALLBACK, UPLOAD_FAILED_FALLBACK};
use docchat_core::core::{Controller, RequestFailure, SessionId};
use docchat_core::files::RawFile;

pub struct ExecSession {
    client: BackendClient,
    controller: Controller,
}

impl ExecSession {
    pub fn new(config: &Config) -> Result<Self> {
        let client = BackendClient::new(config).context("create backend client")?;
        Ok(Self {
            client,
            controller: Controller::new(),
        })
    }

    /// Attaches `paths` and uploads them, returning the bound session.
    pub async fn upload(&mut self, paths: &[PathBuf]) -> Result<SessionId> {
        let raw = read_files(paths)?;
        let request = self.controller.select_files(raw)?;

        let result = self
            .client
            .upload(&request.attachments)
            .await
            .map_err(RequestFailure::from);
        let failure = result
            .as_ref()
            .err()
            .map(|f| f.turn_text(UPLOAD_FAILED_FALLBACK));
        self.controller.upload_resolved(request.ticket, result);

        if let Some(message) = failure {
            return Err(anyhow!(message));
        }
        let session = self
            .controller
            .session()
            .cloned()
            .context("backend did not bind a session")?;
        tracing::info!(%session, files = paths.len(), "documents uploaded");
        if let Some(turn) = self.controller.conversation().last() {
            eprintln!("{}", turn.text);
        }
        Ok(session)
    }

    /// Asks `question` against the bound session and returns the answer.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let request = self.controller.ask(question)?;

        let result = self
            .client
            .ask(&request.ticket.session, &request.question)
            .await
            .map_err(RequestFailure::from);
        let failure = result
            .as_ref()
            .err()
            .map(|f| f.turn_text(ASK_FAILED_FALLBACK));
        self.controller.ask_resolved(request.ticket, result);

        if let Some(message) = failure {
            return Err(anyhow!(message));
        }
        self.controller
            .conversation()
            .last()
            .map(|turn| turn.text.clone())
            .context("no answer recorded")
    }
}

fn read_files(paths: &[PathBuf]) -> Result<Vec<RawFile>> {
    paths
        .iter()
        .map(|path| {
            RawFile::from_path(path).with_context(|| format!("Cannot read {}", path.display()))
        })
        .collect()
}
