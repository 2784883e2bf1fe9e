use std::sync::Arc;

use reqwest::multipart::{Form, Part};

use super::error::{BackendError, BackendResult};
use super::types::{AskBody, AskResponse, HealthResponse, UploadResponse};
use crate::config::Config;
use crate::core::{Attachment, SessionId};

/// Multipart field name repeated once per uploaded file.
pub const UPLOAD_FIELD: &str = "files";

/// Backend client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    upload_url: String,
    ask_url: String,
    health_url: String,
}

impl BackendClient {
    /// Builds a client for the configured backend.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> BackendResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| BackendError::from_reqwest(&e))?;

        Ok(Self {
            http,
            upload_url: config.upload_url(),
            ask_url: config.ask_url(),
            health_url: config.health_url(),
        })
    }

    /// Uploads attachments as one multipart request and returns the session.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read, the request fails, or the
    /// backend replies with a non-2xx status.
    pub async fn upload(&self, attachments: &[Arc<Attachment>]) -> BackendResult<UploadResponse> {
        let mut form = Form::new();
        for attachment in attachments {
            let bytes = tokio::fs::read(attachment.path())
                .await
                .map_err(|source| BackendError::Io {
                    path: attachment.path().display().to_string(),
                    source,
                })?;
            let part = Part::bytes(bytes)
                .file_name(attachment.name().to_string())
                .mime_str(attachment.mime())
                .map_err(|e| BackendError::from_reqwest(&e))?;
            form = form.part(UPLOAD_FIELD, part);
        }

        tracing::info!(files = attachments.len(), url = %self.upload_url, "uploading documents");
        let response = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let parsed: UploadResponse = read_json(response).await?;
        tracing::info!(session = %parsed.session_id, "upload accepted");
        Ok(parsed)
    }

    /// Asks a question against a session.
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend replies with a
    /// non-2xx status (e.g. an unknown session).
    pub async fn ask(&self, session: &SessionId, question: &str) -> BackendResult<AskResponse> {
        let body = AskBody {
            session_id: session.as_str(),
            question,
        };

        tracing::info!(%session, url = %self.ask_url, "asking question");
        let response = self
            .http
            .post(&self.ask_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        read_json(response).await
    }

    /// Checks that the backend is reachable.
    ///
    /// # Errors
    /// Returns an error if the request fails or the backend replies with a
    /// non-2xx status.
    pub async fn health(&self) -> BackendResult<HealthResponse> {
        let response = self
            .http
            .get(&self.health_url)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::from_reqwest(&e))?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "backend returned an error");
        return Err(BackendError::http_status(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}
