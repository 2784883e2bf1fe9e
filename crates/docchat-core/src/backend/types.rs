//! Wire types exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::core::SessionId;

/// Successful upload: the session built from the uploaded documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AskBody<'a> {
    pub session_id: &'a str,
    pub question: &'a str,
}

/// Successful ask.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Reply of the backend root endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body of a non-2xx reply. Only string details are surfaced.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        self.detail
            .as_str()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}
