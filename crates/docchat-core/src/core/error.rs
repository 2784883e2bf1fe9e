//! Errors surfaced by controller transitions.

use thiserror::Error;

/// A file selection that cannot become an attachment set.
///
/// Recovered locally: the selection never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "You can only upload a single PDF at a time. To upload multiple files, please select only images."
    )]
    MixedPdfBatch,
    #[error("Please select only image or PDF files.")]
    NoSupportedFiles,
}

/// Why a question was refused before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuidanceRejection {
    #[error("Please upload document(s) and wait for them to process before asking a question.")]
    EmptyQuestion,
    #[error("Please upload document(s) and wait for them to process before asking a question.")]
    NoSession,
    #[error("Please wait for the current request to finish.")]
    Busy,
}

/// What the controller sees of a failed backend call.
///
/// `detail` is the backend's human-readable reason, when it sent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .detail.as_deref().unwrap_or("request failed"))]
pub struct RequestFailure {
    pub detail: Option<String>,
}

impl RequestFailure {
    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Failure without a usable reason; callers fall back to a generic message.
    pub fn generic() -> Self {
        Self::default()
    }

    /// Renders the bot turn text, using `fallback` when no detail is present.
    pub fn turn_text(&self, fallback: &str) -> String {
        let detail = self
            .detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(fallback);
        format!("Error: {detail}")
    }
}
