use thiserror::Error;

use super::types::ErrorBody;
use crate::core::RequestFailure;

/// Failure of a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-2xx reply, with the backend's `detail` when it sent one.
    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

impl BackendError {
    /// Builds a status error, extracting `{"detail": "..."}` from the body.
    pub fn http_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail_text());
        Self::Status { status, detail }
    }

    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_connect() {
            Self::Transport(format!("Connection failed: {e}"))
        } else {
            Self::Transport(e.to_string())
        }
    }

    /// Reduces the error to what the conversation shows.
    ///
    /// Only backend-supplied details and local file errors carry text; every
    /// other failure falls back to the generic message.
    pub fn to_failure(&self) -> RequestFailure {
        match self {
            Self::Status { detail, .. } => RequestFailure {
                detail: detail.clone(),
            },
            Self::Io { .. } => RequestFailure::with_detail(self.to_string()),
            Self::Timeout(_) | Self::Transport(_) | Self::Decode(_) => RequestFailure::generic(),
        }
    }
}

impl From<BackendError> for RequestFailure {
    fn from(err: BackendError) -> Self {
        err.to_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_extracts_string_detail() {
        let err = BackendError::http_status(404, r#"{"detail":"Session not found. Please upload the document again."}"#);
        assert!(matches!(
            &err,
            BackendError::Status { status: 404, detail: Some(d) } if d.starts_with("Session not found")
        ));
        assert_eq!(
            err.to_string(),
            "HTTP 404: Session not found. Please upload the document again."
        );
    }

    #[test]
    fn test_http_status_ignores_non_string_detail() {
        let err = BackendError::http_status(
            422,
            r#"{"detail":[{"loc":["body","question"],"msg":"field required"}]}"#,
        );
        assert!(matches!(err, BackendError::Status { status: 422, detail: None }));
        assert_eq!(err.to_string(), "HTTP 422");
    }

    #[test]
    fn test_http_status_tolerates_non_json() {
        let err = BackendError::http_status(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, BackendError::Status { status: 502, detail: None }));
    }

    #[test]
    fn test_failure_only_keeps_backend_detail() {
        let status = BackendError::Status {
            status: 500,
            detail: Some("parse error".to_string()),
        };
        assert_eq!(status.to_failure(), RequestFailure::with_detail("parse error"));

        let transport = BackendError::Transport("connection refused".to_string());
        assert_eq!(transport.to_failure(), RequestFailure::generic());

        let decode = BackendError::Decode("missing field `answer`".to_string());
        assert_eq!(RequestFailure::from(decode), RequestFailure::generic());
    }
}
