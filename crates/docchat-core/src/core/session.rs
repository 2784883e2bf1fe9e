//! Session identity, in-flight activity and request tickets.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::attachment::{Attachment, Generation};

/// Opaque backend-issued session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the controller is waiting on. Anything but `Idle` means loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    Uploading {
        generation: Generation,
    },
    Asking {
        generation: Generation,
        session: SessionId,
    },
}

impl Activity {
    pub fn is_loading(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Identifies the attachment set an upload was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    pub generation: Generation,
}

/// Identifies the set and session a question was asked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskTicket {
    pub generation: Generation,
    pub session: SessionId,
}

/// Upload the caller must perform, then report via `upload_resolved`.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub ticket: UploadTicket,
    pub attachments: Vec<Arc<Attachment>>,
}

/// Question the caller must send, then report via `ask_resolved`.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub ticket: AskTicket,
    pub question: String,
}
