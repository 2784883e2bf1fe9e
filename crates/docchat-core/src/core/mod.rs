//! Attachment & session state machine.
//!
//! Everything here is synchronous and side-effect free apart from the preview
//! ledger bookkeeping. Network calls are described by request values and their
//! outcomes are fed back through the `*_resolved` transitions.

pub mod attachment;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod preview;
pub mod session;

pub use attachment::{Attachment, AttachmentSet, ContentKind, Generation};
pub use controller::{Controller, Resolution};
pub use conversation::{Conversation, Sender, Turn};
pub use error::{GuidanceRejection, RequestFailure, ValidationError};
pub use preview::{PreviewHandle, PreviewId, PreviewLedger, PreviewNavigator};
pub use session::{Activity, AskRequest, AskTicket, SessionId, UploadRequest, UploadTicket};
