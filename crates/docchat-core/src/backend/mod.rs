//! HTTP client for the DocChat backend.
//!
//! Two calls matter to the controller: a multipart upload that returns a
//! session id, and a JSON ask against that session.

mod client;
mod error;
pub mod types;

pub use client::{BackendClient, UPLOAD_FIELD};
pub use error::{BackendError, BackendResult};
pub use types::{AskResponse, HealthResponse, UploadResponse};
