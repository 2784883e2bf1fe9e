//! Shared helpers used across features, overlays and the runtime.

mod task;
pub mod text;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskMeta, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{truncate_start_with_ellipsis, truncate_with_ellipsis};
