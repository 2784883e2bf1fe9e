//! Preview cursor and scoped preview handles.
//!
//! A [`PreviewHandle`] stands for the displayable resource derived from the
//! current attachment (in the terminal UI: a decoded image placement). The
//! navigator owns at most one. Dropping a handle reports its id to the shared
//! [`PreviewLedger`], so whoever renders previews can free the matching
//! resource exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::attachment::{Attachment, AttachmentSet, Generation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl PreviewId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct LedgerInner {
    next_id: AtomicU64,
    outstanding: AtomicUsize,
    released: Mutex<Vec<PreviewId>>,
}

/// Shared record of acquired and released preview handles.
#[derive(Debug, Clone, Default)]
pub struct PreviewLedger {
    inner: Arc<LedgerInner>,
}

impl PreviewLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self, index: usize, attachment: Arc<Attachment>, generation: Generation) -> PreviewHandle {
        let id = PreviewId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(%id, index, %generation, "preview acquired");
        PreviewHandle {
            id,
            index,
            generation,
            attachment,
            ledger: self.clone(),
        }
    }

    fn release(&self, id: PreviewId) {
        self.inner.outstanding.fetch_sub(1, Ordering::AcqRel);
        self.inner
            .released
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
        tracing::trace!(%id, "preview released");
    }

    /// Number of handles currently alive.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Takes the ids released since the last call, oldest first.
    pub fn drain_released(&self) -> Vec<PreviewId> {
        std::mem::take(
            &mut *self
                .inner
                .released
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

/// Exclusive handle to the preview of one attachment.
///
/// Released exactly once, on drop.
pub struct PreviewHandle {
    id: PreviewId,
    index: usize,
    generation: Generation,
    attachment: Arc<Attachment>,
    ledger: PreviewLedger,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }

    /// Index of the previewed attachment within its set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn attachment(&self) -> &Arc<Attachment> {
        &self.attachment
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .field("attachment", &self.attachment.name())
            .finish_non_exhaustive()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.ledger.release(self.id);
    }
}

/// Cursor over the current attachment set plus the zoom flag.
#[derive(Debug, Default)]
pub struct PreviewNavigator {
    cursor: usize,
    zoomed: bool,
    handle: Option<PreviewHandle>,
    ledger: PreviewLedger,
}

impl PreviewNavigator {
    pub fn new(ledger: PreviewLedger) -> Self {
        Self {
            cursor: 0,
            zoomed: false,
            handle: None,
            ledger,
        }
    }

    pub fn ledger(&self) -> &PreviewLedger {
        &self.ledger
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn current(&self) -> Option<&PreviewHandle> {
        self.handle.as_ref()
    }

    /// Points at the first attachment of a freshly accepted set.
    pub fn reset(&mut self, set: &AttachmentSet) {
        self.cursor = 0;
        self.zoomed = false;
        self.refresh(set);
    }

    /// Advances by one, wrapping from last to first.
    pub fn next(&mut self, set: &AttachmentSet) {
        let len = set.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % len;
        self.refresh(set);
    }

    /// Steps back by one, wrapping from first to last.
    pub fn previous(&mut self, set: &AttachmentSet) {
        let len = set.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + len - 1) % len;
        self.refresh(set);
    }

    /// Sets the zoom flag if the current attachment is an image.
    pub fn zoom(&mut self) -> bool {
        let is_image = self
            .handle
            .as_ref()
            .is_some_and(|h| h.attachment.is_image());
        if is_image {
            self.zoomed = true;
        }
        is_image
    }

    pub fn unzoom(&mut self) {
        self.zoomed = false;
    }

    /// Releases the current handle before acquiring the next one so at most
    /// one is ever outstanding.
    fn refresh(&mut self, set: &AttachmentSet) {
        self.handle = None;
        self.handle = set
            .get(self.cursor)
            .map(|a| self.ledger.acquire(self.cursor, Arc::clone(a), set.generation()));
    }
}
