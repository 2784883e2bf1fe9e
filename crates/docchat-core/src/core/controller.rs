//! The attachment & session controller.
//!
//! One transition per event: selection, upload resolved, question submitted,
//! answer resolved, cursor move. Network work is handed to the caller as
//! [`UploadRequest`]/[`AskRequest`] values; their outcomes come back with the
//! ticket they were issued with, so results that belong to a superseded set
//! or session can be dropped.

use super::attachment::{AttachmentSet, Generation, validate_selection};
use super::conversation::Conversation;
use super::error::{GuidanceRejection, RequestFailure, ValidationError};
use super::preview::{PreviewHandle, PreviewLedger, PreviewNavigator};
use super::session::{Activity, AskRequest, AskTicket, SessionId, UploadRequest, UploadTicket};
use crate::backend::{AskResponse, UploadResponse};
use crate::files::RawFile;

pub const UPLOAD_FAILED_FALLBACK: &str = "Failed to process documents.";
pub const ASK_FAILED_FALLBACK: &str = "Failed to get an answer.";

/// Bot turn appended after a successful upload.
pub fn processed_message(count: usize) -> String {
    format!("Processed {count} document(s). You can now ask questions.")
}

/// Outcome of feeding a network result back into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The result belonged to a superseded set or session; nothing changed.
    Discarded,
}

#[derive(Debug, Default)]
pub struct Controller {
    attachments: AttachmentSet,
    generation: Generation,
    session: Option<SessionId>,
    activity: Activity,
    conversation: Conversation,
    preview: PreviewNavigator,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a controller whose preview handles report to `ledger`.
    pub fn with_ledger(ledger: PreviewLedger) -> Self {
        Self {
            preview: PreviewNavigator::new(ledger),
            ..Self::default()
        }
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn is_loading(&self) -> bool {
        self.activity.is_loading()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.activity, Activity::Uploading { .. })
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn preview(&self) -> &PreviewNavigator {
        &self.preview
    }

    pub fn preview_ledger(&self) -> &PreviewLedger {
        self.preview.ledger()
    }

    /// Whether a question could be submitted right now (ignoring its text).
    pub fn can_ask(&self) -> bool {
        self.session.is_some() && !self.is_loading()
    }

    /// Validates a selection and, on success, replaces the attachment set.
    ///
    /// The replacement is all-or-nothing: new set, cursor at 0, empty
    /// conversation, no session, uploading. Any upload or ask still in
    /// flight is superseded.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] and leaves every piece of state untouched
    /// when the selection is not acceptable.
    pub fn select_files(&mut self, raw: Vec<RawFile>) -> Result<UploadRequest, ValidationError> {
        let accepted = validate_selection(raw).inspect_err(|err| {
            tracing::debug!(?err, "selection rejected");
        })?;

        let generation = self.generation.next();
        self.generation = generation;
        self.attachments = AttachmentSet::from_validated(accepted, generation);
        self.conversation.clear();
        self.session = None;
        self.activity = Activity::Uploading { generation };
        self.preview.reset(&self.attachments);

        tracing::info!(%generation, files = self.attachments.len(), "attachment set replaced");
        Ok(self.upload_request())
    }

    fn upload_request(&self) -> UploadRequest {
        debug_assert!(
            !self.attachments.is_empty() && self.attachments.is_conforming(),
            "upload requires a non-empty single-PDF or all-image set"
        );
        UploadRequest {
            ticket: UploadTicket {
                generation: self.attachments.generation(),
            },
            attachments: self.attachments.as_slice().to_vec(),
        }
    }

    /// Applies the result of an upload, unless a newer selection superseded it.
    pub fn upload_resolved(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadResponse, RequestFailure>,
    ) -> Resolution {
        let current = Activity::Uploading {
            generation: self.generation,
        };
        if ticket.generation != self.generation || self.activity != current {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.generation,
                "discarding superseded upload result"
            );
            return Resolution::Discarded;
        }

        self.activity = Activity::Idle;
        match result {
            Ok(response) => {
                tracing::info!(session = %response.session_id, "session bound");
                self.session = Some(response.session_id);
                self.conversation
                    .push_bot(processed_message(self.attachments.len()));
            }
            Err(failure) => {
                tracing::warn!(detail = ?failure.detail, "upload failed");
                self.conversation
                    .push_bot(failure.turn_text(UPLOAD_FAILED_FALLBACK));
            }
        }
        Resolution::Applied
    }

    /// Submits a question against the bound session.
    ///
    /// The user turn is appended immediately; the question is sent as typed.
    ///
    /// # Errors
    /// Returns a [`GuidanceRejection`], with no turn appended, when the
    /// question is blank, no session is bound, or a request is in flight.
    pub fn ask(&mut self, question: &str) -> Result<AskRequest, GuidanceRejection> {
        if question.trim().is_empty() {
            return Err(GuidanceRejection::EmptyQuestion);
        }
        let Some(session) = self.session.clone() else {
            return Err(GuidanceRejection::NoSession);
        };
        if self.is_loading() {
            return Err(GuidanceRejection::Busy);
        }

        self.conversation.push_user(question);
        self.activity = Activity::Asking {
            generation: self.generation,
            session: session.clone(),
        };

        Ok(AskRequest {
            ticket: AskTicket {
                generation: self.generation,
                session,
            },
            question: question.to_string(),
        })
    }

    /// Applies an answer, unless its session is no longer the bound one.
    ///
    /// A failed question leaves the session bound.
    pub fn ask_resolved(
        &mut self,
        ticket: AskTicket,
        result: Result<AskResponse, RequestFailure>,
    ) -> Resolution {
        let current = Activity::Asking {
            generation: self.generation,
            session: ticket.session.clone(),
        };
        let same_session = self.session.as_ref() == Some(&ticket.session);
        if ticket.generation != self.generation || !same_session || self.activity != current {
            tracing::debug!(
                stale = %ticket.generation,
                current = %self.generation,
                "discarding superseded answer"
            );
            return Resolution::Discarded;
        }

        self.activity = Activity::Idle;
        match result {
            Ok(response) => self.conversation.push_bot(response.answer),
            Err(failure) => {
                tracing::warn!(detail = ?failure.detail, "ask failed");
                self.conversation
                    .push_bot(failure.turn_text(ASK_FAILED_FALLBACK));
            }
        }
        Resolution::Applied
    }

    pub fn next_preview(&mut self) {
        self.preview.next(&self.attachments);
    }

    pub fn previous_preview(&mut self) {
        self.preview.previous(&self.attachments);
    }

    /// Zooms the current preview. Returns `false` for non-image attachments.
    pub fn zoom(&mut self) -> bool {
        self.preview.zoom()
    }

    pub fn unzoom(&mut self) {
        self.preview.unzoom();
    }

    pub fn current_preview(&self) -> Option<&PreviewHandle> {
        self.preview.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{Sender, Turn};

    fn image(name: &str) -> RawFile {
        RawFile::new(name, "image/png", 1)
    }

    fn pdf(name: &str) -> RawFile {
        RawFile::new(name, "application/pdf", 1)
    }

    fn text(name: &str) -> RawFile {
        RawFile::new(name, "text/plain", 1)
    }

    fn uploaded(session: &str) -> Result<UploadResponse, RequestFailure> {
        Ok(UploadResponse {
            session_id: SessionId::new(session),
            detail: None,
        })
    }

    fn answered(answer: &str) -> Result<AskResponse, RequestFailure> {
        Ok(AskResponse {
            answer: answer.to_string(),
        })
    }

    fn bot(text: &str) -> Turn {
        Turn {
            sender: Sender::Bot,
            text: text.to_string(),
        }
    }

    fn user(text: &str) -> Turn {
        Turn {
            sender: Sender::User,
            text: text.to_string(),
        }
    }

    /// Controller with a bound session "s0" and one turn in the log.
    fn ready() -> Controller {
        let mut c = Controller::new();
        let req = c.select_files(vec![image("a.png"), image("b.png")]).unwrap();
        assert_eq!(c.upload_resolved(req.ticket, uploaded("s0")), Resolution::Applied);
        c
    }

    #[test]
    fn test_mixed_pdf_batch_changes_nothing() {
        let mut c = ready();
        c.next_preview();
        let before_turns = c.conversation().turns().to_vec();
        let before_gen = c.generation();

        for batch in [
            vec![pdf("a.pdf"), image("b.png")],
            vec![image("b.png"), pdf("a.pdf")],
            vec![pdf("a.pdf"), pdf("b.pdf")],
            vec![pdf("a.pdf"), text("c.txt")],
        ] {
            assert_eq!(c.select_files(batch).unwrap_err(), ValidationError::MixedPdfBatch);
        }

        assert_eq!(c.session(), Some(&SessionId::new("s0")));
        assert_eq!(c.conversation().turns(), before_turns.as_slice());
        assert_eq!(c.generation(), before_gen);
        assert_eq!(c.attachments().len(), 2);
        assert_eq!(c.preview().cursor(), 1);
        assert!(!c.is_loading());
    }

    #[test]
    fn test_no_supported_files_changes_nothing() {
        let mut c = ready();
        assert_eq!(
            c.select_files(vec![text("a.txt"), text("b.txt")]).unwrap_err(),
            ValidationError::NoSupportedFiles
        );
        assert_eq!(c.session(), Some(&SessionId::new("s0")));
        assert_eq!(c.conversation().len(), 1);
    }

    #[test]
    fn test_single_pdf_accepted() {
        let mut c = Controller::new();
        let req = c.select_files(vec![pdf("report.pdf")]).unwrap();
        assert_eq!(c.attachments().len(), 1);
        assert_eq!(req.attachments.len(), 1);
        assert_eq!(req.attachments[0].name(), "report.pdf");
    }

    #[test]
    fn test_images_filtered_order_preserved() {
        let mut c = Controller::new();
        let req = c
            .select_files(vec![image("z.png"), text("notes.txt"), image("a.png")])
            .unwrap();
        let names: Vec<_> = c.attachments().iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["z.png", "a.png"]);
        assert_eq!(req.attachments.len(), 2);
    }

    #[test]
    fn test_selection_resets_cursor_conversation_and_session() {
        let mut c = ready();
        c.next_preview();
        c.ask("first?").unwrap();

        c.select_files(vec![image("x.png"), image("y.png"), image("z.png")])
            .unwrap();

        assert_eq!(c.preview().cursor(), 0);
        assert!(c.conversation().is_empty());
        assert_eq!(c.session(), None);
        assert!(c.is_uploading());
        assert_eq!(c.current_preview().unwrap().attachment().name(), "x.png");
    }

    #[test]
    fn test_ask_rejections_append_nothing() {
        let mut fresh = Controller::new();
        assert_eq!(fresh.ask("hello").unwrap_err(), GuidanceRejection::NoSession);
        assert!(fresh.conversation().is_empty());

        let mut c = ready();
        for blank in ["", "   ", "\n\t"] {
            assert_eq!(c.ask(blank).unwrap_err(), GuidanceRejection::EmptyQuestion);
        }
        assert_eq!(c.conversation().len(), 1);

        c.ask("first?").unwrap();
        let turns = c.conversation().len();
        assert_eq!(c.ask("second?").unwrap_err(), GuidanceRejection::Busy);
        assert_eq!(c.conversation().len(), turns);

        let mut uploading = Controller::new();
        uploading.select_files(vec![image("a.png")]).unwrap();
        assert_eq!(uploading.ask("hi").unwrap_err(), GuidanceRejection::NoSession);
        assert!(uploading.conversation().is_empty());
    }

    #[test]
    fn test_superseded_upload_is_discarded() {
        let mut c = Controller::new();
        let a = c.select_files(vec![image("a.png")]).unwrap();
        let b = c.select_files(vec![image("b.png"), image("c.png")]).unwrap();

        assert_eq!(c.upload_resolved(a.ticket, uploaded("sa")), Resolution::Discarded);
        assert_eq!(c.session(), None);
        assert!(c.conversation().is_empty());
        assert!(c.is_loading());

        assert_eq!(c.upload_resolved(b.ticket, uploaded("sb")), Resolution::Applied);
        assert_eq!(c.session(), Some(&SessionId::new("sb")));

        assert_eq!(
            c.upload_resolved(a.ticket, Err(RequestFailure::with_detail("late"))),
            Resolution::Discarded
        );
        assert_eq!(c.session(), Some(&SessionId::new("sb")));
        assert_eq!(c.conversation().turns(), &[bot(&processed_message(2))]);
    }

    #[test]
    fn test_duplicate_upload_resolution_is_discarded() {
        let mut c = Controller::new();
        let req = c.select_files(vec![image("a.png")]).unwrap();
        assert_eq!(c.upload_resolved(req.ticket, uploaded("s1")), Resolution::Applied);
        assert_eq!(c.upload_resolved(req.ticket, uploaded("s2")), Resolution::Discarded);
        assert_eq!(c.session(), Some(&SessionId::new("s1")));
        assert_eq!(c.conversation().len(), 1);
    }

    #[test]
    fn test_answer_for_replaced_session_is_discarded() {
        let mut c = ready();
        let asked = c.ask("old question").unwrap();
        let upload = c.select_files(vec![image("new.png")]).unwrap();

        assert_eq!(c.ask_resolved(asked.ticket.clone(), answered("old answer")), Resolution::Discarded);
        assert!(c.conversation().is_empty());
        assert!(c.is_uploading());

        c.upload_resolved(upload.ticket, uploaded("s0"));
        // Same session string from the backend, but a newer generation.
        assert_eq!(c.ask_resolved(asked.ticket, answered("old answer")), Resolution::Discarded);
        assert_eq!(c.conversation().len(), 1);
    }

    #[test]
    fn test_image_scenario_upload_then_ask() {
        let mut c = Controller::new();
        let req = c.select_files(vec![image("image1.png")]).unwrap();
        let names: Vec<_> = c.attachments().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["image1.png"]);

        c.upload_resolved(req.ticket, uploaded("s1"));
        assert_eq!(
            c.conversation().turns(),
            &[bot("Processed 1 document(s). You can now ask questions.")]
        );

        let asked = c.ask("What is this?").unwrap();
        assert_eq!(asked.question, "What is this?");
        assert_eq!(asked.ticket.session, SessionId::new("s1"));
        assert_eq!(c.conversation().last(), Some(&user("What is this?")));
        assert!(c.is_loading());

        assert_eq!(
            c.ask_resolved(asked.ticket, answered("A cat.")),
            Resolution::Applied
        );
        assert_eq!(
            c.conversation().turns(),
            &[
                bot("Processed 1 document(s). You can now ask questions."),
                user("What is this?"),
                bot("A cat."),
            ]
        );
        assert_eq!(c.session(), Some(&SessionId::new("s1")));
        assert!(!c.is_loading());
    }

    #[test]
    fn test_mixed_scenario_appends_nothing() {
        let mut c = Controller::new();
        assert_eq!(
            c.select_files(vec![pdf("a.pdf"), image("b.png")]).unwrap_err(),
            ValidationError::MixedPdfBatch
        );
        assert!(c.conversation().is_empty());
        assert_eq!(c.session(), None);
        assert!(c.attachments().is_empty());
    }

    #[test]
    fn test_pdf_upload_failure_scenario() {
        let mut c = Controller::new();
        let req = c.select_files(vec![pdf("a.pdf")]).unwrap();
        c.upload_resolved(req.ticket, Err(RequestFailure::with_detail("parse error")));

        assert_eq!(c.conversation().turns(), &[bot("Error: parse error")]);
        assert_eq!(c.session(), None);
        assert!(!c.is_loading());
        assert_eq!(c.ask("anything?").unwrap_err(), GuidanceRejection::NoSession);
        assert_eq!(c.conversation().len(), 1);
    }

    #[test]
    fn test_failures_without_detail_use_fallbacks() {
        let mut c = Controller::new();
        let req = c.select_files(vec![image("a.png")]).unwrap();
        c.upload_resolved(req.ticket, Err(RequestFailure::generic()));
        assert_eq!(
            c.conversation().turns(),
            &[bot("Error: Failed to process documents.")]
        );

        let mut c = ready();
        let asked = c.ask("why?").unwrap();
        c.ask_resolved(asked.ticket, Err(RequestFailure::generic()));
        assert_eq!(
            c.conversation().last(),
            Some(&bot("Error: Failed to get an answer."))
        );
    }

    #[test]
    fn test_ask_failure_keeps_session_usable() {
        let mut c = ready();
        let asked = c.ask("first?").unwrap();
        c.ask_resolved(asked.ticket, Err(RequestFailure::with_detail("LLM timeout")));

        assert_eq!(c.conversation().last(), Some(&bot("Error: LLM timeout")));
        assert_eq!(c.session(), Some(&SessionId::new("s0")));
        assert!(c.ask("second?").is_ok());
    }

    #[test]
    fn test_question_is_sent_as_typed() {
        let mut c = ready();
        let asked = c.ask("  spaced out  ").unwrap();
        assert_eq!(asked.question, "  spaced out  ");
        assert_eq!(c.conversation().last(), Some(&user("  spaced out  ")));
    }

    #[test]
    fn test_preview_navigation_through_controller() {
        let mut c = ready();
        assert_eq!(c.current_preview().unwrap().index(), 0);
        c.next_preview();
        assert_eq!(c.current_preview().unwrap().attachment().name(), "b.png");
        c.next_preview();
        assert_eq!(c.current_preview().unwrap().index(), 0);
        c.previous_preview();
        assert_eq!(c.current_preview().unwrap().index(), 1);

        assert!(c.zoom());
        assert_eq!(c.preview().cursor(), 1);
        c.unzoom();
        assert!(!c.preview().is_zoomed());
    }

    #[test]
    fn test_preview_handles_follow_set_identity() {
        let ledger = PreviewLedger::new();
        let mut c = Controller::with_ledger(ledger.clone());
        c.select_files(vec![image("a.png"), image("b.png")]).unwrap();
        let first = c.current_preview().unwrap().id();
        assert_eq!(ledger.outstanding(), 1);

        c.select_files(vec![pdf("doc.pdf")]).unwrap();
        assert_eq!(ledger.outstanding(), 1);
        assert_eq!(ledger.drain_released(), vec![first]);
        assert_eq!(c.current_preview().unwrap().generation(), c.generation());
        assert!(!c.zoom());

        drop(c);
        assert_eq!(ledger.outstanding(), 0);
        assert_eq!(ledger.drain_released().len(), 1);
    }
}
