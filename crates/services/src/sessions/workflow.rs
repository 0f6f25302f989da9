use std::path::PathBuf;

use tracing::info;

use drill_core::model::Mode;
use storage::QuizStore;

use super::progress::SessionProgress;
use super::state::SessionState;
use super::view::{AnswerFeedback, QuestionView, SessionOutcome};
use crate::error::SessionError;
use crate::review_service::ReviewListManager;

/// A live practice session bound to its store.
///
/// Owns the state machine, the review list and the save-target routing.
/// Every exit from a running session goes through [`close`], so a
/// window-close style cancellation preserves exactly the same data as a
/// deliberate early save.
///
/// [`close`]: SessionHandle::close
#[derive(Debug)]
pub struct SessionHandle {
    store: QuizStore,
    state: SessionState,
    review: ReviewListManager,
    review_toggle: bool,
    default_review: bool,
    /// Save file the session was loaded from (continuation modes).
    source_path: Option<PathBuf>,
}

impl SessionHandle {
    pub(crate) fn new(
        store: QuizStore,
        state: SessionState,
        review: ReviewListManager,
        default_review: bool,
        source_path: Option<PathBuf>,
    ) -> Self {
        Self {
            store,
            state,
            review,
            review_toggle: default_review,
            default_review,
            source_path,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.state.progress()
    }

    #[must_use]
    pub fn current_question(&self) -> QuestionView {
        self.state.current_question()
    }

    #[must_use]
    pub fn review_toggle(&self) -> bool {
        self.review_toggle
    }

    /// Flag or unflag the current question for the review list. Only
    /// the state at the moment the question is left counts.
    pub fn set_review_toggle(&mut self, keep: bool) {
        self.review_toggle = keep;
    }

    /// Submit a choice value for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyAnswered` on a second submit.
    pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerFeedback, SessionError> {
        self.state.submit_answer(choice)
    }

    /// Leave the current question: apply its review toggle, reset the
    /// toggle to the session default, and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AtLastQuestion` on the last question.
    pub fn next(&mut self) -> Result<(), SessionError> {
        let record = self.state.current_record().clone();
        self.review.apply(self.review_toggle, &record)?;
        self.review_toggle = self.default_review;
        self.state.advance()
    }

    /// Finish or abandon the session. Both routes run the same
    /// finalization: partition unconsumed records, apply the current
    /// review toggle one last time, write the save document to its
    /// mode-routed target, and flush the review list.
    ///
    /// `Normal` and `Review` sessions write a new numbered save file;
    /// `Wrong` and `Restart` sessions overwrite the file they were
    /// loaded from.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for record or persistence failures.
    pub fn close(mut self, is_finish: bool) -> Result<SessionOutcome, SessionError> {
        let record = self.state.current_record().clone();
        self.review.apply(self.review_toggle, &record)?;

        let mode = self.state.mode();
        let save = self.state.finish(is_finish)?;

        let save_path = if mode.is_continuation() {
            self.source_path.ok_or(SessionError::MissingSavePath)?
        } else {
            self.store.next_save_path(mode)?
        };
        self.store.write_save_data(&save_path, &save)?;
        self.review.flush(&self.store)?;

        info!(%mode, path = %save_path.display(), "session saved");
        Ok(SessionOutcome {
            save_path,
            wrong_total: save.wrong_quizzes.total_len(),
            restart_total: save.restart_quizzes.total_len(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
