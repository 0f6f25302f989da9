use rand::seq::SliceRandom;

use drill_core::model::{Mode, QuizBank, QuizRecord, SaveData};

use super::plan::SessionPlan;
use super::progress::SessionProgress;
use super::view::{AnswerFeedback, QuestionView};
use crate::error::SessionError;

/// Per-question drill state machine.
///
/// Owns the transient run state: the ordered working set, the cursor,
/// the answered flag, the display order of the current choices, and the
/// wrong/restart accumulators being built. Produces a `SaveData`
/// document when finished; review-list membership is the caller's
/// concern (driven by the per-question toggle).
#[derive(Debug)]
pub struct SessionState {
    mode: Mode,
    quizzes: Vec<QuizRecord>,
    cursor: usize,
    answered: bool,
    /// Shuffled choices of the current question.
    presented: Vec<String>,
    wrong: QuizBank,
    restart: QuizBank,
    carried_restart: Option<QuizBank>,
}

impl SessionState {
    /// Start a session from a plan.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when the plan selected no records.
    pub fn start(plan: SessionPlan) -> Result<Self, SessionError> {
        if plan.working_set.is_empty() {
            return Err(SessionError::Empty);
        }
        let mut state = Self {
            mode: plan.mode,
            quizzes: plan.working_set,
            cursor: 0,
            answered: false,
            presented: Vec::new(),
            wrong: plan.wrong_seed,
            restart: QuizBank::empty(),
            carried_restart: plan.carried_restart,
        };
        state.present();
        Ok(state)
    }

    /// Shuffle the current record's choices for display and reset the
    /// answered flag. Correctness is tracked by value, so the display
    /// order never matters to classification.
    fn present(&mut self) {
        self.answered = false;
        let mut choices = self.quizzes[self.cursor].choices.to_vec();
        choices.shuffle(&mut rand::rng());
        self.presented = choices;
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 >= self.quizzes.len()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    /// The record currently on display.
    #[must_use]
    pub fn current_record(&self) -> &QuizRecord {
        &self.quizzes[self.cursor]
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            position: self.cursor + 1,
            total: self.quizzes.len(),
            is_last: self.is_last(),
            answered: self.answered,
        }
    }

    /// The current question with its display choice order.
    #[must_use]
    pub fn current_question(&self) -> QuestionView {
        let record = self.current_record();
        QuestionView {
            qid: record.qid.clone(),
            genre: record.genre.clone(),
            question: record.question.clone(),
            choices: self.presented.clone(),
            position: self.cursor + 1,
            total: self.quizzes.len(),
        }
    }

    /// Submit a choice value for the current question.
    ///
    /// An incorrect value files the record into the wrong partition of
    /// its stage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyAnswered` on a second submit, or a
    /// record error if the record's genre maps to no stage.
    pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerFeedback, SessionError> {
        if self.answered {
            return Err(SessionError::AlreadyAnswered);
        }

        let record = self.current_record().clone();
        let stage = record.stage()?;
        let is_correct = record.is_correct(choice);
        if !is_correct {
            self.wrong.push(stage, record.clone());
        }
        self.answered = true;

        let answer_index = self
            .presented
            .iter()
            .position(|candidate| candidate == &record.answer);
        Ok(AnswerFeedback {
            is_correct,
            answer: record.answer,
            answer_index,
        })
    }

    /// Move on to the next question.
    ///
    /// Permitted without a prior submit: the question is skipped, never
    /// filed as wrong, and no longer counts as unconsumed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AtLastQuestion` on the last question; the
    /// session must be closed instead.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        if self.is_last() {
            return Err(SessionError::AtLastQuestion);
        }
        self.cursor += 1;
        self.present();
        Ok(())
    }

    /// Finish the session and emit its save document.
    ///
    /// Unless this is a clean finish with the final record answered,
    /// every unconsumed record from the cursor onward (exclusive of an
    /// already-answered current record) joins the restart partition;
    /// in `Wrong` mode those trailing records also rejoin the wrong
    /// partition so abandoning the run never drops unattempted entries.
    ///
    /// # Errors
    ///
    /// Returns a record error if an unconsumed record's genre maps to
    /// no stage.
    pub fn finish(mut self, is_finish: bool) -> Result<SaveData, SessionError> {
        if !(is_finish && self.answered) {
            let from = self.cursor + usize::from(self.answered);
            for record in &self.quizzes[from..] {
                let stage = record.stage()?;
                self.restart.push(stage, record.clone());
                if self.mode == Mode::Wrong {
                    self.wrong.push(stage, record.clone());
                }
            }
        }

        let restart_quizzes = match self.carried_restart {
            Some(carried) => carried,
            None => self.restart,
        };
        Ok(SaveData {
            wrong_quizzes: self.wrong,
            restart_quizzes,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
