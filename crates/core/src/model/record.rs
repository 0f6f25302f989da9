use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::stage::Stage;

/// Number of answer choices every record carries.
pub const CHOICE_COUNT: usize = 4;

//
// ─── QUIZ RECORD ───────────────────────────────────────────────────────────────
//

/// A single four-choice question.
///
/// `choices[0]` holds the correct answer as parsed; display layers may
/// reorder choices freely because correctness is tracked by value, not
/// position. The persisted JSON keeps the original field name `quiz`
/// for the question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub qid: QuizId,
    pub genre: String,
    #[serde(rename = "quiz")]
    pub question: String,
    pub answer: String,
    pub choices: [String; CHOICE_COUNT],
}

impl QuizRecord {
    /// Stage this record belongs to, derived from its genre.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownGenre` if the genre is not one of
    /// the five fixed genre names.
    pub fn stage(&self) -> Result<Stage, RecordError> {
        Stage::from_genre(&self.genre).ok_or_else(|| RecordError::UnknownGenre {
            qid: self.qid.clone(),
            genre: self.genre.clone(),
        })
    }

    /// Check the structural invariants of the record.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::AnswerNotInChoices` if the answer value is
    /// not one of the choices, or `RecordError::UnknownGenre` for an
    /// unmapped genre.
    pub fn validate(&self) -> Result<(), RecordError> {
        self.stage()?;
        if !self.choices.iter().any(|choice| choice == &self.answer) {
            return Err(RecordError::AnswerNotInChoices {
                qid: self.qid.clone(),
            });
        }
        Ok(())
    }

    /// Whether the submitted choice value is the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer == choice
    }
}

//
// ─── RECORD ERRORS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("answer of {qid} is not one of its choices")]
    AnswerNotInChoices { qid: QuizId },

    #[error("record {qid} carries unknown genre {genre:?}")]
    UnknownGenre { qid: QuizId, genre: String },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
