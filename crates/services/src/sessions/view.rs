use std::path::PathBuf;

use drill_core::model::QuizId;

/// The current question as the UI should render it: choices already in
/// display order, correctness tracked by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub qid: QuizId,
    pub genre: String,
    pub question: String,
    pub choices: Vec<String>,
    /// 1-based index of this question within the run.
    pub position: usize,
    pub total: usize,
}

/// Outcome of a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub answer: String,
    /// Index of the correct answer within the displayed choice order.
    pub answer_index: Option<usize>,
}

/// Result of closing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub save_path: PathBuf,
    pub wrong_total: usize,
    pub restart_total: usize,
}
