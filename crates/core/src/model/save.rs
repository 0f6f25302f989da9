use serde::{Deserialize, Serialize};

use crate::model::bank::QuizBank;

/// Persisted outcome of a practice session.
///
/// `wrong_quizzes` accumulates records answered incorrectly (or carried
/// over by a continuation run); `restart_quizzes` holds the records
/// that had not been presented when the session ended. Written as one
/// whole document at session close and only ever re-derived by a later
/// continuation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub wrong_quizzes: QuizBank,
    pub restart_quizzes: QuizBank,
}

impl SaveData {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            wrong_quizzes: QuizBank::empty(),
            restart_quizzes: QuizBank::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_data_keeps_both_partitions_in_json() {
        let json = serde_json::to_value(SaveData::empty()).unwrap();
        assert!(json.get("wrong_quizzes").is_some());
        assert!(json.get("restart_quizzes").is_some());
    }
}
