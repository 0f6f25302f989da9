use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use drill_core::model::{QuizBank, QuizId, QuizRecord, RecordError, Stage};
use storage::{QuizStore, StorageError};

//
// ─── REVIEW LIST ───────────────────────────────────────────────────────────────
//

/// The cross-session review list: records the user flagged for later
/// practice, de-duplicated per stage by quiz id.
///
/// Membership is decided once per question via [`apply`]: the latest
/// toggle state wins, regardless of how often it flipped before. The
/// list spans the whole application lifetime and is flushed as one
/// whole document at session close.
///
/// [`apply`]: ReviewListManager::apply
#[derive(Debug, Clone)]
pub struct ReviewListManager {
    quizzes: QuizBank,
    members: BTreeMap<Stage, BTreeSet<QuizId>>,
}

impl ReviewListManager {
    #[must_use]
    pub fn new(quizzes: QuizBank) -> Self {
        let members = Stage::ALL
            .into_iter()
            .map(|stage| {
                let ids = quizzes
                    .stage(stage)
                    .quiz_list
                    .iter()
                    .map(|record| record.qid.clone())
                    .collect();
                (stage, ids)
            })
            .collect();
        Self { quizzes, members }
    }

    /// Load the persisted review list; a missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for I/O or JSON failures.
    pub fn load(store: &QuizStore) -> Result<Self, StorageError> {
        Ok(Self::new(store.load_review()?))
    }

    /// Write the review list back as one whole document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    pub fn flush(&self, store: &QuizStore) -> Result<(), StorageError> {
        store.save_review(&self.quizzes)
    }

    #[must_use]
    pub fn quizzes(&self) -> &QuizBank {
        &self.quizzes
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.quizzes.total_len()
    }

    #[must_use]
    pub fn is_member(&self, stage: Stage, qid: &QuizId) -> bool {
        self.members
            .get(&stage)
            .is_some_and(|ids| ids.contains(qid))
    }

    /// Add a record to its stage list; no-op when already a member.
    pub fn add(&mut self, stage: Stage, record: &QuizRecord) {
        let ids = self.members.entry(stage).or_default();
        if ids.insert(record.qid.clone()) {
            self.quizzes.push(stage, record.clone());
            debug!(qid = %record.qid, %stage, "review quiz added");
        }
    }

    /// Remove the record with this id from its stage list; no-op when
    /// absent.
    pub fn remove(&mut self, stage: Stage, qid: &QuizId) {
        let Some(ids) = self.members.get_mut(&stage) else {
            return;
        };
        if ids.remove(qid) {
            let quiz_list = &mut self.quizzes.stage_mut(stage).quiz_list;
            if let Some(index) = quiz_list.iter().position(|record| &record.qid == qid) {
                quiz_list.remove(index);
            }
            debug!(%qid, %stage, "review quiz removed");
        }
    }

    /// Apply the per-question toggle for a record: `true` keeps it on
    /// the list, `false` takes it off. Idempotent either way.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownGenre` if the record's genre maps
    /// to no stage.
    pub fn apply(&mut self, keep: bool, record: &QuizRecord) -> Result<(), RecordError> {
        let stage = record.stage()?;
        if keep {
            self.add(stage, record);
        } else {
            self.remove(stage, &record.qid);
        }
        Ok(())
    }
}

impl Default for ReviewListManager {
    fn default() -> Self {
        Self::new(QuizBank::empty())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_record(stage: Stage, seq: u32) -> QuizRecord {
        QuizRecord {
            qid: QuizId::assign(stage, seq),
            genre: stage.genre().to_string(),
            question: format!("問{seq}"),
            answer: "正".to_string(),
            choices: [
                "正".to_string(),
                "誤1".to_string(),
                "誤2".to_string(),
                "誤3".to_string(),
            ],
        }
    }

    #[test]
    fn add_then_remove_restores_prior_state() {
        let mut review = ReviewListManager::default();
        let record = build_record(Stage::Stage1, 1);

        assert!(!review.is_member(Stage::Stage1, &record.qid));
        review.add(Stage::Stage1, &record);
        assert!(review.is_member(Stage::Stage1, &record.qid));
        assert_eq!(review.total_len(), 1);

        review.remove(Stage::Stage1, &record.qid);
        assert!(!review.is_member(Stage::Stage1, &record.qid));
        assert_eq!(review.total_len(), 0);
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let mut review = ReviewListManager::default();
        let record = build_record(Stage::Stage2, 5);

        review.add(Stage::Stage2, &record);
        review.add(Stage::Stage2, &record);
        assert_eq!(review.quizzes().stage(Stage::Stage2).len(), 1);
    }

    #[test]
    fn removing_an_absent_id_is_a_no_op() {
        let mut review = ReviewListManager::default();
        review.remove(Stage::Stage3, &QuizId::new("300001"));
        assert_eq!(review.total_len(), 0);
    }

    #[test]
    fn repeated_toggle_with_the_same_value_changes_nothing() {
        let mut review = ReviewListManager::default();
        let record = build_record(Stage::Stage4, 2);

        review.apply(true, &record).unwrap();
        let after_first = review.quizzes().clone();
        review.apply(true, &record).unwrap();
        assert_eq!(*review.quizzes(), after_first);

        review.apply(false, &record).unwrap();
        let after_off = review.quizzes().clone();
        review.apply(false, &record).unwrap();
        assert_eq!(*review.quizzes(), after_off);
        assert!(!review.is_member(Stage::Stage4, &record.qid));
    }

    #[test]
    fn membership_is_rebuilt_from_a_loaded_bank() {
        let mut bank = QuizBank::empty();
        let record = build_record(Stage::Stage5, 9);
        bank.push(Stage::Stage5, record.clone());

        let review = ReviewListManager::new(bank);
        assert!(review.is_member(Stage::Stage5, &record.qid));
        assert!(!review.is_member(Stage::Stage1, &record.qid));
    }

    #[test]
    fn load_and_flush_round_trip_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuizStore::new(dir.path());

        let mut review = ReviewListManager::load(&store).unwrap();
        assert_eq!(review.total_len(), 0);

        let record = build_record(Stage::Stage1, 3);
        review.apply(true, &record).unwrap();
        review.flush(&store).unwrap();

        let reloaded = ReviewListManager::load(&store).unwrap();
        assert!(reloaded.is_member(Stage::Stage1, &record.qid));
    }
}
