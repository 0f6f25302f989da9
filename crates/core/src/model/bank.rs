use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::record::{QuizRecord, RecordError};
use crate::model::stage::{Stage, StageFilter};

//
// ─── STAGE QUIZZES ─────────────────────────────────────────────────────────────
//

/// Ordered record list for one stage, persisted as `{"quiz_list": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageQuizzes {
    pub quiz_list: Vec<QuizRecord>,
}

impl StageQuizzes {
    #[must_use]
    pub fn len(&self) -> usize {
        self.quiz_list.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quiz_list.is_empty()
    }
}

static EMPTY_STAGE: StageQuizzes = StageQuizzes {
    quiz_list: Vec::new(),
};

//
// ─── QUIZ BANK ─────────────────────────────────────────────────────────────────
//

/// Stage-keyed bank of quiz records.
///
/// Freshly built banks carry all five stage keys so persisted documents
/// keep a stable shape even when a stage is empty. Accessors tolerate a
/// missing key in hand-edited documents by treating it as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizBank {
    stages: BTreeMap<Stage, StageQuizzes>,
}

impl QuizBank {
    /// A bank with all five stages present and empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            stages: Stage::ALL
                .into_iter()
                .map(|stage| (stage, StageQuizzes::default()))
                .collect(),
        }
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> &StageQuizzes {
        self.stages.get(&stage).unwrap_or(&EMPTY_STAGE)
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageQuizzes {
        self.stages.entry(stage).or_default()
    }

    pub fn push(&mut self, stage: Stage, record: QuizRecord) {
        self.stage_mut(stage).quiz_list.push(record);
    }

    /// Total record count across all stages.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.stages.values().map(StageQuizzes::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Records of the selected stages, concatenated in stage key order.
    #[must_use]
    pub fn collect_stages(&self, filter: &StageFilter) -> Vec<QuizRecord> {
        Stage::ALL
            .into_iter()
            .filter(|stage| filter.contains(*stage))
            .flat_map(|stage| self.stage(stage).quiz_list.iter().cloned())
            .collect()
    }

    /// All records, concatenated in stage key order.
    #[must_use]
    pub fn collect_all(&self) -> Vec<QuizRecord> {
        self.collect_stages(&StageFilter::all())
    }

    /// Check the bank invariants: every record validates, is filed
    /// under the stage its genre maps to, and has a qid unique within
    /// its stage.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a `BankError`.
    pub fn validate(&self) -> Result<(), BankError> {
        for (&stage, quizzes) in &self.stages {
            let mut seen: BTreeSet<&QuizId> = BTreeSet::new();
            for record in &quizzes.quiz_list {
                record.validate()?;
                if record.stage()? != stage {
                    return Err(BankError::MisfiledRecord {
                        qid: record.qid.clone(),
                        stage,
                    });
                }
                if !seen.insert(&record.qid) {
                    return Err(BankError::DuplicateQuizId {
                        qid: record.qid.clone(),
                        stage,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for QuizBank {
    fn default() -> Self {
        Self::empty()
    }
}

//
// ─── BANK ERRORS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("record {qid} is filed under {stage} but its genre maps elsewhere")]
    MisfiledRecord { qid: QuizId, stage: Stage },

    #[error("duplicate quiz id {qid} within {stage}")]
    DuplicateQuizId { qid: QuizId, stage: Stage },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
