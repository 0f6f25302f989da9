use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::stage::Stage;

/// Stable identifier for a quiz record.
///
/// Assigned at parse time as the stage code digit followed by a
/// five-digit 1-based block sequence (`"300145"` is the 145th block of
/// stage3) and never changed afterwards. Unique within its stage.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Build an id from an already-encoded string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Assign the id for the `sequence`-th encountered block of `stage`.
    #[must_use]
    pub fn assign(stage: Stage, sequence: u32) -> Self {
        Self(format!("{}{:05}", stage.code(), sequence))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stage decoded from the leading code digit.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.0.chars().next().and_then(Stage::from_code)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuizId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
