use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Practice mode.
///
/// The mode selects where the working set comes from and the shape of
/// the saved outcome; the per-question mechanics are identical across
/// modes. The string encoding below is load-bearing: it is both the
/// external configuration token and the mode tag embedded in save file
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Fresh run over the master bank, filtered by selected stages.
    Normal,
    /// Run over the wrong-answer partition of a prior save.
    Wrong,
    /// Run over the persistent review list.
    Review,
    /// Resume the unanswered partition of a prior save.
    Restart,
}

/// A mode token that matches none of the four known encodings.
///
/// Deliberately fatal wherever it surfaces; modes are never defaulted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown mode {0:?}")]
pub struct UnknownMode(pub String);

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Normal, Mode::Wrong, Mode::Review, Mode::Restart];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Wrong => "wrong",
            Mode::Review => "review",
            Mode::Restart => "restart",
        }
    }

    /// Continuation modes overwrite the save file they were loaded
    /// from instead of creating a new one.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        matches!(self, Mode::Wrong | Mode::Restart)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
