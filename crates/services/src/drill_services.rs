use std::path::{Path, PathBuf};

use tracing::info;

use drill_core::model::{Mode, QuizBank, StageFilter};
use storage::{ParseOutcome, QuizStore, SaveFileEntry, StorageError, Workbook, WorkbookParser};

use crate::error::{ImportError, SessionError};
use crate::review_service::ReviewListManager;
use crate::sessions::{SessionHandle, SessionPlan, SessionState};

//
// ─── SESSION REQUEST ───────────────────────────────────────────────────────────
//

/// How a session should be started.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub mode: Mode,
    /// Stage selection; honored by `Normal` and `Review`, ignored by
    /// the continuation modes (they replay their save file whole).
    pub stages: StageFilter,
    /// Shuffle the presentation order of the working set.
    pub shuffle: bool,
    /// Initial state of the per-question review toggle.
    pub default_review: bool,
    /// Save file to continue from; required by `Wrong` and `Restart`.
    pub save_path: Option<PathBuf>,
}

impl SessionRequest {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            stages: StageFilter::all(),
            shuffle: false,
            default_review: false,
            save_path: None,
        }
    }

    #[must_use]
    pub fn with_stages(mut self, stages: StageFilter) -> Self {
        self.stages = stages;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_default_review(mut self, default_review: bool) -> Self {
        self.default_review = default_review;
        self
    }

    #[must_use]
    pub fn with_save_path(mut self, save_path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(save_path.into());
        self
    }
}

//
// ─── DRILL SERVICES ────────────────────────────────────────────────────────────
//

/// Entry point the UI layer talks to.
///
/// Owns nothing but the store location; the UI keeps no quiz-domain
/// state beyond what it renders per call. Precondition failures (no
/// imported bank, missing save file) surface here, not inside the
/// engine.
#[derive(Debug, Clone)]
pub struct DrillServices {
    store: QuizStore,
}

impl DrillServices {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: QuizStore::new(data_dir),
        }
    }

    #[must_use]
    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    /// Parse a source workbook and replace the master bank.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the workbook cannot be read, a block is
    /// malformed, the parsed bank violates its invariants, or the bank
    /// document cannot be written.
    pub fn import_workbook(&self, xlsx_path: &Path) -> Result<ParseOutcome, ImportError> {
        let workbook = Workbook::open(xlsx_path)?;
        let outcome = WorkbookParser::new().parse(&workbook)?;
        outcome.bank.validate()?;
        self.store.save_bank(&outcome.bank)?;
        info!(
            path = %xlsx_path.display(),
            records = outcome.bank.total_len(),
            skipped = outcome.diagnostics.len(),
            "workbook imported"
        );
        Ok(outcome)
    }

    /// Load the master bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingInputFile` until a workbook has
    /// been imported.
    pub fn load_bank(&self) -> Result<QuizBank, StorageError> {
        self.store.load_bank()
    }

    /// All save-data documents, for the UI's save selection list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails or a save file name
    /// does not parse.
    pub fn list_save_files(&self) -> Result<Vec<SaveFileEntry>, StorageError> {
        self.store.list_save_files()
    }

    #[must_use]
    pub fn has_bank(&self) -> bool {
        self.store.has_bank()
    }

    #[must_use]
    pub fn has_review(&self) -> bool {
        self.store.has_review()
    }

    #[must_use]
    pub fn has_save_files(&self) -> bool {
        self.store.has_save_files()
    }

    /// Start a session for the requested mode.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingSavePath` when a continuation mode
    /// lacks its source save file, `SessionError::Empty` when the mode
    /// and stage selection yield no quizzes, and storage errors for
    /// missing or unreadable input documents.
    pub fn start_session(&self, request: SessionRequest) -> Result<SessionHandle, SessionError> {
        let plan = match request.mode {
            Mode::Normal => SessionPlan::normal(&self.store.load_bank()?, &request.stages),
            Mode::Review => SessionPlan::review(&self.store.load_review()?, &request.stages),
            Mode::Wrong | Mode::Restart => {
                let path = request
                    .save_path
                    .as_deref()
                    .ok_or(SessionError::MissingSavePath)?;
                let save = self.store.load_save_data(path)?;
                match request.mode {
                    Mode::Wrong => SessionPlan::wrong(&save),
                    _ => SessionPlan::restart(&save),
                }
            }
        };
        let plan = if request.shuffle { plan.shuffled() } else { plan };

        let state = SessionState::start(plan)?;
        let review = ReviewListManager::load(&self.store)?;
        info!(mode = %request.mode, total = state.total(), "session started");
        Ok(SessionHandle::new(
            self.store.clone(),
            state,
            review,
            request.default_review,
            request.save_path,
        ))
    }
}
