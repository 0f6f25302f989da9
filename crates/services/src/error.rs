//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::{BankError, RecordError};
use storage::{ParseError, StorageError, WorkbookError};

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quizzes available for this mode and stage selection")]
    Empty,

    #[error("current question was already answered")]
    AlreadyAnswered,

    #[error("already at the last question; close the session to finish")]
    AtLastQuestion,

    #[error("a continuation mode needs the save file it was loaded from")]
    MissingSavePath,

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while importing a workbook into the master bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bank(#[from] BankError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
