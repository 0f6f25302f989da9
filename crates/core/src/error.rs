use thiserror::Error;

use crate::model::{BankError, RecordError, UnknownMode};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Mode(#[from] UnknownMode),
}
