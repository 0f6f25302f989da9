#![forbid(unsafe_code)]

pub mod error;
pub mod model;

pub use error::Error;

pub use model::{
    BankError, Mode, QuizBank, QuizId, QuizRecord, RecordError, SaveData, Stage, StageFilter,
    StageQuizzes, UnknownMode,
};
