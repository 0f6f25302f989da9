mod bank;
mod ids;
mod mode;
mod record;
mod save;
mod stage;

pub use bank::{BankError, QuizBank, StageQuizzes};
pub use ids::QuizId;
pub use mode::{Mode, UnknownMode};
pub use record::{CHOICE_COUNT, QuizRecord, RecordError};
pub use save::SaveData;
pub use stage::{Stage, StageFilter};
