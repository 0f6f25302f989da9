#![forbid(unsafe_code)]

pub mod drill_services;
pub mod error;
pub mod review_service;
pub mod sessions;

pub use drill_services::{DrillServices, SessionRequest};
pub use error::{ImportError, SessionError};
pub use review_service::ReviewListManager;

pub use sessions::{
    AnswerFeedback, QuestionView, SessionHandle, SessionOutcome, SessionPlan, SessionProgress,
    SessionState,
};
