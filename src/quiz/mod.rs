//! Multiple-choice quiz practice
//!
//! Questions come from a read-only [`QuestionBank`]. A [`QuizSession`] tracks
//! the question on screen, the user's selection and the running score, and is
//! persisted between interactions through a [`SessionStore`].

pub mod bank;
pub mod error;
pub mod question;
pub mod session;
pub mod store;

// Re-exports
pub use bank::{QuestionBank, RejectedRecord};
pub use error::QuizError;
pub use question::{QuestionRecord, RejectReason, split_label};
pub use session::{AnswerOutcome, QuizPhase, QuizSession, TopicTally};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
