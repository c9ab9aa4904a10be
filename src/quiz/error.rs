//! Error types for quiz session operations

use thiserror::Error;

/// Reasons a quiz operation was rejected
///
/// None of these are fatal. The session is left exactly as it was and the
/// next valid user action recovers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The question bank has no usable questions
    #[error("The question bank is empty")]
    EmptyBank,

    /// No question has been drawn yet
    #[error("No question is active")]
    NoActiveQuestion,

    /// Submit was requested before an option was chosen
    #[error("No option has been selected")]
    NoSelection,

    /// The chosen option is not one of the current question's options
    #[error("'{option}' is not an option of the current question")]
    InvalidOption {
        /// The rejected option text
        option: String,
    },

    /// The current question has already been answered
    #[error("The answer for this question has already been revealed")]
    AlreadyRevealed,
}

impl QuizError {
    /// Guidance to show the user alongside the error
    pub fn hint(&self) -> &'static str {
        match self {
            QuizError::EmptyBank => "No questions available. Check the question bank file.",
            QuizError::NoActiveQuestion => "Draw a question first.",
            QuizError::NoSelection => "Pick an option before submitting.",
            QuizError::InvalidOption { .. } => "Choose one of the listed options.",
            QuizError::AlreadyRevealed => "Move on to the next question.",
        }
    }
}
