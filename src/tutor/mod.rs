//! AI tutor integration module
//!
//! Provides API key management, an HTTP client for OpenAI-compatible chat
//! completions endpoints, streaming support, and a gateway that always
//! produces something printable.

pub mod auth;
pub mod client;
pub mod error;
pub mod gateway;
pub mod models;
pub mod streaming;

// Re-export commonly used types
pub use auth::{ApiKeyManager, KeySource};
pub use client::TutorClient;
pub use error::TutorError;
pub use gateway::{TutorGateway, explain_question_prompt};
pub use models::{ChatMessage, ChatRequest, Role, StreamEvent};
