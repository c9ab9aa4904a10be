//! Data models for chat completions requests and responses

use serde::{Deserialize, Serialize};

use crate::config::TutorSettings;

/// Message role in conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Framing instructions
    System,
    /// User message
    User,
}

/// A single message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Request body for a chat completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier (omitted for single-model servers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to stream the response
    pub stream: bool,
}

impl ChatRequest {
    /// Build a single-question request from the tutor settings
    ///
    /// The system prompt is only included when it is non-empty.
    pub fn from_prompt(settings: &TutorSettings, prompt: &str) -> Self {
        let mut messages = Vec::with_capacity(2);
        let system = settings.system_prompt.trim();
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt.trim()));

        Self {
            model: settings.model.clone(),
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            stream: false,
        }
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Request a streamed response
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Events produced while reading a streamed response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Text chunk
    Delta {
        /// Text chunk
        text: String,
    },
    /// Stream finished
    Done,
    /// Error reported inside the stream
    Error {
        /// Error message
        message: String,
    },
}

/// Non-streaming chat completions response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Candidate completions
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Usage statistics
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice, if any
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// One completion candidate
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

/// Message inside a completion candidate
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens used
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens generated
    #[serde(default)]
    pub completion_tokens: u32,
}
