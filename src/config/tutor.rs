//! AI tutor connection settings

use serde::{Deserialize, Serialize};

/// Overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "STUDYHUB_TUTOR_ENDPOINT";
/// Overrides the configured model
pub const MODEL_ENV: &str = "STUDYHUB_TUTOR_MODEL";

/// Settings for the OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorSettings {
    /// Full chat completions URL; the tutor is disabled when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model identifier sent with each request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model to retry with once when the primary is busy or loading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,

    /// System prompt framing the tutor's answers
    pub system_prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on a single tutor call, in seconds
    pub timeout_secs: u64,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            fallback_model: None,
            system_prompt: "You are a patient study tutor. Explain concepts clearly, \
                            step by step, and keep answers concise."
                .to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl TutorSettings {
    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.model = Some(model);
        }
    }

    /// Whether an endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}
