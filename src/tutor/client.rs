//! HTTP client for an OpenAI-compatible chat completions endpoint

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::TutorError;
use super::models::{ChatRequest, ChatResponse, StreamEvent};
use super::streaming;

/// Longest error body excerpt kept in an error message
const MAX_ERROR_BODY: usize = 300;

/// Tutor API client
pub struct TutorClient {
    /// HTTP client
    client: Client,
    /// Chat completions URL
    endpoint: String,
    /// Bearer token, if the endpoint needs one
    api_key: Option<String>,
}

impl TutorClient {
    /// Create a client for `endpoint` with a bounded request timeout
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TutorError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.into(), api_key })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a request and return the complete answer text
    pub async fn complete(&self, mut request: ChatRequest) -> Result<String, TutorError> {
        request.stream = false;

        let response = self.send(&request).await?;
        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                "Tutor usage: {} prompt / {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        parsed.text().map(str::to_string).ok_or(TutorError::EmptyResponse)
    }

    /// Send a streaming request
    ///
    /// Text chunks are delivered through `tx`. Use the cancellation token to
    /// interrupt the request.
    pub async fn stream(
        &self,
        request: ChatRequest,
        tx: mpsc::Sender<StreamEvent>,
        cancel_token: CancellationToken,
    ) -> Result<(), TutorError> {
        let request = request.streaming();

        let response = tokio::select! {
            _ = cancel_token.cancelled() => return Err(TutorError::Cancelled),
            response = self.send(&request) => response?,
        };

        streaming::process_stream(response, tx, cancel_token).await
    }

    async fn send(&self, request: &ChatRequest) -> Result<Response, TutorError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("X-Title", "studyhub")
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body = response.text().await.unwrap_or_default();

        let err = classify_failure(status, &body, retry_after);
        tracing::warn!("Tutor request failed: {}", err);
        Err(err)
    }
}

/// Map a non-success response to a tutor error
fn classify_failure(status: StatusCode, body: &str, retry_after: Option<u64>) -> TutorError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return TutorError::RateLimited { retry_after_seconds: retry_after.unwrap_or(60) };
    }

    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str().or_else(|| v["error"].as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY).collect());

    if status == StatusCode::SERVICE_UNAVAILABLE {
        let estimate = parsed.as_ref().and_then(|v| v["estimated_time"].as_f64());
        if estimate.is_some() || message.to_lowercase().contains("loading") {
            return TutorError::ModelLoading {
                estimated_seconds: estimate.map(|s| s.ceil() as u64).unwrap_or(20),
            };
        }
    }

    TutorError::ApiError { status: status.as_u16(), message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client =
            TutorClient::new("http://localhost:9/v1/chat/completions", None, Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1/chat/completions");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "", Some(12));
        assert!(matches!(err, TutorError::RateLimited { retry_after_seconds: 12 }));
    }

    #[test]
    fn loading_model_with_estimate() {
        let body = r#"{"error":"Model is currently loading","estimated_time":17.3}"#;
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, body, None);
        assert!(matches!(err, TutorError::ModelLoading { estimated_seconds: 18 }));
    }

    #[test]
    fn loading_model_from_message_only() {
        let body = r#"{"error":{"message":"model loading, retry later"}}"#;
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, body, None);
        assert!(matches!(err, TutorError::ModelLoading { estimated_seconds: 20 }));
    }

    #[test]
    fn plain_unavailable_is_api_error() {
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "maintenance", None);
        assert!(matches!(err, TutorError::ApiError { status: 503, .. }));
    }

    #[test]
    fn unauthorized_keeps_api_message() {
        let body = r#"{"error":{"message":"No auth credentials found"}}"#;
        match classify_failure(StatusCode::UNAUTHORIZED, body, None) {
            TutorError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "No auth credentials found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn long_raw_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match classify_failure(StatusCode::BAD_GATEWAY, &body, None) {
            TutorError::ApiError { message, .. } => assert_eq!(message.len(), MAX_ERROR_BODY),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
