//! Never-failing front door to the tutor
//!
//! Callers get either the tutor's answer or a user-facing placeholder. Every
//! failure (missing configuration, timeouts, HTTP and API errors) is logged
//! and converted, never propagated.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::auth::ApiKeyManager;
use super::client::TutorClient;
use super::error::TutorError;
use super::models::{ChatRequest, StreamEvent};
use crate::config::TutorSettings;
use crate::quiz::QuestionRecord;

/// Tutor access with a bounded timeout and placeholder fallback
pub struct TutorGateway {
    settings: TutorSettings,
    client: Option<TutorClient>,
    timeout: Duration,
}

impl TutorGateway {
    /// Build a gateway, reading the API key from the environment or keyring
    pub fn from_settings(settings: TutorSettings) -> Self {
        let api_key = if settings.is_configured() {
            ApiKeyManager::find_api_key().map(|(key, source)| {
                tracing::debug!("Using tutor API key from {:?}", source);
                key
            })
        } else {
            None
        };
        Self::new(settings, api_key)
    }

    /// Build a gateway with an explicit API key
    pub fn new(settings: TutorSettings, api_key: Option<String>) -> Self {
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));

        let client = match settings.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(endpoint) => match TutorClient::new(endpoint.trim(), api_key, timeout) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!("Failed to create tutor client: {}", e);
                    None
                }
            },
            None => None,
        };

        Self { settings, client, timeout }
    }

    /// Override the overall time bound for one answer
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a tutor endpoint is usable
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Ask the tutor, returning its answer or a placeholder
    pub async fn explain(&self, prompt: &str) -> String {
        match self.try_explain(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                log_failure("Tutor fell back to placeholder", &e);
                e.placeholder()
            }
        }
    }

    /// Ask the tutor, keeping the typed error
    ///
    /// When the primary model is busy or loading and a fallback model is
    /// configured, the request is retried once with the fallback.
    pub async fn try_explain(&self, prompt: &str) -> Result<String, TutorError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(TutorError::EmptyPrompt);
        }
        let client = self.client.as_ref().ok_or(TutorError::NotConfigured)?;

        let request = ChatRequest::from_prompt(&self.settings, prompt);
        match self.bounded(client.complete(request.clone())).await {
            Err(e) if e.is_busy() => match &self.settings.fallback_model {
                Some(fallback) => {
                    tracing::info!("Primary tutor model busy ({}), retrying with {}", e, fallback);
                    self.bounded(client.complete(request.with_model(fallback))).await
                }
                None => Err(e),
            },
            result => result,
        }
    }

    /// Stream an answer through `tx`
    ///
    /// Bounded by the same timeout as [`Self::try_explain`] and retried once
    /// with the fallback model when the primary is busy. Busy errors come back
    /// before any text is sent, so the retry never repeats output. Failures
    /// are reported both as the return value and as a final
    /// [`StreamEvent::Error`] carrying the placeholder text.
    pub async fn stream(
        &self,
        prompt: &str,
        tx: mpsc::Sender<StreamEvent>,
        cancel_token: CancellationToken,
    ) -> Result<(), TutorError> {
        let result = match (prompt.trim(), self.client.as_ref()) {
            ("", _) => Err(TutorError::EmptyPrompt),
            (_, None) => Err(TutorError::NotConfigured),
            (prompt, Some(client)) => {
                let request = ChatRequest::from_prompt(&self.settings, prompt);
                let first = client.stream(request.clone(), tx.clone(), cancel_token.clone());
                match self.bounded(first).await {
                    Err(e) if e.is_busy() => match &self.settings.fallback_model {
                        Some(fallback) => {
                            tracing::info!(
                                "Primary tutor model busy ({}), streaming from {}",
                                e,
                                fallback
                            );
                            let retry =
                                client.stream(request.with_model(fallback), tx.clone(), cancel_token);
                            self.bounded(retry).await
                        }
                        None => Err(e),
                    },
                    result => result,
                }
            }
        };

        if let Err(e) = &result {
            log_failure("Tutor stream failed", e);
            let _ = tx.send(StreamEvent::Error { message: e.placeholder() }).await;
        }
        result
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, TutorError>
    where
        F: Future<Output = Result<T, TutorError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(TutorError::Timeout { seconds: self.timeout.as_secs() }))
    }
}

/// Log a tutor failure, transient ones at info level
fn log_failure(context: &str, error: &TutorError) {
    if error.is_recoverable() {
        tracing::info!("{}: {}", context, error);
    } else {
        tracing::warn!("{}: {}", context, error);
    }
}

/// Build the prompt asking the tutor to explain a quiz question
pub fn explain_question_prompt(record: &QuestionRecord, selected: Option<&str>) -> String {
    let mut prompt = format!("Topic: {}\nQuestion: {}\nOptions:\n", record.topic, record.prompt);
    for option in &record.options {
        prompt.push_str("  ");
        prompt.push_str(option);
        prompt.push('\n');
    }
    prompt.push_str(&format!("Correct answer: {}\n", record.correct_label.trim()));

    match selected {
        Some(choice) if !record.is_correct(choice) => prompt.push_str(&format!(
            "I chose \"{}\". Explain why it is wrong and why the correct answer is right.",
            choice
        )),
        _ => prompt.push_str("Explain why the correct answer is right and the others are not."),
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn record() -> QuestionRecord {
        QuestionRecord {
            topic: "Money".into(),
            prompt: "Reserve ratio 10%, credit multiplier is:".into(),
            options: vec!["A) 5".into(), "B) 10".into(), "C) 20".into()],
            correct_label: "B".into(),
            explanation: "1/0.1 = 10.".into(),
        }
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Serve canned responses, one per connection, and collect request bodies
    async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut bodies = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 4096];

                let body = loop {
                    let n = socket.read(&mut buf).await.unwrap();
                    raw.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&raw).to_string();
                    if let Some(split) = text.find("\r\n\r\n") {
                        let length = text[..split]
                            .lines()
                            .find_map(|l| {
                                let (name, value) = l.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if raw.len() >= split + 4 + length {
                            break text[split + 4..].to_string();
                        }
                    }
                    if n == 0 {
                        break String::new();
                    }
                };

                bodies.push(body);
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            bodies
        });

        (url, handle)
    }

    fn settings(endpoint: &str) -> TutorSettings {
        TutorSettings { endpoint: Some(endpoint.to_string()), ..TutorSettings::default() }
    }

    #[tokio::test]
    async fn unconfigured_gateway_returns_placeholder() {
        let gateway = TutorGateway::new(TutorSettings::default(), None);
        assert!(!gateway.is_available());

        let answer = gateway.explain("What is inflation?").await;
        assert_eq!(answer, TutorError::NotConfigured.placeholder());
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_a_call() {
        let gateway = TutorGateway::new(settings("http://127.0.0.1:9/v1/chat/completions"), None);
        assert!(matches!(gateway.try_explain("   ").await, Err(TutorError::EmptyPrompt)));
    }

    #[tokio::test]
    async fn returns_answer_text() {
        let body = r#"{"choices":[{"message":{"content":"Inflation is a rise in prices."}}]}"#;
        let (url, server) = serve(vec![http_response("200 OK", body)]).await;

        let gateway = TutorGateway::new(settings(&url), Some("test-key".into()));
        assert_eq!(gateway.explain("What is inflation?").await, "Inflation is a rise in prices.");

        let requests = server.await.unwrap();
        assert!(requests[0].contains("What is inflation?"));
    }

    #[tokio::test]
    async fn loading_model_retries_with_fallback() {
        let loading = r#"{"error":"Model is currently loading","estimated_time":12.0}"#;
        let ok = r#"{"choices":[{"message":{"content":"From the fallback."}}]}"#;
        let (url, server) = serve(vec![
            http_response("503 Service Unavailable", loading),
            http_response("200 OK", ok),
        ])
        .await;

        let gateway = TutorGateway::new(
            TutorSettings {
                model: Some("primary".into()),
                fallback_model: Some("backup".into()),
                ..settings(&url)
            },
            None,
        );
        assert_eq!(gateway.explain("Hi").await, "From the fallback.");

        let requests = server.await.unwrap();
        assert!(requests[0].contains("\"primary\""));
        assert!(requests[1].contains("\"backup\""));
    }

    #[tokio::test]
    async fn loading_model_without_fallback_gives_warming_placeholder() {
        let loading = r#"{"error":"Model is currently loading","estimated_time":30.0}"#;
        let (url, _server) =
            serve(vec![http_response("503 Service Unavailable", loading)]).await;

        let gateway = TutorGateway::new(settings(&url), None);
        let answer = gateway.explain("Hi").await;
        assert!(answer.contains("warming up"));
    }

    #[tokio::test]
    async fn silent_server_times_out_to_placeholder() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let gateway =
            TutorGateway::new(settings(&url), None).with_timeout(Duration::from_millis(200));
        let err = gateway.try_explain("Hi").await.unwrap_err();
        assert!(matches!(err, TutorError::Timeout { .. }));
    }

    #[tokio::test]
    async fn stream_reports_placeholder_when_unconfigured() {
        let gateway = TutorGateway::new(TutorSettings::default(), None);
        let (tx, mut rx) = mpsc::channel(4);

        let result = gateway.stream("Hi", tx, CancellationToken::new()).await;
        assert!(matches!(result, Err(TutorError::NotConfigured)));
        assert!(matches!(rx.recv().await, Some(StreamEvent::Error { .. })));
    }

    async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn stream_retries_busy_model_with_fallback() {
        let loading = r#"{"error":"Model is currently loading","estimated_time":12.0}"#;
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"From the \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"fallback.\"}}]}\n\n",
            "data: [DONE]\n\n"
        );
        let (url, server) = serve(vec![
            http_response("503 Service Unavailable", loading),
            http_response("200 OK", sse),
        ])
        .await;

        let gateway = TutorGateway::new(
            TutorSettings {
                model: Some("primary".into()),
                fallback_model: Some("backup".into()),
                ..settings(&url)
            },
            None,
        );
        let (tx, rx) = mpsc::channel(16);
        gateway.stream("Hi", tx, CancellationToken::new()).await.unwrap();

        assert_eq!(
            collect(rx).await,
            vec![
                StreamEvent::Delta { text: "From the ".into() },
                StreamEvent::Delta { text: "fallback.".into() },
                StreamEvent::Done,
            ]
        );
        let requests = server.await.unwrap();
        assert!(requests[0].contains("\"primary\""));
        assert!(requests[1].contains("\"backup\""));
    }

    #[tokio::test]
    async fn stream_is_bounded_by_gateway_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let gateway =
            TutorGateway::new(settings(&url), None).with_timeout(Duration::from_millis(200));
        let (tx, rx) = mpsc::channel(4);
        let result = gateway.stream("Hi", tx, CancellationToken::new()).await;

        assert!(matches!(result, Err(TutorError::Timeout { .. })));
        let placeholder = TutorError::Timeout { seconds: 0 }.placeholder();
        assert_eq!(collect(rx).await, vec![StreamEvent::Error { message: placeholder }]);
    }

    #[tokio::test]
    async fn stream_with_malformed_chunk_ends_with_placeholder() {
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Partial\"}}]}\n\n",
            "data: {broken\n\n"
        );
        let (url, _server) = serve(vec![http_response("200 OK", sse)]).await;

        let gateway = TutorGateway::new(settings(&url), None);
        let (tx, rx) = mpsc::channel(16);
        let result = gateway.stream("Hi", tx, CancellationToken::new()).await;

        assert!(matches!(result, Err(TutorError::StreamParseError(_))));
        let events = collect(rx).await;
        assert_eq!(events[0], StreamEvent::Delta { text: "Partial".into() });
        assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
    }

    #[test]
    fn question_prompt_mentions_wrong_choice() {
        let prompt = explain_question_prompt(&record(), Some("C) 20"));
        assert!(prompt.contains("Reserve ratio 10%"));
        assert!(prompt.contains("Correct answer: B"));
        assert!(prompt.contains("I chose \"C) 20\""));
    }

    #[test]
    fn question_prompt_without_wrong_choice() {
        let prompt = explain_question_prompt(&record(), Some("B) 10"));
        assert!(!prompt.contains("I chose"));
        assert!(explain_question_prompt(&record(), None).contains("Explain why"));
    }
}
