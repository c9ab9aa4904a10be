//! Server-Sent Events (SSE) parser for streamed chat completions

use futures_util::StreamExt;
use reqwest::Response;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::TutorError;
use super::models::StreamEvent;

/// Process an SSE stream from a chat completions endpoint
///
/// Reads the response body as a stream of `data:` lines and sends parsed
/// events through the provided channel. Respects the cancellation token
/// for user interruption.
pub async fn process_stream(
    response: Response,
    tx: mpsc::Sender<StreamEvent>,
    cancel_token: CancellationToken,
) -> Result<(), TutorError> {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                return Err(TutorError::Cancelled);
            }

            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(&bytes);

                        while let Some(line) = next_line(&mut buffer) {
                            let Some(data) = line.strip_prefix("data:") else {
                                // event:, id:, comments and blank separators
                                continue;
                            };

                            if let Some(event) = parse_data(data.trim_start())? {
                                let done = event == StreamEvent::Done;
                                if tx.send(event).await.is_err() || done {
                                    return Ok(());
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(TutorError::RequestError(e));
                    }
                    None => {
                        let _ = tx.send(StreamEvent::Done).await;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Split the next complete line off the front of `buffer`
///
/// Bytes are only decoded once the whole line has arrived, so a multi-byte
/// character split across two network chunks survives intact.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let newline_pos = buffer.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
    Some(String::from_utf8_lossy(&line).trim_end().to_string())
}

/// Parse the payload of a single `data:` line
///
/// Returns `Ok(None)` for chunks that carry no text (role announcements,
/// empty deltas).
fn parse_data(data: &str) -> Result<Option<StreamEvent>, TutorError> {
    if data == "[DONE]" {
        return Ok(Some(StreamEvent::Done));
    }

    let parsed: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        TutorError::StreamParseError(format!("{} in {:?}", e, truncate(data, 80)))
    })?;

    if let Some(error) = parsed.get("error") {
        let message = error["message"]
            .as_str()
            .or_else(|| error.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Ok(Some(StreamEvent::Error { message }));
    }

    Ok(parsed["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(|text| StreamEvent::Delta { text: text.to_string() }))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(data: &str) -> Option<StreamEvent> {
        parse_data(data).unwrap()
    }

    #[test]
    fn parse_content_delta() {
        let data = r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parsed(data), Some(StreamEvent::Delta { text: "Hello".into() }));
    }

    #[test]
    fn parse_role_only_delta_is_skipped() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parsed(data), None);
    }

    #[test]
    fn parse_done_marker() {
        assert_eq!(parsed("[DONE]"), Some(StreamEvent::Done));
    }

    #[test]
    fn parse_error_object() {
        let data = r#"{"error":{"message":"Model overloaded","code":503}}"#;
        assert_eq!(parsed(data), Some(StreamEvent::Error { message: "Model overloaded".into() }));
    }

    #[test]
    fn parse_error_string() {
        let data = r#"{"error":"Model is currently loading"}"#;
        assert_eq!(
            parsed(data),
            Some(StreamEvent::Error { message: "Model is currently loading".into() })
        );
    }

    #[test]
    fn parse_garbage_is_a_stream_error() {
        assert!(matches!(parse_data("{not json"), Err(TutorError::StreamParseError(_))));
    }

    #[test]
    fn lines_wait_for_their_newline() {
        let mut buffer = b"data: one\r\ndata: tw".to_vec();
        assert_eq!(next_line(&mut buffer), Some("data: one".to_string()));
        assert_eq!(next_line(&mut buffer), None);

        buffer.extend_from_slice(b"o\n");
        assert_eq!(next_line(&mut buffer), Some("data: two".to_string()));
        assert!(buffer.is_empty());
    }

    #[test]
    fn multibyte_char_split_across_chunks_survives() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"price \u{a3}5\"}}]}\n";
        let bytes = line.as_bytes();
        let split = line.find('\u{a3}').unwrap() + 1;

        let mut buffer = bytes[..split].to_vec();
        assert_eq!(next_line(&mut buffer), None);
        buffer.extend_from_slice(&bytes[split..]);

        let line = next_line(&mut buffer).unwrap();
        let data = line.strip_prefix("data:").unwrap().trim_start();
        assert_eq!(parsed(data), Some(StreamEvent::Delta { text: "price \u{a3}5".into() }));
    }
}
