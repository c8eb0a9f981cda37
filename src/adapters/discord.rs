//! Discord REST notification sink.
//!
//! Posts plain messages to one channel with a bot token. Only the REST
//! endpoint is used; no gateway connection is opened.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::traits::{Headers, HttpClient, NotificationSink, Response, SinkError};

/// Discord REST API base URL.
pub const DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Longest message Discord accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Multi-line block quote marker. Discord only honors it at the start of a
/// message, so every piece of a split message repeats it.
const BLOCK_QUOTE: &str = ">>> ";

/// Discord error body: `{"message": "...", "code": 50001}`.
#[derive(Debug, Deserialize)]
struct DiscordErrorBody {
    message: String,
}

/// Sends notifications to a Discord channel.
pub struct DiscordSink {
    http: Arc<dyn HttpClient>,
    base_url: String,
    token: String,
    channel_id: String,
}

impl DiscordSink {
    pub fn new(
        http: Arc<dyn HttpClient>,
        token: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: DISCORD_API_URL.to_string(),
            token: token.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Point at a different API root (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.base_url, self.channel_id)
    }

    async fn post_message(&self, content: &str) -> Result<(), SinkError> {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), format!("Bot {}", self.token));
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let body = serde_json::json!({ "content": content }).to_string();

        let response = self
            .http
            .post(&self.messages_url(), &body, &headers)
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if response.is_success() {
            Ok(())
        } else {
            Err(rejection(&response))
        }
    }
}

fn rejection(response: &Response) -> SinkError {
    let message = response
        .json::<DiscordErrorBody>()
        .map(|body| body.message)
        .or_else(|_| response.text())
        .unwrap_or_else(|_| "Unknown error".to_string());
    SinkError::Rejected {
        status: response.status,
        message,
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    /// Long content goes out as several messages, split between lines.
    async fn send(&self, content: &str) -> Result<(), SinkError> {
        let (prefix, body) = match content.strip_prefix(BLOCK_QUOTE) {
            Some(body) => (BLOCK_QUOTE, body),
            None => ("", content),
        };
        let limit = MAX_MESSAGE_CHARS - prefix.chars().count();
        for chunk in split_message(body, limit) {
            self.post_message(&format!("{}{}", prefix, chunk)).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for DiscordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSink")
            .field("base_url", &self.base_url)
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

/// Split `content` into pieces of at most `limit` characters.
///
/// Breaks fall after a newline where possible. A single line longer than
/// `limit` is cut mid-line.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        for ch in line.chars() {
            if current_len == limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};

    const BASE: &str = "https://discord.test/api/v10";

    fn sink(mock: &MockHttpClient) -> DiscordSink {
        DiscordSink::new(Arc::new(mock.clone()), "bot-token", "123").with_base_url(BASE)
    }

    #[test]
    fn test_split_short_message_untouched() {
        assert_eq!(split_message("hello\nworld", 2000), vec!["hello\nworld"]);
        assert!(split_message("", 2000).is_empty());
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc\n", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc\n"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_split_overlong_line() {
        let chunks = split_message("abcdefghij\nxy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij\n", "xy"]);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let line = "é".repeat(2000);
        assert_eq!(split_message(&line, 2000).len(), 1);
    }

    #[tokio::test]
    async fn test_send_posts_to_channel() {
        let mock = MockHttpClient::new();
        let url = format!("{}/channels/123/messages", BASE);
        mock.set_response(
            &url,
            MockResponse::Success(Response::json_body(200, &serde_json::json!({"id": "1"}))),
        );

        sink(&mock).send(">>> hi").await.unwrap();

        let request = &mock.get_requests()[0];
        assert_eq!(request.url, url);
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bot bot-token")
        );
        assert_eq!(request.body.as_deref(), Some(r#"{"content":">>> hi"}"#));
    }

    #[tokio::test]
    async fn test_send_long_content_in_pieces() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            200,
            &serde_json::json!({}),
        )));
        let line = format!("{}\n", "x".repeat(99));
        let content = line.repeat(50);

        sink(&mock).send(&content).await.unwrap();
        assert_eq!(mock.get_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_block_quote_repeated_on_every_piece() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            200,
            &serde_json::json!({}),
        )));
        let line = format!("{}\n", "x".repeat(99));
        let content = format!(">>> {}", line.repeat(50));

        sink(&mock).send(&content).await.unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 3);
        let mut rebuilt = String::new();
        for request in &requests {
            let body: serde_json::Value =
                serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
            let piece = body["content"].as_str().unwrap();
            assert!(piece.starts_with(">>> "));
            assert!(piece.chars().count() <= MAX_MESSAGE_CHARS);
            rebuilt.push_str(&piece[4..]);
        }
        assert_eq!(rebuilt, line.repeat(50));
    }

    #[tokio::test]
    async fn test_rejection_carries_discord_message() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            403,
            &serde_json::json!({"message": "Missing Access", "code": 50001}),
        )));

        let err = sink(&mock).send("hi").await.unwrap_err();
        assert!(matches!(
            err,
            SinkError::Rejected { status: 403, ref message } if message == "Missing Access"
        ));
    }
}
