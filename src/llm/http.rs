//! HTTP JSON inference endpoint client

use super::types::{ChatReply, ChatRequest, ErrorBody};
use super::{ChatError, ChatService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Posts `{"query": ...}` to a single endpoint and expects `{"response": ...}` back
pub struct HttpChatService {
    client: Client,
    endpoint: String,
}

impl HttpChatService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn classify_error(status: StatusCode, body: &str) -> ChatError {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.trim().to_string());
        if detail.is_empty() {
            ChatError::status(format!("HTTP {status}"))
        } else {
            ChatError::status(format!("HTTP {status}: {detail}"))
        }
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest::new(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::transport(format!("Connection failed: {e}"))
                } else {
                    ChatError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        let reply: ChatReply = serde_json::from_str(&body)
            .map_err(|e| ChatError::malformed(format!("Failed to parse response: {e}")))?;

        Ok(reply.response)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
