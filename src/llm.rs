//! Inference endpoint abstraction
//!
//! The endpoint is opaque: it takes a text query and returns a text reply or
//! fails.

mod error;
mod http;
mod types;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatService;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for inference endpoints
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send one query and wait for its reply
    async fn ask(&self, query: &str) -> Result<String, ChatError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        (**self).ask(query).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for chat services
pub struct LoggingService {
    inner: Arc<dyn ChatService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ChatService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl ChatService for LoggingService {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.ask(query).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    query_len = query.len(),
                    reply_len = reply.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    error_kind = %e.kind,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
