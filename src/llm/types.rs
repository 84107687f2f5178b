//! Wire types for the inference endpoint

use serde::{Deserialize, Serialize};

/// Request body: `{"query": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Success body: `{"response": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Error body some endpoints send with a 4xx, e.g. `{"error": "Query parameter is missing"}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
