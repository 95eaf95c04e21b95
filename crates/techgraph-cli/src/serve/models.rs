//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use techgraph_core::{QueryInput, StructuredQuery};

/// Body of `POST /query`.
///
/// Either `{"query": "free text"}` or the structured form
/// `{"errorCode": "E458", "productSku": "AM080MXVAF"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QueryBody {
    Text { query: String },
    Structured(StructuredQuery),
}

impl From<QueryBody> for QueryInput {
    fn from(body: QueryBody) -> Self {
        match body {
            QueryBody::Text { query } => QueryInput::Text(query),
            QueryBody::Structured(query) => QueryInput::Structured(query),
        }
    }
}

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `unavailable`.
    pub status: &'static str,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339.
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
