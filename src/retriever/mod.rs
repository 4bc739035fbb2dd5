//! Candidate retrieval from the external semantic-search/generation service

mod adapter;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::CandidateUseCase;

pub use adapter::RetrievalAdapter;
pub use http::HttpCandidateRetriever;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetrieverError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

/// Which service operation to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Use cases traceable to uploaded document excerpts
    DocumentGrounded,
    /// Free-text suggestions from the generator
    Generative,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::DocumentGrounded => "document",
            RetrievalMode::Generative => "generative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub query_text: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResponse {
    #[serde(default, deserialize_with = "each_candidate")]
    pub candidates: Vec<CandidateUseCase>,
    #[serde(default)]
    pub success: bool,
}

/// Read candidates one at a time so an unreadable entry only drops itself
fn each_candidate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<CandidateUseCase>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(kind = %value_kind(&other), "Candidates field is not a list, ignoring it");
            Vec::new()
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable candidate");
                None
            }
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Contract of the retrieval/generation service
#[async_trait]
pub trait CandidateRetriever: Send + Sync {
    async fn retrieve(
        &self,
        mode: RetrievalMode,
        request: &RetrievalRequest,
    ) -> Result<RetrievalResponse, RetrieverError>;
}
