//! HTTP client for the retrieval/generation service

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{CandidateRetriever, RetrievalMode, RetrievalRequest, RetrievalResponse, RetrieverError};

const EXTRACT_PATH: &str = "v1/use-cases/extract";
const GENERATE_PATH: &str = "v1/use-cases/generate";

/// Client posting retrieval requests as JSON
pub struct HttpCandidateRetriever {
    client: Client,
    base_url: Url,
}

impl HttpCandidateRetriever {
    pub fn new(base_url: &str) -> Result<Self, RetrieverError> {
        // Trailing slash so endpoint paths are joined, not substituted
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| RetrieverError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, mode: RetrievalMode) -> Result<Url, RetrieverError> {
        let path = match mode {
            RetrievalMode::DocumentGrounded => EXTRACT_PATH,
            RetrievalMode::Generative => GENERATE_PATH,
        };
        self.base_url
            .join(path)
            .map_err(|e| RetrieverError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl CandidateRetriever for HttpCandidateRetriever {
    async fn retrieve(
        &self,
        mode: RetrievalMode,
        request: &RetrievalRequest,
    ) -> Result<RetrievalResponse, RetrieverError> {
        let url = self.endpoint(mode)?;

        tracing::debug!(
            mode = mode.as_str(),
            url = %url,
            max_results = request.max_results,
            "Requesting candidate use cases"
        );

        let response = self.client.post(url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrieverError::UnexpectedStatus { status, body });
        }

        let parsed: RetrievalResponse = response
            .json()
            .await
            .map_err(|e| RetrieverError::ParseError(e.to_string()))?;

        tracing::debug!(
            mode = mode.as_str(),
            success = parsed.success,
            candidates = parsed.candidates.len(),
            "Candidate use cases received"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::config::RetrievalConfig;
    use crate::model::{CustomerContext, DefaultsConfig, IndustryRelevance};
    use crate::retriever::RetrievalAdapter;

    fn request() -> RetrievalRequest {
        RetrievalRequest {
            query_text: "Acme Corp manufacturing".to_string(),
            max_results: 5,
        }
    }

    #[tokio::test]
    async fn test_generate_posts_request_and_parses_candidates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/use-cases/generate")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "queryText": "Acme Corp manufacturing",
                "maxResults": 5
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"candidates":[{"title":"Predictive Maintenance","category":"maintenance","roi":"25%"}]}"#,
            )
            .create_async()
            .await;

        let retriever = HttpCandidateRetriever::new(&server.url()).unwrap();
        let response = retriever
            .retrieve(RetrievalMode::Generative, &request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.success);
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].category.as_deref(), Some("maintenance"));
    }

    #[tokio::test]
    async fn test_mistyped_candidate_fields_do_not_drop_the_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/use-cases/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"candidates":[
                    {"title":"Predictive Maintenance","category":"maintenance","industryRelevance":"Primary"},
                    {"title":"Demand Forecasting","category":"forecasting","popularity":4.5},
                    {"title":"Fraud Detection","category":"fraud"}
                ]}"#,
            )
            .create_async()
            .await;

        let retriever: Arc<dyn CandidateRetriever> =
            Arc::new(HttpCandidateRetriever::new(&server.url()).unwrap());
        let adapter = RetrievalAdapter::new(Some(retriever), &RetrievalConfig::default());
        let context =
            CustomerContext::fallback("Acme Corp", Some("manufacturing"), &DefaultsConfig::default());

        let candidates = adapter.generated_candidates(&context).await;

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].industry_relevance, Some(IndustryRelevance::Primary));
        assert_eq!(candidates[1].popularity, Some(5));
    }

    #[tokio::test]
    async fn test_extract_uses_document_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/use-cases/extract")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"candidates":[]}"#)
            .create_async()
            .await;

        let retriever = HttpCandidateRetriever::new(&format!("{}/", server.url())).unwrap();
        let response = retriever
            .retrieve(RetrievalMode::DocumentGrounded, &request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/use-cases/generate")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let retriever = HttpCandidateRetriever::new(&server.url()).unwrap();
        let result = retriever.retrieve(RetrievalMode::Generative, &request()).await;

        assert!(matches!(
            result,
            Err(RetrieverError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpCandidateRetriever::new("not a url"),
            Err(RetrieverError::InvalidUrl(_))
        ));
    }
}
