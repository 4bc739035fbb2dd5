use std::sync::Arc;

use crate::model::config::RetrievalConfig;
use crate::model::{CandidateUseCase, CustomerContext, Provenance};

use super::{CandidateRetriever, RetrievalMode, RetrievalRequest};

/// Pipeline-facing side of the retrieval service
///
/// Whatever the service returns, callers get a bounded list of candidates
/// with provenance set. Document candidates are only kept while they still
/// cite a source at or above the similarity threshold. Transport errors and
/// `success: false` both degrade to an empty list.
pub struct RetrievalAdapter {
    retriever: Option<Arc<dyn CandidateRetriever>>,
    similarity_threshold: f64,
    document_max_results: usize,
    generated_max_results: usize,
}

impl RetrievalAdapter {
    pub fn new(retriever: Option<Arc<dyn CandidateRetriever>>, config: &RetrievalConfig) -> Self {
        if retriever.is_none() {
            tracing::warn!("No retrieval service configured, only registry use cases will be resolved");
        }

        Self {
            retriever,
            similarity_threshold: config.similarity_threshold,
            document_max_results: config.document_max_results,
            generated_max_results: config.generated_max_results,
        }
    }

    pub fn is_available(&self) -> bool {
        self.retriever.is_some()
    }

    /// Query text sent to the service for a customer
    pub fn query_text(context: &CustomerContext) -> String {
        format!("{} {} AI use cases", context.name, context.industry)
    }

    pub async fn document_candidates(&self, context: &CustomerContext) -> Vec<CandidateUseCase> {
        let raw = self
            .fetch(RetrievalMode::DocumentGrounded, context, self.document_max_results)
            .await;

        let threshold = self.similarity_threshold;
        let received = raw.len();
        let grounded: Vec<CandidateUseCase> = raw
            .into_iter()
            .filter_map(|mut candidate| {
                candidate
                    .sources
                    .retain(|source| source.similarity_score >= threshold);
                if candidate.sources.is_empty() {
                    return None;
                }
                candidate.provenance = Provenance::Document;
                Some(candidate)
            })
            .take(self.document_max_results)
            .collect();

        if grounded.len() < received {
            tracing::debug!(
                received,
                kept = grounded.len(),
                threshold,
                "Dropped document candidates without a source above threshold"
            );
        }

        grounded
    }

    pub async fn generated_candidates(&self, context: &CustomerContext) -> Vec<CandidateUseCase> {
        let mut candidates = self
            .fetch(RetrievalMode::Generative, context, self.generated_max_results)
            .await;

        candidates.truncate(self.generated_max_results);
        for candidate in &mut candidates {
            candidate.provenance = Provenance::Generated;
        }
        candidates
    }

    async fn fetch(
        &self,
        mode: RetrievalMode,
        context: &CustomerContext,
        max_results: usize,
    ) -> Vec<CandidateUseCase> {
        let Some(retriever) = &self.retriever else {
            return Vec::new();
        };

        let request = RetrievalRequest {
            query_text: Self::query_text(context),
            max_results,
        };

        match retriever.retrieve(mode, &request).await {
            Ok(response) if response.success => response.candidates,
            Ok(_) => {
                tracing::warn!(
                    mode = mode.as_str(),
                    company = %context.name,
                    "Retrieval service reported failure, using no candidates"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    mode = mode.as_str(),
                    company = %context.name,
                    error = %e,
                    "Retrieval request failed, using no candidates"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefaultsConfig, SourceRef};
    use crate::service::test_support::{StaticRetriever, candidate};

    fn context() -> CustomerContext {
        CustomerContext::fallback("Acme Corp", Some("manufacturing"), &DefaultsConfig::default())
    }

    fn sourced(title: &str, scores: &[f64]) -> CandidateUseCase {
        CandidateUseCase {
            sources: scores
                .iter()
                .enumerate()
                .map(|(i, score)| SourceRef {
                    file_name: format!("doc-{}.pdf", i),
                    similarity_score: *score,
                })
                .collect(),
            ..candidate(title, "maintenance")
        }
    }

    fn adapter(retriever: StaticRetriever) -> RetrievalAdapter {
        RetrievalAdapter::new(Some(Arc::new(retriever)), &RetrievalConfig::default())
    }

    #[test]
    fn test_query_text() {
        assert_eq!(
            RetrievalAdapter::query_text(&context()),
            "Acme Corp manufacturing AI use cases"
        );
    }

    #[tokio::test]
    async fn test_document_candidates_below_threshold_are_dropped() {
        let retriever = StaticRetriever::new()
            .with_documents(vec![sourced("Weak", &[0.4, 0.69]), sourced("Strong", &[0.5, 0.91])]);
        let candidates = adapter(retriever).document_candidates(&context()).await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title.as_deref(), Some("Strong"));
        assert_eq!(candidates[0].sources.len(), 1);
        assert!(candidates[0].sources[0].similarity_score >= 0.7);
        assert_eq!(candidates[0].provenance, Provenance::Document);
    }

    #[tokio::test]
    async fn test_no_hits_above_threshold_returns_empty() {
        let retriever = StaticRetriever::new()
            .with_documents(vec![sourced("A", &[0.1]), sourced("B", &[]), sourced("C", &[0.69])]);
        let candidates = adapter(retriever).document_candidates(&context()).await;

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_generated_candidates_are_bounded() {
        let generated = (0..8).map(|i| candidate(&format!("Idea {}", i), "chatbot")).collect();
        let retriever = StaticRetriever::new().with_generated(generated);
        let candidates = adapter(retriever).generated_candidates(&context()).await;

        assert_eq!(candidates.len(), 5);
        assert!(candidates.iter().all(|c| c.provenance == Provenance::Generated));
    }

    #[tokio::test]
    async fn test_unsuccessful_response_is_empty() {
        let retriever = StaticRetriever::new()
            .with_generated(vec![candidate("Idea", "chatbot")])
            .unsuccessful();
        let candidates = adapter(retriever).generated_candidates(&context()).await;

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_empty() {
        let candidates = adapter(StaticRetriever::failing())
            .document_candidates(&context())
            .await;

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_without_retriever() {
        let adapter = RetrievalAdapter::new(None, &RetrievalConfig::default());

        assert!(!adapter.is_available());
        assert!(adapter.generated_candidates(&context()).await.is_empty());
    }
}
