//! End-to-end analysis of one company
//!
//! registry lookup -> retrieval -> assembly -> merge & rank. Every stage
//! degrades on its own, so a report is always produced.

use chrono::Utc;

use crate::model::{AnalysisReport, DedupStrategy, RankOption, ReportSummary, ResolvedUseCase};
use crate::retriever::RetrievalAdapter;
use crate::service::assembler::UseCaseAssembler;
use crate::service::ranking::{MergeSources, merge_and_rank};
use crate::service::registry::CustomerRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub company_name: String,
    /// Industry to assume when the registry does not know the company
    pub fallback_industry: Option<String>,
    pub rank: RankOption,
    /// Also ask the generator for ungrounded suggestions
    pub include_generated: bool,
}

impl AnalysisRequest {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            fallback_industry: None,
            rank: RankOption::default(),
            include_generated: true,
        }
    }

    pub fn with_fallback_industry(mut self, industry: impl Into<String>) -> Self {
        self.fallback_industry = Some(industry.into());
        self
    }

    pub fn with_rank(mut self, rank: RankOption) -> Self {
        self.rank = rank;
        self
    }

    pub fn without_generated(mut self) -> Self {
        self.include_generated = false;
        self
    }
}

pub struct AnalysisService {
    registry: CustomerRegistry,
    retrieval: RetrievalAdapter,
    assembler: UseCaseAssembler,
    dedup: DedupStrategy,
}

impl AnalysisService {
    pub fn new(
        registry: CustomerRegistry,
        retrieval: RetrievalAdapter,
        assembler: UseCaseAssembler,
        dedup: DedupStrategy,
    ) -> Self {
        Self {
            registry,
            retrieval,
            assembler,
            dedup,
        }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        let (context, registry_match) = self
            .registry
            .resolve_or_fallback(&request.company_name, request.fallback_industry.as_deref())
            .await;

        let (documents, generated) = if request.include_generated {
            tokio::join!(
                self.retrieval.document_candidates(&context),
                self.retrieval.generated_candidates(&context)
            )
        } else {
            (self.retrieval.document_candidates(&context).await, Vec::new())
        };

        let received = context
            .current_use_case_titles
            .iter()
            .filter(|t| !t.trim().is_empty())
            .count()
            + documents.len()
            + generated.len();

        let (registry_existing, document_derived, generated) = tokio::join!(
            self.assembler.assemble_registry_titles(&context),
            self.assembler.assemble(documents, &context),
            self.assembler.assemble(generated, &context)
        );

        let sources = MergeSources {
            registry_existing,
            document_derived,
            generated,
        };
        let dropped_without_coverage = received.saturating_sub(sources.len());

        let outcome = merge_and_rank(sources, request.rank, self.dedup);
        let summary = summarize(
            &outcome.use_cases,
            dropped_without_coverage,
            outcome.duplicates_dropped,
        );

        tracing::info!(
            company = %context.name,
            registry_match,
            rank = %request.rank,
            total = summary.total,
            dropped_without_coverage,
            dropped_as_duplicate = summary.dropped_as_duplicate,
            "Analysis complete"
        );

        AnalysisReport {
            company: request.company_name.trim().to_string(),
            context,
            registry_match,
            rank: request.rank,
            use_cases: outcome.use_cases,
            summary,
            generated_at: Utc::now(),
        }
    }
}

fn summarize(
    use_cases: &[ResolvedUseCase],
    dropped_without_coverage: usize,
    dropped_as_duplicate: usize,
) -> ReportSummary {
    ReportSummary {
        total: use_cases.len(),
        existing: use_cases.iter().filter(|u| u.is_existing).count(),
        compatible: use_cases
            .iter()
            .filter(|u| u.compatibility_verdict.compatible)
            .count(),
        upgrade_needed: use_cases
            .iter()
            .filter(|u| u.compatibility_verdict.upgrade_needed)
            .count(),
        dropped_without_coverage,
        dropped_as_duplicate,
    }
}
