//! Turns raw candidates into resolved use cases
//!
//! Module coverage is the only rejection criterion: a candidate whose
//! normalized category resolves to no module is dropped, whatever its
//! provenance. Missing text is defaulted, never rejected.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::model::{
    AnnotatedModule, CandidateUseCase, CompatibilityVerdict, CustomerContext, Provenance,
    ResolvedUseCase,
};
use crate::service::compatibility::{ModuleResolution, ModuleResolver};
use crate::service::matching::is_existing_title;
use crate::service::taxonomy;

const DEFAULT_TITLE: &str = "Use Case";
const DEFAULT_DESCRIPTION: &str = "TBD";
const IMPLEMENTATION_READY: &str = "Compatible";
const IMPLEMENTATION_UPGRADE: &str = "Upgrade Required";
const TIMELINE_READY: &str = "Ready for Implementation";

pub struct UseCaseAssembler {
    resolver: Arc<ModuleResolver>,
}

impl UseCaseAssembler {
    pub fn new(resolver: Arc<ModuleResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve every candidate against the module table for this customer
    ///
    /// Candidates are resolved concurrently; the result lists existing use
    /// cases first and otherwise keeps input order.
    pub async fn assemble(
        &self,
        candidates: Vec<CandidateUseCase>,
        context: &CustomerContext,
    ) -> Vec<ResolvedUseCase> {
        let received = candidates.len();
        let futures = candidates
            .into_iter()
            .map(|candidate| self.resolve_candidate(candidate, context));

        let mut resolved: Vec<ResolvedUseCase> =
            join_all(futures).await.into_iter().flatten().collect();

        resolved.sort_by_key(|use_case| !use_case.is_existing);

        tracing::debug!(
            company = %context.name,
            received,
            resolved = resolved.len(),
            "Assembled use cases"
        );

        resolved
    }

    /// Registry "current use cases" go through the same coverage check
    pub async fn assemble_registry_titles(&self, context: &CustomerContext) -> Vec<ResolvedUseCase> {
        let candidates = context
            .current_use_case_titles
            .iter()
            .filter(|title| !title.trim().is_empty())
            .map(|title| CandidateUseCase::from_registry_title(title))
            .collect();
        self.assemble(candidates, context).await
    }

    async fn resolve_candidate(
        &self,
        candidate: CandidateUseCase,
        context: &CustomerContext,
    ) -> Option<ResolvedUseCase> {
        let category = candidate
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(candidate.title.as_deref())
            .unwrap_or_default()
            .to_string();
        let normalized_category = taxonomy::normalize(&category);

        let resolution = self
            .resolver
            .resolve_modules(&normalized_category, context)
            .await;

        if resolution.modules.is_empty() {
            tracing::debug!(
                title = ?candidate.title,
                category = %normalized_category,
                provenance = ?candidate.provenance,
                "Dropping use case without module coverage"
            );
            return None;
        }

        let draft = Draft {
            category,
            normalized_category,
            resolution,
        };

        Some(match candidate.provenance {
            Provenance::Document => from_document(candidate, draft, context),
            Provenance::Generated => from_generated(candidate, draft, context),
            Provenance::Registry => from_registry(candidate, draft),
        })
    }
}

struct Draft {
    category: String,
    normalized_category: String,
    resolution: ModuleResolution,
}

/// Document candidates keep the excerpts they were grounded on
fn from_document(
    candidate: CandidateUseCase,
    draft: Draft,
    context: &CustomerContext,
) -> ResolvedUseCase {
    let mut resolved = build(candidate, draft);
    resolved.is_existing = is_existing_title(&resolved.title, &context.current_use_case_titles);
    resolved
}

/// Generated candidates carry no grounding, so any cited sources are discarded
fn from_generated(
    mut candidate: CandidateUseCase,
    draft: Draft,
    context: &CustomerContext,
) -> ResolvedUseCase {
    candidate.sources.clear();
    let mut resolved = build(candidate, draft);
    resolved.is_existing = is_existing_title(&resolved.title, &context.current_use_case_titles);
    resolved
}

/// Registry titles are by definition already in use
fn from_registry(candidate: CandidateUseCase, draft: Draft) -> ResolvedUseCase {
    let mut resolved = build(candidate, draft);
    resolved.is_existing = true;
    resolved
}

fn build(candidate: CandidateUseCase, draft: Draft) -> ResolvedUseCase {
    let Draft {
        category,
        normalized_category,
        resolution,
    } = draft;
    let verdict = resolution.verdict;

    let industries = collect_industries(&candidate, &resolution.modules);

    ResolvedUseCase {
        title: text_or(candidate.title, DEFAULT_TITLE),
        description: text_or(candidate.description, DEFAULT_DESCRIPTION),
        category,
        normalized_category,
        roi: candidate.roi,
        implementation_complexity: candidate.implementation_complexity,
        implementation: candidate
            .implementation
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_implementation(&verdict)),
        timeline: candidate
            .timeline
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_timeline(&verdict)),
        provenance: candidate.provenance,
        sources: candidate.sources,
        industries,
        popularity: candidate.popularity,
        compatible_modules: resolution.modules,
        compatibility_verdict: verdict,
        is_existing: false,
        industry_relevance: candidate.industry_relevance.unwrap_or_default(),
    }
}

fn text_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn default_implementation(verdict: &CompatibilityVerdict) -> String {
    if verdict.upgrade_needed {
        IMPLEMENTATION_UPGRADE.to_string()
    } else {
        IMPLEMENTATION_READY.to_string()
    }
}

fn default_timeline(verdict: &CompatibilityVerdict) -> String {
    match (&verdict.required_version, verdict.upgrade_needed) {
        (Some(required), true) => format!("Upgrade to {} Required", required),
        (None, true) => IMPLEMENTATION_UPGRADE.to_string(),
        _ => TIMELINE_READY.to_string(),
    }
}

/// Distinct industries named by the candidate or its supporting modules
fn collect_industries(candidate: &CandidateUseCase, modules: &[AnnotatedModule]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    candidate
        .industries
        .iter()
        .map(String::as_str)
        .chain(modules.iter().filter_map(|m| m.module.industry.as_deref()))
        .map(str::trim)
        .filter(|industry| !industry.is_empty())
        .filter(|industry| seen.insert(industry.to_lowercase()))
        .map(str::to_string)
        .collect()
}
