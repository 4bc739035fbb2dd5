//! Merge, dedup and rank of resolved use cases from all sources

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{DedupStrategy, RankOption, ResolvedUseCase};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number pattern"));

/// Resolved use cases grouped by source, highest merge priority first
#[derive(Debug, Clone, Default)]
pub struct MergeSources {
    pub registry_existing: Vec<ResolvedUseCase>,
    pub document_derived: Vec<ResolvedUseCase>,
    pub generated: Vec<ResolvedUseCase>,
}

impl MergeSources {
    pub fn len(&self) -> usize {
        self.registry_existing.len() + self.document_derived.len() + self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub use_cases: Vec<ResolvedUseCase>,
    pub duplicates_dropped: usize,
}

/// Concatenate in priority order and drop later duplicates of earlier items
pub fn merge(sources: MergeSources, dedup: DedupStrategy) -> MergeOutcome {
    let MergeSources {
        registry_existing,
        document_derived,
        generated,
    } = sources;

    let mut use_cases: Vec<ResolvedUseCase> = Vec::new();
    let mut duplicates_dropped = 0;

    for candidate in registry_existing
        .into_iter()
        .chain(document_derived)
        .chain(generated)
    {
        if let Some(kept) = use_cases
            .iter()
            .find(|kept| dedup.is_duplicate(&kept.title, &candidate.title))
        {
            tracing::debug!(
                dropped = %candidate.title,
                kept = %kept.title,
                "Dropping duplicate use case"
            );
            duplicates_dropped += 1;
            continue;
        }
        use_cases.push(candidate);
    }

    MergeOutcome {
        use_cases,
        duplicates_dropped,
    }
}

/// Stable reorder of a merged list
pub fn rank(use_cases: &mut [ResolvedUseCase], option: RankOption) {
    match option {
        RankOption::Relevance => {}
        RankOption::Roi => {
            use_cases.sort_by(|a, b| descending_missing_last(roi_value(a), roi_value(b)))
        }
        RankOption::Complexity => use_cases.sort_by_key(complexity_rank),
        RankOption::IndustryCount => {
            use_cases.sort_by_key(|u| std::cmp::Reverse(u.industries.len()))
        }
        RankOption::Popularity => {
            use_cases.sort_by_key(|u| std::cmp::Reverse(popularity(u)))
        }
    }
}

pub fn merge_and_rank(
    sources: MergeSources,
    option: RankOption,
    dedup: DedupStrategy,
) -> MergeOutcome {
    let mut outcome = merge(sources, dedup);
    rank(&mut outcome.use_cases, option);
    outcome
}

/// First number in the free-text ROI, e.g. 25 for "25% cost reduction"
pub fn roi_value(use_case: &ResolvedUseCase) -> Option<f64> {
    let roi = use_case.roi.as_deref()?.replace(',', "");
    NUMBER.find(&roi)?.as_str().parse().ok()
}

/// Low, Medium, High; anything else sorts after High
pub fn complexity_rank(use_case: &ResolvedUseCase) -> u8 {
    let label = use_case
        .implementation_complexity
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match label.split(|c: char| !c.is_alphabetic()).next() {
        Some("low") => 1,
        Some("medium") => 2,
        Some("high") => 3,
        _ => 4,
    }
}

/// Stand-in signal when the generator supplied none
pub fn popularity(use_case: &ResolvedUseCase) -> u32 {
    use_case.popularity.unwrap_or_else(|| {
        let derived = use_case.sources.len() + use_case.compatible_modules.len();
        u32::try_from(derived).unwrap_or(u32::MAX)
    })
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
