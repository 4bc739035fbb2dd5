//! Exportable result of one analysis run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CustomerContext, RankOption, ResolvedUseCase};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub existing: usize,
    pub compatible: usize,
    pub upgrade_needed: usize,
    /// Candidates dropped for lack of module coverage
    pub dropped_without_coverage: usize,
    /// Candidates removed as duplicates during merge
    pub dropped_as_duplicate: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company: String,
    pub context: CustomerContext,
    /// Whether the customer was found in the registry
    pub registry_match: bool,
    pub rank: RankOption,
    pub use_cases: Vec<ResolvedUseCase>,
    pub summary: ReportSummary,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
