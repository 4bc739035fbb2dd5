use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{AnnotatedModule, CompatibilityVerdict};

/// Where a candidate use case came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Extracted from uploaded documents above the similarity threshold
    Document,
    /// Suggested by the generator, no grounding guarantee
    #[default]
    Generated,
    /// Listed as a current use case in the customer registry
    Registry,
}

impl FromStr for Provenance {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "documents" => Ok(Provenance::Document),
            "generated" => Ok(Provenance::Generated),
            "registry" => Ok(Provenance::Registry),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// Document chunk a candidate was extracted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub file_name: String,
    /// Similarity in [0, 1]
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryRelevance {
    #[default]
    Primary,
    Secondary,
    Tertiary,
}

impl FromStr for IndustryRelevance {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(IndustryRelevance::Primary),
            "secondary" => Ok(IndustryRelevance::Secondary),
            "tertiary" => Ok(IndustryRelevance::Tertiary),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown label: {0}")]
pub struct UnknownLabel(pub String);

/// Unverified use case as returned by retrieval or generation
///
/// Every field is optional on the wire and read leniently: a value of the
/// wrong type or an unknown label becomes "absent" (or the default) instead
/// of failing the candidate. Missing text is defaulted during assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateUseCase {
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub roi: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub implementation_complexity: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub implementation: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub timeline: Option<String>,
    #[serde(deserialize_with = "lenient::label")]
    pub industry_relevance: Option<IndustryRelevance>,
    #[serde(deserialize_with = "lenient::strings")]
    pub industries: Vec<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub popularity: Option<u32>,
    #[serde(deserialize_with = "lenient::provenance")]
    pub provenance: Provenance,
    /// Unreadable entries are skipped, so they never count as grounding
    #[serde(deserialize_with = "lenient::sources")]
    pub sources: Vec<SourceRef>,
}

mod lenient {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Provenance, SourceRef};

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Case-insensitive enum label; unknown labels are absent
    pub fn label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn provenance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Provenance, D::Error> {
        label(deserializer).map(Option::unwrap_or_default)
    }

    /// Non-negative number (or numeric string), rounded to the nearest integer
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let number = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round().min(f64::from(u32::MAX)) as u32))
    }

    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }

    pub fn sources<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SourceRef>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

impl CandidateUseCase {
    /// Candidate for a registry "current use case", which is only a title
    ///
    /// The title doubles as the category so it goes through the same
    /// normalization and module resolution as any other candidate.
    pub fn from_registry_title(title: &str) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            category: Some(title.trim().to_string()),
            provenance: Provenance::Registry,
            ..Default::default()
        }
    }
}

/// A candidate that passed module-coverage filtering
///
/// Never constructed with an empty `compatible_modules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUseCase {
    pub title: String,
    pub description: String,
    pub category: String,
    pub normalized_category: String,
    pub roi: Option<String>,
    pub implementation_complexity: Option<String>,
    pub implementation: String,
    pub timeline: String,
    pub provenance: Provenance,
    pub sources: Vec<SourceRef>,
    pub industries: Vec<String>,
    pub popularity: Option<u32>,
    pub compatible_modules: Vec<AnnotatedModule>,
    pub compatibility_verdict: CompatibilityVerdict,
    pub is_existing: bool,
    pub industry_relevance: IndustryRelevance,
}

/// Ordering applied to the merged list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankOption {
    /// Keep merge order
    #[default]
    Relevance,
    Roi,
    Complexity,
    IndustryCount,
    Popularity,
}

impl RankOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankOption::Relevance => "relevance",
            RankOption::Roi => "roi",
            RankOption::Complexity => "complexity",
            RankOption::IndustryCount => "industry-count",
            RankOption::Popularity => "popularity",
        }
    }
}

impl fmt::Display for RankOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown rank option: {0}")]
pub struct UnknownRankOption(pub String);

impl FromStr for RankOption {
    type Err = UnknownRankOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(RankOption::Relevance),
            "roi" => Ok(RankOption::Roi),
            "complexity" => Ok(RankOption::Complexity),
            "industry-count" | "industry_count" | "industries" => Ok(RankOption::IndustryCount),
            "popularity" => Ok(RankOption::Popularity),
            other => Err(UnknownRankOption(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_deserializes_with_missing_fields() {
        let json = r#"{"title":"Demand Forecasting","sources":[{"fileName":"plan.pdf","similarityScore":0.82}]}"#;
        let candidate: CandidateUseCase = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.title.as_deref(), Some("Demand Forecasting"));
        assert!(candidate.description.is_none());
        assert_eq!(candidate.provenance, Provenance::Generated);
        assert_eq!(candidate.sources[0].file_name, "plan.pdf");
    }

    #[test]
    fn test_candidate_with_mistyped_fields_keeps_the_rest() {
        let json = r#"{
            "title": "Predictive Maintenance",
            "category": "maintenance",
            "roi": 25,
            "industryRelevance": "Primary",
            "popularity": 4.5,
            "provenance": "Generated",
            "industries": ["energy", 3],
            "sources": [{"fileName": "a.pdf", "similarityScore": 0.9}, {"fileName": 7}]
        }"#;
        let candidate: CandidateUseCase = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.title.as_deref(), Some("Predictive Maintenance"));
        assert_eq!(candidate.roi.as_deref(), Some("25"));
        assert_eq!(candidate.industry_relevance, Some(IndustryRelevance::Primary));
        assert_eq!(candidate.popularity, Some(5));
        assert_eq!(candidate.provenance, Provenance::Generated);
        assert_eq!(candidate.industries, vec!["energy"]);
        assert_eq!(candidate.sources.len(), 1);
    }

    #[test]
    fn test_unknown_labels_and_bad_numbers_become_absent() {
        let json = r#"{
            "title": null,
            "industryRelevance": "quaternary",
            "popularity": -3,
            "provenance": {"kind": "document"},
            "sources": "a.pdf"
        }"#;
        let candidate: CandidateUseCase = serde_json::from_str(json).unwrap();

        assert!(candidate.title.is_none());
        assert!(candidate.industry_relevance.is_none());
        assert!(candidate.popularity.is_none());
        assert_eq!(candidate.provenance, Provenance::Generated);
        assert!(candidate.sources.is_empty());
    }

    #[test]
    fn test_rank_option_parse() {
        assert_eq!("industry-count".parse::<RankOption>().unwrap(), RankOption::IndustryCount);
        assert_eq!("ROI".parse::<RankOption>().unwrap(), RankOption::Roi);
        assert!("alphabetical".parse::<RankOption>().is_err());
    }

    #[test]
    fn test_registry_candidate_uses_title_as_category() {
        let candidate = CandidateUseCase::from_registry_title(" Predictive Maintenance ");
        assert_eq!(candidate.category.as_deref(), Some("Predictive Maintenance"));
        assert_eq!(candidate.provenance, Provenance::Registry);
    }
}
