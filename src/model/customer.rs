//! Customer registry records and the resolved customer context

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::config::DefaultsConfig;

/// How the customer runs the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentType {
    Cloud,
    Remote,
    Unknown,
}

impl DeploymentType {
    /// Parse a free-text deployment label; anything unrecognised is `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cloud" | "saas" => DeploymentType::Cloud,
            "remote" | "on-premise" | "on-prem" | "onprem" => DeploymentType::Remote,
            _ => DeploymentType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Cloud => "cloud",
            DeploymentType::Remote => "remote",
            DeploymentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer as stored in the external registry
///
/// Version fields may be missing or blank in the store; they are only
/// defaulted when the record is turned into a [`CustomerContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub industry: Option<String>,
    pub deployment_type: Option<String>,
    pub release_version: Option<String>,
    pub base_version: Option<String>,
    #[serde(default)]
    pub current_use_case_titles: Vec<String>,
}

/// Read-only customer context shared by every downstream stage of one analysis
///
/// `release_version` and `base_version` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerContext {
    pub name: String,
    pub industry: String,
    pub deployment_type: DeploymentType,
    pub release_version: String,
    pub base_version: String,
    pub current_use_case_titles: Vec<String>,
}

impl CustomerContext {
    /// Build a context from a registry record, filling blanks from the defaults
    pub fn from_record(
        record: CustomerRecord,
        fallback_industry: Option<&str>,
        defaults: &DefaultsConfig,
    ) -> Self {
        let industry = non_blank(record.industry)
            .or_else(|| fallback_industry.and_then(|i| non_blank(Some(i.to_string()))))
            .unwrap_or_else(|| defaults.industry.clone());

        let deployment_type = record
            .deployment_type
            .as_deref()
            .map(DeploymentType::parse)
            .unwrap_or(DeploymentType::Unknown);

        Self {
            name: record.name,
            industry,
            deployment_type,
            release_version: non_blank(record.release_version)
                .unwrap_or_else(|| defaults.release_version.clone()),
            base_version: non_blank(record.base_version)
                .unwrap_or_else(|| defaults.base_version.clone()),
            current_use_case_titles: record
                .current_use_case_titles
                .into_iter()
                .filter(|t| !t.trim().is_empty())
                .collect(),
        }
    }

    /// Context for a company the registry does not know
    ///
    /// Industry comes from the caller (typically an external classifier);
    /// versions come from the configured baseline.
    pub fn fallback(
        company_name: &str,
        fallback_industry: Option<&str>,
        defaults: &DefaultsConfig,
    ) -> Self {
        let industry = fallback_industry
            .and_then(|i| non_blank(Some(i.to_string())))
            .unwrap_or_else(|| defaults.industry.clone());

        Self {
            name: company_name.trim().to_string(),
            industry,
            deployment_type: DeploymentType::parse(&defaults.base_version),
            release_version: defaults.release_version.clone(),
            base_version: defaults.base_version.clone(),
            current_use_case_titles: Vec::new(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
