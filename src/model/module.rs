use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A platform module as loaded from the module table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Unique module code
    pub code: String,
    pub name: String,
    pub description: String,
    /// Minimum platform version, e.g. "22.1"
    pub min_version: String,
    pub capabilities: BTreeSet<String>,
    /// Unset constraint fields match every customer
    pub industry: Option<String>,
    pub release_version: Option<String>,
    pub base_version: Option<String>,
}

impl ModuleRecord {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// True when the module declares no industry, version or deployment constraint
    pub fn is_unconstrained(&self) -> bool {
        is_unset(&self.industry) && is_unset(&self.release_version) && is_unset(&self.base_version)
    }
}

pub(crate) fn is_unset(field: &Option<String>) -> bool {
    field.as_deref().map(str::trim).is_none_or(str::is_empty)
}

/// A module matched for a customer, with the outcome of each soft filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedModule {
    #[serde(flatten)]
    pub module: ModuleRecord,
    pub industry_match: bool,
    pub version_match: bool,
    pub deployment_match: bool,
}

/// Result of comparing the customer's version against the matched modules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    pub required_version: Option<String>,
    pub upgrade_needed: bool,
}

impl CompatibilityVerdict {
    /// Verdict when no module supports the capability
    pub fn unsupported() -> Self {
        Self {
            compatible: false,
            required_version: None,
            upgrade_needed: false,
        }
    }
}
