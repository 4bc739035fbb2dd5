use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::service::matching::{first_token_overlap, jaro_winkler_similar};

const ENV_CONFIG_PATH: &str = "USECASE_ADVISOR_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const ENV_RETRIEVAL_URL: &str = "USECASE_RETRIEVAL_URL";

/// Baseline used when the registry has no (or incomplete) data for a customer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub release_version: String,
    pub base_version: String,
    pub industry: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            release_version: "22.1".to_string(),
            base_version: "Cloud".to_string(),
            industry: "general".to_string(),
        }
    }
}

/// How the industry, version and deployment soft filters combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftFilterPolicy {
    /// A module passes if any soft filter matches
    #[default]
    Any,
    /// A module passes only if every soft filter matches
    All,
}

impl SoftFilterPolicy {
    /// Decide whether a module passes given each filter's outcome
    ///
    /// Unset module fields already count as matches, so an unconstrained
    /// module passes under both policies.
    pub fn admits(&self, industry: bool, version: bool, deployment: bool) -> bool {
        match self {
            SoftFilterPolicy::Any => industry || version || deployment,
            SoftFilterPolicy::All => industry && version && deployment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompatibilityConfig {
    pub soft_filter_policy: SoftFilterPolicy,
    /// Customer version assumed when the release version has no numeric prefix
    pub fallback_version: f64,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            soft_filter_policy: SoftFilterPolicy::Any,
            fallback_version: 22.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Base URL of the retrieval/generation service
    pub base_url: Option<String>,
    /// Minimum similarity for a document excerpt to ground a candidate
    pub similarity_threshold: f64,
    pub document_max_results: usize,
    /// Upper bound on generated suggestions
    pub generated_max_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            similarity_threshold: 0.7,
            document_max_results: 10,
            generated_max_results: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Substring matches fetched before taking the first
    pub candidate_limit: i64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { candidate_limit: 5 }
    }
}

/// Title comparison used to drop duplicates during merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Either title's first word occurs inside the other title
    #[default]
    FirstTokenOverlap,
    /// Jaro-Winkler similarity of the lowercased titles at or above `threshold`
    JaroWinkler { threshold: f64 },
}

impl DedupStrategy {
    pub fn is_duplicate(&self, a: &str, b: &str) -> bool {
        match self {
            DedupStrategy::FirstTokenOverlap => first_token_overlap(a, b),
            DedupStrategy::JaroWinkler { threshold } => jaro_winkler_similar(a, b, *threshold),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub dedup: DedupStrategy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub module_ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            module_ttl_seconds: 3600,
            max_capacity: 10_000,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub compatibility: CompatibilityConfig,
    pub retrieval: RetrievalConfig,
    pub registry: RegistryConfig,
    pub ranking: RankingConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the config file, then apply environment overrides
    pub fn from_env() -> Self {
        // Load .env file if present (ignore if missing)
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::load_config_file(&config_path).unwrap_or_default();

        if let Ok(url) = std::env::var(ENV_RETRIEVAL_URL) {
            config.retrieval.base_url = Some(url);
        }

        config
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<Config> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_yaml_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration from file");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }
}
