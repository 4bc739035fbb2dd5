//! Module compatibility resolution
//!
//! The capability tag is the only hard gate: a module without it is never
//! returned. Industry, release version and deployment are soft filters whose
//! combination is decided by the configured [`SoftFilterPolicy`].

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::db::DbError;
use crate::model::{
    AnnotatedModule, CompatibilityVerdict, CustomerContext, ModuleRecord, SoftFilterPolicy,
    is_unset,
};
use crate::service::cache::ModuleCache;

static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[vV]?(\d+(?:\.\d+)?)").expect("valid version pattern"));

/// External module table
#[async_trait]
pub trait ModuleTable: Send + Sync {
    /// Modules whose capability set contains `capability`
    async fn modules_with_capability(&self, capability: &str)
    -> Result<Vec<ModuleRecord>, DbError>;
}

/// Modules supporting a capability for one customer, plus the verdict
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleResolution {
    pub modules: Vec<AnnotatedModule>,
    pub verdict: CompatibilityVerdict,
}

impl ModuleResolution {
    fn unsupported() -> Self {
        Self {
            modules: Vec::new(),
            verdict: CompatibilityVerdict::unsupported(),
        }
    }
}

pub struct ModuleResolver {
    table: Arc<dyn ModuleTable>,
    cache: Option<ModuleCache>,
    policy: SoftFilterPolicy,
    fallback_version: f64,
}

impl ModuleResolver {
    pub fn new(
        table: Arc<dyn ModuleTable>,
        cache: Option<ModuleCache>,
        policy: SoftFilterPolicy,
        fallback_version: f64,
    ) -> Self {
        Self {
            table,
            cache,
            policy,
            fallback_version,
        }
    }

    /// Resolve the modules supporting `capability` for the given customer
    ///
    /// Table failures degrade to "no modules", which the assembler treats as
    /// no coverage.
    pub async fn resolve_modules(
        &self,
        capability: &str,
        context: &CustomerContext,
    ) -> ModuleResolution {
        if capability.trim().is_empty() {
            return ModuleResolution::unsupported();
        }

        let candidates = match self.load_modules(capability).await {
            Some(modules) => modules,
            None => return ModuleResolution::unsupported(),
        };

        let mut modules: Vec<AnnotatedModule> = candidates
            .iter()
            .filter(|m| m.has_capability(capability))
            .map(|m| annotate(m, context))
            .filter(|m| m.module.is_unconstrained() || self.admits(m))
            .collect();

        if modules.is_empty() {
            tracing::debug!(
                capability = %capability,
                industry = %context.industry,
                "No compatible modules for capability"
            );
            return ModuleResolution::unsupported();
        }

        // Explicit industry matches first; sort is stable so ties keep table order
        modules.sort_by_key(|m| !explicit_industry_match(&m.module, &context.industry));

        let verdict = compute_verdict(
            modules.iter().map(|m| &m.module),
            &context.release_version,
            self.fallback_version,
        );

        tracing::debug!(
            capability = %capability,
            module_count = modules.len(),
            compatible = verdict.compatible,
            required_version = ?verdict.required_version,
            "Resolved modules for capability"
        );

        ModuleResolution { modules, verdict }
    }

    fn admits(&self, module: &AnnotatedModule) -> bool {
        self.policy.admits(
            module.industry_match,
            module.version_match,
            module.deployment_match,
        )
    }

    async fn load_modules(&self, capability: &str) -> Option<Arc<Vec<ModuleRecord>>> {
        if let Some(ref cache) = self.cache
            && let Some(modules) = cache.get(capability).await
        {
            tracing::debug!(capability = %capability, "Module cache hit");
            return Some(modules);
        }

        match self.table.modules_with_capability(capability).await {
            Ok(modules) => {
                if let Some(ref cache) = self.cache {
                    cache.insert(capability, modules.clone()).await;
                }
                Some(Arc::new(modules))
            }
            Err(e) => {
                tracing::warn!(
                    capability = %capability,
                    error = %e,
                    "Module table query failed, treating capability as unsupported"
                );
                None
            }
        }
    }
}

/// Evaluate each soft filter; an unset module field matches everything
fn annotate(module: &ModuleRecord, context: &CustomerContext) -> AnnotatedModule {
    let industry_match = field_matches(&module.industry, &[&context.industry]);
    let version_match = field_matches(&module.release_version, &[&context.release_version]);
    let deployment_match = field_matches(
        &module.base_version,
        &[&context.base_version, context.deployment_type.as_str()],
    );

    AnnotatedModule {
        module: module.clone(),
        industry_match,
        version_match,
        deployment_match,
    }
}

fn field_matches(field: &Option<String>, accepted: &[&str]) -> bool {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => {
            accepted.iter().any(|a| a.trim().eq_ignore_ascii_case(value))
        }
        _ => true,
    }
}

fn explicit_industry_match(module: &ModuleRecord, industry: &str) -> bool {
    !is_unset(&module.industry) && field_matches(&module.industry, &[industry])
}

/// Leading `major.minor` of a version string, if there is one
pub fn parse_version(text: &str) -> Option<f64> {
    VERSION_PREFIX
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Customer's numeric version, or `fallback` when it has no numeric prefix
pub fn customer_version(release_version: &str, fallback: f64) -> f64 {
    parse_version(release_version).unwrap_or(fallback)
}

/// Compare the customer's version with the lowest module minimum
///
/// Modules whose `min_version` does not parse impose no requirement. With
/// no modules at all the verdict is never "compatible".
pub fn compute_verdict<'a>(
    modules: impl IntoIterator<Item = &'a ModuleRecord>,
    release_version: &str,
    fallback: f64,
) -> CompatibilityVerdict {
    let mut any_module = false;
    let mut required: Option<(f64, &str)> = None;

    for module in modules {
        any_module = true;
        if let Some(min) = parse_version(&module.min_version)
            && required.is_none_or(|(current, _)| min < current)
        {
            required = Some((min, module.min_version.trim()));
        }
    }

    if !any_module {
        return CompatibilityVerdict::unsupported();
    }

    let current = customer_version(release_version, fallback);

    match required {
        Some((min, text)) => {
            let compatible = current >= min;
            CompatibilityVerdict {
                compatible,
                required_version: Some(text.to_string()),
                upgrade_needed: !compatible,
            }
        }
        None => CompatibilityVerdict {
            compatible: true,
            required_version: None,
            upgrade_needed: false,
        },
    }
}
