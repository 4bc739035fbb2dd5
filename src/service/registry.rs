//! Customer registry lookup
//!
//! Exact (case-insensitive) match first, then the first of a handful of
//! substring matches in store order. There is no confidence scoring; a
//! substring hit is accepted as-is.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::DbError;
use crate::model::config::RegistryConfig;
use crate::model::{CustomerContext, CustomerRecord, DefaultsConfig};

/// External customer record store
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Case-insensitive exact match on the company name
    async fn find_by_name(&self, name: &str) -> Result<Option<CustomerRecord>, DbError>;

    /// Case-insensitive substring match, at most `limit` records in store order
    async fn search_by_name(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<CustomerRecord>, DbError>;
}

pub struct CustomerRegistry {
    store: Arc<dyn CustomerStore>,
    defaults: DefaultsConfig,
    candidate_limit: i64,
}

impl CustomerRegistry {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        defaults: DefaultsConfig,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            store,
            defaults,
            candidate_limit: config.candidate_limit.max(1),
        }
    }

    /// Find the registry record for a company
    ///
    /// Store failures are logged and reported as not found.
    pub async fn lookup(&self, company_name: &str) -> Option<CustomerRecord> {
        let name = company_name.trim();
        if name.is_empty() {
            return None;
        }

        match self.store.find_by_name(name).await {
            Ok(Some(record)) => {
                tracing::debug!(company = %name, "Exact registry match");
                return Some(record);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(company = %name, error = %e, "Registry exact lookup failed");
                return None;
            }
        }

        match self.store.search_by_name(name, self.candidate_limit).await {
            Ok(records) => {
                let first = records.into_iter().next();
                if let Some(ref record) = first {
                    tracing::debug!(
                        company = %name,
                        matched = %record.name,
                        "Partial registry match"
                    );
                }
                first
            }
            Err(e) => {
                tracing::warn!(company = %name, error = %e, "Registry substring lookup failed");
                None
            }
        }
    }

    /// Resolve a company to its customer context, or `None` when unknown
    pub async fn resolve(
        &self,
        company_name: &str,
        fallback_industry: Option<&str>,
    ) -> Option<CustomerContext> {
        self.lookup(company_name)
            .await
            .map(|record| CustomerContext::from_record(record, fallback_industry, &self.defaults))
    }

    /// Resolve a company, falling back to caller-supplied defaults when unknown
    ///
    /// The flag reports whether the registry had the customer.
    pub async fn resolve_or_fallback(
        &self,
        company_name: &str,
        fallback_industry: Option<&str>,
    ) -> (CustomerContext, bool) {
        match self.resolve(company_name, fallback_industry).await {
            Some(context) => (context, true),
            None => {
                tracing::info!(company = %company_name.trim(), "Customer not in registry, using defaults");
                (
                    CustomerContext::fallback(company_name, fallback_industry, &self.defaults),
                    false,
                )
            }
        }
    }
}
