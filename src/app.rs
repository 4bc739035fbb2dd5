//! Application state and service initialization
//!
//! Wires the PostgreSQL stores, the optional module cache and the retrieval
//! client into an [`AnalysisService`].

use std::sync::Arc;

use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::repository::{CustomerRepository, ModuleRepository};
use crate::model::Config;
use crate::retriever::{CandidateRetriever, HttpCandidateRetriever, RetrievalAdapter};
use crate::service::{
    AnalysisService, CustomerRegistry, CustomerStore, ModuleCache, ModuleResolver, ModuleTable,
    UseCaseAssembler,
};

/// Install the global `tracing` subscriber
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Calling this more than
/// once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub struct AppState {
    pub db_pool: Arc<PgPool>,
    /// Module cache (optional, disabled by a zero TTL)
    pub module_cache: Option<ModuleCache>,
    pub analysis_service: Arc<AnalysisService>,
}

impl AppState {
    /// Connect to the database and build the analysis pipeline
    ///
    /// The retrieval service is optional; without `USECASE_RETRIEVAL_URL`
    /// only registry use cases are resolved.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let module_cache = ModuleCache::from_config(&config.cache);

        let retriever: Option<Arc<dyn CandidateRetriever>> = match config.retrieval.base_url {
            Some(ref url) => {
                let client = HttpCandidateRetriever::new(url)
                    .map_err(|_| AppError::InvalidConfig("Invalid USECASE_RETRIEVAL_URL"))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let analysis_service = Arc::new(build_analysis_service(
            Arc::new(CustomerRepository::new(db_pool.clone())),
            Arc::new(ModuleRepository::new(db_pool.clone())),
            retriever,
            module_cache.clone(),
            &config,
        ));

        Ok(Self {
            db_pool: Arc::new(db_pool),
            module_cache,
            analysis_service,
        })
    }
}

/// Assemble the pipeline from its external collaborators
pub fn build_analysis_service(
    customers: Arc<dyn CustomerStore>,
    modules: Arc<dyn ModuleTable>,
    retriever: Option<Arc<dyn CandidateRetriever>>,
    module_cache: Option<ModuleCache>,
    config: &Config,
) -> AnalysisService {
    let registry = CustomerRegistry::new(customers, config.defaults.clone(), &config.registry);
    let retrieval = RetrievalAdapter::new(retriever, &config.retrieval);
    let resolver = ModuleResolver::new(
        modules,
        module_cache,
        config.compatibility.soft_filter_policy,
        config.compatibility.fallback_version,
    );

    AnalysisService::new(
        registry,
        retrieval,
        UseCaseAssembler::new(Arc::new(resolver)),
        config.ranking.dedup,
    )
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
