//! In-memory doubles of the external stores used across unit tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::DbError;
use crate::model::{CandidateUseCase, CustomerRecord, ModuleRecord};
use crate::retriever::{
    CandidateRetriever, RetrievalMode, RetrievalRequest, RetrievalResponse, RetrieverError,
};
use crate::service::compatibility::ModuleTable;
use crate::service::registry::CustomerStore;

fn unavailable() -> DbError {
    DbError::Connection(sqlx::Error::PoolTimedOut)
}

pub fn module(code: &str, min_version: &str, capabilities: &[&str]) -> ModuleRecord {
    ModuleRecord {
        code: code.to_string(),
        name: format!("{} module", code),
        description: String::new(),
        min_version: min_version.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        industry: None,
        release_version: None,
        base_version: None,
    }
}

pub fn customer(name: &str, industry: &str, release_version: &str) -> CustomerRecord {
    CustomerRecord {
        name: name.to_string(),
        industry: Some(industry.to_string()),
        deployment_type: Some("Cloud".to_string()),
        release_version: Some(release_version.to_string()),
        base_version: Some("Cloud".to_string()),
        current_use_case_titles: Vec::new(),
    }
}

pub fn candidate(title: &str, category: &str) -> CandidateUseCase {
    CandidateUseCase {
        title: Some(title.to_string()),
        description: Some(format!("{} description", title)),
        category: Some(category.to_string()),
        ..Default::default()
    }
}

pub struct InMemoryModuleTable {
    modules: Vec<ModuleRecord>,
    fail: bool,
    filter_by_capability: bool,
    queries: AtomicUsize,
}

impl InMemoryModuleTable {
    pub fn new(modules: Vec<ModuleRecord>) -> Self {
        Self {
            modules,
            fail: false,
            filter_by_capability: true,
            queries: AtomicUsize::new(0),
        }
    }

    /// Table that returns every module whatever capability is asked for
    pub fn unfiltered(modules: Vec<ModuleRecord>) -> Self {
        Self {
            filter_by_capability: false,
            ..Self::new(modules)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModuleTable for InMemoryModuleTable {
    async fn modules_with_capability(
        &self,
        capability: &str,
    ) -> Result<Vec<ModuleRecord>, DbError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(unavailable());
        }
        Ok(self
            .modules
            .iter()
            .filter(|m| !self.filter_by_capability || m.has_capability(capability))
            .cloned()
            .collect())
    }
}

pub struct InMemoryCustomerStore {
    customers: Vec<CustomerRecord>,
    fail: bool,
}

impl InMemoryCustomerStore {
    pub fn new(customers: Vec<CustomerRecord>) -> Self {
        Self {
            customers,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            customers: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CustomerRecord>, DbError> {
        if self.fail {
            return Err(unavailable());
        }
        let wanted = name.to_lowercase();
        Ok(self
            .customers
            .iter()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn search_by_name(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<CustomerRecord>, DbError> {
        if self.fail {
            return Err(unavailable());
        }
        let wanted = fragment.to_lowercase();
        Ok(self
            .customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&wanted))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

/// Retriever answering from fixed candidate lists
#[derive(Default)]
pub struct StaticRetriever {
    documents: Vec<CandidateUseCase>,
    generated: Vec<CandidateUseCase>,
    unsuccessful: bool,
    fail: bool,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_documents(mut self, documents: Vec<CandidateUseCase>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_generated(mut self, generated: Vec<CandidateUseCase>) -> Self {
        self.generated = generated;
        self
    }

    pub fn unsuccessful(mut self) -> Self {
        self.unsuccessful = true;
        self
    }
}

#[async_trait]
impl CandidateRetriever for StaticRetriever {
    async fn retrieve(
        &self,
        mode: RetrievalMode,
        _request: &RetrievalRequest,
    ) -> Result<RetrievalResponse, RetrieverError> {
        if self.fail {
            return Err(RetrieverError::ParseError("connection reset".to_string()));
        }
        let candidates = match mode {
            RetrievalMode::DocumentGrounded => self.documents.clone(),
            RetrievalMode::Generative => self.generated.clone(),
        };
        Ok(RetrievalResponse {
            candidates,
            success: !self.unsuccessful,
        })
    }
}
