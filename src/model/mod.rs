pub mod config;
mod customer;
mod module;
mod report;
mod usecase;

pub use config::{Config, DedupStrategy, DefaultsConfig, SoftFilterPolicy};
pub use customer::{CustomerContext, CustomerRecord, DeploymentType};
pub(crate) use module::is_unset;
pub use module::{AnnotatedModule, CompatibilityVerdict, ModuleRecord};
pub use report::{AnalysisReport, ReportSummary};
pub use usecase::{
    CandidateUseCase, IndustryRelevance, Provenance, RankOption, ResolvedUseCase, SourceRef,
    UnknownLabel, UnknownRankOption,
};
