//! Use-case resolution for sales enablement
//!
//! Given a company name, resolves the customer context, gathers candidate AI
//! use cases from documents and a generator, keeps only those backed by a
//! platform module, and returns a deduplicated, ranked list annotated with
//! module compatibility.

pub mod app;
pub mod db;
pub mod model;
pub mod retriever;
pub mod service;

pub use model::{AnalysisReport, Config, RankOption};
pub use service::{AnalysisRequest, AnalysisService};
