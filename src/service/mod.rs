pub mod analysis;
pub mod assembler;
pub mod cache;
pub mod compatibility;
pub mod matching;
pub mod ranking;
pub mod registry;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{AnalysisRequest, AnalysisService};
pub use assembler::UseCaseAssembler;
pub use cache::{CacheStats, ModuleCache};
pub use compatibility::{ModuleResolution, ModuleResolver, ModuleTable};
pub use ranking::{MergeOutcome, MergeSources, merge_and_rank};
pub use registry::{CustomerRegistry, CustomerStore};
