pub mod orchestrator;

pub use orchestrator::IndexingService;
