pub mod compressor;
pub mod engines;
pub mod naming;
pub mod notifier;
pub mod pipeline;
pub mod probe;
pub mod processor;

// Re-exports for easy access
pub use compressor::Compressor;
pub use engines::{DockerEngine, ImageEngine, NerdctlEngine};
pub use notifier::Notifier;
pub use pipeline::{CommandSpec, Pipeline};
pub use processor::{ArchiveProcessor, BatchReport};
