use std::path::Path;

use crate::notifier::Notifier;
use crate::pipeline::CommandSpec;
use crate::probe;

pub const PARALLEL_COMPRESSOR: &str = "pigz";
pub const FALLBACK_COMPRESSOR: &str = "gzip";

/// The compress/decompress command pair used for a whole run.
///
/// `compress` reads stdin and writes the compressed stream to stdout. `decompress` takes
/// the archive path as its final argument and writes the raw stream to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressor {
    name: String,
    compress: CommandSpec,
    decompress: CommandSpec,
}

impl Compressor {
    pub fn new(name: impl Into<String>, compress: CommandSpec, decompress: CommandSpec) -> Self {
        Self {
            name: name.into(),
            compress,
            decompress,
        }
    }

    pub fn pigz() -> Self {
        Self::new(
            PARALLEL_COMPRESSOR,
            CommandSpec::new("pigz"),
            CommandSpec::new("pigz").arg("-dc"),
        )
    }

    pub fn gzip() -> Self {
        Self::new(
            FALLBACK_COMPRESSOR,
            CommandSpec::new("gzip"),
            CommandSpec::new("gunzip").arg("-c"),
        )
    }

    /// Picks `pigz` when it is on `PATH`, `gzip` otherwise.
    pub fn detect(notifier: &Notifier) -> Self {
        Self::select(probe::is_available, notifier)
    }

    pub fn select<F>(is_available: F, notifier: &Notifier) -> Self
    where
        F: Fn(&str) -> bool,
    {
        if is_available(PARALLEL_COMPRESSOR) {
            notifier.info("Found 'pigz' (parallel gzip), using it for compression and decompression");
            Self::pigz()
        } else {
            notifier.warn("'pigz' not found, falling back to 'gzip' (slower)");
            Self::gzip()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compress_command(&self) -> CommandSpec {
        self.compress.clone()
    }

    /// Decompression command reading `archive`.
    pub fn decompress_command(&self, archive: &Path) -> CommandSpec {
        self.decompress.clone().arg(archive)
    }

    pub fn compress_program(&self) -> &str {
        self.compress.program()
    }

    pub fn decompress_program(&self) -> &str {
        self.decompress.program()
    }
}
