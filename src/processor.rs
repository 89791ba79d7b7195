//! Batch save/load orchestration.
//!
//! [`ArchiveProcessor`] drives one [`ImageEngine`] and one [`Compressor`] over a batch:
//! - [`ArchiveProcessor::save`] lists local images, keeps those carrying a tag, and streams
//!   each through `<engine> save <ref> | <compress> > <dir>/<name>.tag.gz`.
//! - [`ArchiveProcessor::load`] finds `*.tag.gz` files in a directory and streams each
//!   through `<decompress> <file> | <engine> load`.
//!
//! Items run one after another. A failed item is logged and recorded in the
//! [`BatchReport`]; it never stops the rest of the batch. Only setup problems (listing
//! images, creating or reading the directory) are returned as errors.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::compressor::Compressor;
use crate::engines::ImageEngine;
use crate::naming;
use crate::notifier::Notifier;
use crate::pipeline::Pipeline;

/// Outcome of one batch, in processing order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempted() == 0
    }
}

pub struct ArchiveProcessor<'a, E: ImageEngine> {
    engine: E,
    compressor: Compressor,
    notifier: &'a Notifier,
}

impl<'a, E: ImageEngine> ArchiveProcessor<'a, E> {
    /// The compressor is fixed for the lifetime of the processor, so every item in every
    /// batch uses the same pair.
    pub fn new(engine: E, compressor: Compressor, notifier: &'a Notifier) -> Self {
        Self {
            engine,
            compressor,
            notifier,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// Save every local image tagged `tag` into `output_dir`.
    ///
    /// # Errors
    /// - The engine fails to list images.
    /// - `output_dir` cannot be created.
    ///
    /// Individual save failures are reported in the returned [`BatchReport`].
    pub fn save(&self, tag: &str, output_dir: &Path) -> Result<BatchReport> {
        self.notifier
            .info(&format!("Looking for images tagged '{}'", tag));

        let all_images = self.engine.list_images()?;
        self.notifier.debug(&format!(
            "{} lists {} image(s)",
            self.engine.name(),
            all_images.len()
        ));
        self.notifier.trace(&format!("{:?}", all_images));

        let images = naming::filter_by_tag(&all_images, tag);
        if images.is_empty() {
            self.notifier
                .warn(&format!("No images found with tag '{}'", tag));
            return Ok(BatchReport::default());
        }

        self.notifier
            .info(&format!("Found {} image(s) to save", images.len()));

        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let mut report = BatchReport::default();
        for image in images {
            let archive = output_dir.join(naming::archive_file_name(image));
            self.notifier
                .info(&format!("Saving {} -> {}", image, archive.display()));

            let pipeline = Pipeline::new(
                self.engine.save_command(image),
                self.compressor.compress_command(),
            )
            .to_file(&archive);
            self.notifier.debug(&format!("Running: {}", pipeline));

            match pipeline.run() {
                Ok(_) => report.succeeded.push(image.to_string()),
                Err(e) => {
                    self.notifier
                        .error(&format!("Failed to save {}: {:#}", image, e));
                    report.failed.push(image.to_string());
                }
            }
        }

        self.notifier.info(&format!(
            "Save finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        ));
        Ok(report)
    }

    /// Load every `*.tag.gz` archive in `input_dir`.
    ///
    /// # Errors
    /// `input_dir` exists but cannot be read. A missing directory is treated as empty.
    ///
    /// Individual load failures are reported in the returned [`BatchReport`].
    pub fn load(&self, input_dir: &Path) -> Result<BatchReport> {
        let archives = find_archives(input_dir)?;
        if archives.is_empty() {
            self.notifier.warn(&format!(
                "No '*{}' files found in '{}'",
                naming::ARCHIVE_SUFFIX,
                input_dir.display()
            ));
            return Ok(BatchReport::default());
        }

        self.notifier
            .info(&format!("Found {} archive(s) to load", archives.len()));

        let mut report = BatchReport::default();
        for archive in archives {
            let label = archive.display().to_string();
            self.notifier.info(&format!("Loading {}", label));

            let pipeline = Pipeline::new(
                self.compressor.decompress_command(&archive),
                self.engine.load_command(),
            );
            self.notifier.debug(&format!("Running: {}", pipeline));

            match pipeline.run() {
                Ok(output) => {
                    if !output.stdout.is_empty() {
                        self.notifier.debug(&output.stdout);
                    }
                    report.succeeded.push(label);
                }
                Err(e) => {
                    self.notifier
                        .error(&format!("Failed to load {}: {:#}", label, e));
                    report.failed.push(label);
                }
            }
        }

        self.notifier.info(&format!(
            "Load finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        ));
        Ok(report)
    }
}

/// Regular files in `dir` matching `*.tag.gz`, sorted by path.
pub fn find_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read input directory {}", dir.display()))
        }
    };

    // `dir` may not be valid UTF-8, so only entry names go through the pattern
    let pattern = naming::archive_pattern()?;
    let mut archives = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read input directory {}", dir.display()))?;
        let name = entry.file_name();
        let is_archive = name
            .to_str()
            .map(|name| pattern.matches_with(name, naming::ARCHIVE_MATCH_OPTIONS))
            .unwrap_or(false);
        // Follows symlinks, like a shell glob would
        if is_archive && entry.path().is_file() {
            archives.push(entry.path());
        }
    }

    archives.sort();
    Ok(archives)
}
