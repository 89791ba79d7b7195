//! Common utilities for integration tests

use anyhow::{anyhow, Result};
use std::process::Command;
use tagpack::{ArchiveProcessor, Compressor, ImageEngine, Notifier};
use tempfile::TempDir;

/// Small public image used across engine tests
#[allow(dead_code)]
pub const TEST_IMAGE: &str = "hello-world:latest";

/// Tag that no local image should carry
#[allow(dead_code)]
pub const UNUSED_TAG: &str = "this-tag-definitely-does-not-exist";

/// Makes sure `image` is present locally
#[allow(dead_code)]
pub fn pull(program: &str, image: &str) -> Result<()> {
    let status = Command::new(program).args(["pull", image]).status()?;
    if !status.success() {
        return Err(anyhow!("{} pull {} failed", program, image));
    }
    Ok(())
}

/// Saves every `tag` image with `engine`, loads the archives back, and checks both
/// batches completed without failures.
#[allow(dead_code)]
pub fn save_and_load<E: ImageEngine>(engine: E, tag: &str) -> Result<()> {
    let archives = TempDir::new()?;
    let notifier = Notifier::new(1, None)?;
    let compressor = Compressor::detect(&notifier);
    let processor = ArchiveProcessor::new(engine, compressor, &notifier);

    let saved = processor.save(tag, archives.path())?;
    assert!(!saved.succeeded.is_empty(), "Should save at least one image");
    assert!(saved.failed.is_empty(), "No save should fail: {:?}", saved);

    for image in &saved.succeeded {
        let archive = archives
            .path()
            .join(tagpack::naming::archive_file_name(image));
        let size = std::fs::metadata(&archive)?.len();
        assert!(size > 0, "Archive {} should not be empty", archive.display());
    }

    let loaded = processor.load(archives.path())?;
    assert_eq!(loaded.succeeded.len(), saved.succeeded.len());
    assert!(loaded.failed.is_empty(), "No load should fail: {:?}", loaded);

    Ok(())
}
