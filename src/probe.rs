//! Lookup of required executables on `PATH`.

use anyhow::{anyhow, Result};
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::notifier::Notifier;

/// Resolves `name` against the current process `PATH`.
///
/// A name that already contains a path separator is checked as-is.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    which::which(name).ok()
}

/// Resolves `name` against an explicit search path.
pub fn find_executable_in(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let cwd = env::current_dir().ok()?;
    which::which_in(name, Some(search_path), cwd).ok()
}

pub fn is_available(name: &str) -> bool {
    find_executable(name).is_some()
}

/// Returns the subset of `tools` that cannot be resolved, in the given order.
pub fn missing<'a>(tools: &[&'a str]) -> Vec<&'a str> {
    tools
        .iter()
        .copied()
        .filter(|tool| !is_available(tool))
        .collect()
}

/// Fails with every missing tool named when any of `tools` is not on `PATH`.
pub fn ensure_available(tools: &[&str], notifier: &Notifier) -> Result<()> {
    let missing = missing(tools);
    if !missing.is_empty() {
        return Err(anyhow!(
            "Required commands not found: {}. Make sure they are installed and on your PATH",
            missing.join(", ")
        ));
    }

    notifier.debug(&format!("All dependencies found: {}", tools.join(", ")));
    Ok(())
}
