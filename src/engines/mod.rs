use anyhow::{anyhow, Context, Result};
use std::process::Command;

pub mod docker;
pub mod engine;
pub mod nerdctl;

pub use docker::DockerEngine;
pub use engine::ImageEngine;
pub use nerdctl::NerdctlEngine;

/// `--format` template that makes `images` print one `repository:tag` per line.
pub const IMAGE_LIST_FORMAT: &str = "{{.Repository}}:{{.Tag}}";

/// Runs `program args...` to completion and returns its stdout.
/// A non-zero exit becomes an error carrying the command's stderr.
pub(crate) fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute {} command: {:?}", program, args))?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "'{} {}' failed ({}): {}",
            program,
            args.join(" "),
            output.status,
            error.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Splits lister output into references, dropping blank lines.
pub(crate) fn parse_image_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
