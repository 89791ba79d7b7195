use anyhow::{Context, Result};

use super::{parse_image_list, run_command, ImageEngine, IMAGE_LIST_FORMAT};
use crate::pipeline::CommandSpec;

const NERDCTL: &str = "nerdctl";

/// nerdctl (containerd) implementation of the ImageEngine trait.
/// Its `images`, `save` and `load` subcommands mirror Docker's.
pub struct NerdctlEngine;

impl NerdctlEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NerdctlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEngine for NerdctlEngine {
    fn name(&self) -> &str {
        "nerdctl"
    }

    fn program(&self) -> &str {
        NERDCTL
    }

    fn list_images(&self) -> Result<Vec<String>> {
        let stdout = run_command(NERDCTL, &["images", "--format", IMAGE_LIST_FORMAT])
            .context("Failed to list nerdctl images")?;
        Ok(parse_image_list(&stdout))
    }

    fn save_command(&self, image_ref: &str) -> CommandSpec {
        CommandSpec::new(NERDCTL).args(["save", image_ref])
    }

    fn load_command(&self) -> CommandSpec {
        CommandSpec::new(NERDCTL).arg("load")
    }
}
