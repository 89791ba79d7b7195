use anyhow::{Context, Result};

use super::{parse_image_list, run_command, ImageEngine, IMAGE_LIST_FORMAT};
use crate::pipeline::CommandSpec;

const DOCKER: &str = "docker";

/// Docker implementation of the ImageEngine trait
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEngine for DockerEngine {
    fn name(&self) -> &str {
        "docker"
    }

    fn program(&self) -> &str {
        DOCKER
    }

    fn list_images(&self) -> Result<Vec<String>> {
        let stdout = run_command(DOCKER, &["images", "--format", IMAGE_LIST_FORMAT])
            .context("Failed to list Docker images")?;
        Ok(parse_image_list(&stdout))
    }

    fn save_command(&self, image_ref: &str) -> CommandSpec {
        CommandSpec::new(DOCKER).args(["save", image_ref])
    }

    fn load_command(&self) -> CommandSpec {
        CommandSpec::new(DOCKER).arg("load")
    }
}
