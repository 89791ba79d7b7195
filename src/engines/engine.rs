use anyhow::Result;

use crate::pipeline::CommandSpec;

/// Image-management CLI that can list, dump and load images
pub trait ImageEngine {
    /// Returns the engine name for identification purposes
    fn name(&self) -> &str;

    /// Executable that must be on `PATH` for this engine to work
    fn program(&self) -> &str;

    /// Lists every local image as a `repository:tag` reference, in the engine's order
    fn list_images(&self) -> Result<Vec<String>>;

    /// Command that writes `image_ref` as a byte stream to stdout
    fn save_command(&self, image_ref: &str) -> CommandSpec;

    /// Command that loads an image from a byte stream on stdin
    fn load_command(&self) -> CommandSpec;
}
