//! Docker integration tests
//!
//! Saves and reloads a real image through `docker save | pigz` (or gzip).

#[cfg(all(test, feature = "docker"))]
mod tests {
    use crate::integration::common::*;
    use tagpack::{ArchiveProcessor, Compressor, DockerEngine, ImageEngine, Notifier};
    use tempfile::TempDir;

    #[test]
    fn test_docker_lists_images() {
        pull("docker", TEST_IMAGE).expect("Should pull test image");

        let images = DockerEngine::new()
            .list_images()
            .expect("Should list Docker images");
        assert!(
            images.iter().any(|image| image == TEST_IMAGE),
            "{} should be listed: {:?}",
            TEST_IMAGE,
            images
        );
    }

    #[test]
    fn test_docker_save_and_load() {
        pull("docker", TEST_IMAGE).expect("Should pull test image");
        save_and_load(DockerEngine::new(), "latest").expect("Docker round trip should succeed");
    }

    #[test]
    fn test_docker_save_unused_tag() {
        let out = TempDir::new().unwrap();
        let notifier = Notifier::new(0, None).unwrap();
        let processor =
            ArchiveProcessor::new(DockerEngine::new(), Compressor::detect(&notifier), &notifier);

        let report = processor
            .save(UNUSED_TAG, &out.path().join("archives"))
            .expect("No matches is not an error");
        assert!(report.is_empty());
        assert!(!out.path().join("archives").exists());
    }
}
