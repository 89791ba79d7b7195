//! nerdctl integration tests

#[cfg(all(test, feature = "nerdctl"))]
mod tests {
    use crate::integration::common::*;
    use tagpack::{ImageEngine, NerdctlEngine};

    #[test]
    fn test_nerdctl_lists_images() {
        pull("nerdctl", TEST_IMAGE).expect("Should pull test image");

        let images = NerdctlEngine::new()
            .list_images()
            .expect("Should list nerdctl images");
        assert!(images.iter().any(|image| image.ends_with(":latest")));
    }

    #[test]
    fn test_nerdctl_save_and_load() {
        pull("nerdctl", TEST_IMAGE).expect("Should pull test image");
        save_and_load(NerdctlEngine::new(), "latest").expect("nerdctl round trip should succeed");
    }
}
