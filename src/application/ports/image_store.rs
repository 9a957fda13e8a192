use async_trait::async_trait;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Constrain to the profile bounding box and persist; returns the stored
    /// (randomized) filename.
    async fn store_profile_image(
        &self,
        bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String>;
    /// Same, with the post bounding box.
    async fn store_post_image(
        &self,
        bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String>;
}
