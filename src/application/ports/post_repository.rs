use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::posts::{NewPost, Post, PostUpdate, SearchFilter, SearchOrder};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, user_id: Uuid, post: &NewPost) -> anyhow::Result<Post>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    /// Text fields only; the image list is fixed at creation time.
    async fn update_post(&self, id: Uuid, update: &PostUpdate) -> anyhow::Result<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool>;

    /// All posts, newest first. Returns the page plus the unpaged total.
    async fn list_recent(&self, page: i64, per_page: i64) -> anyhow::Result<(Vec<Post>, i64)>;
    /// The newest `limit` posts.
    async fn list_latest(&self, limit: i64) -> anyhow::Result<Vec<Post>>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)>;
    /// Posts whose city or univ equals `tag`, newest first.
    async fn list_by_tag(
        &self,
        tag: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)>;
    async fn search(
        &self,
        filter: &SearchFilter,
        order: SearchOrder,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)>;
}
