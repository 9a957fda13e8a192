use crate::application::ports::post_repository::PostRepository;
use crate::domain::pagination::{PER_PAGE, Page};
use crate::domain::posts::Post;

/// The five newest posts, regardless of how many pages the full feed has.
pub const LATEST_WINDOW: i64 = 5;

pub struct LatestPosts<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> LatestPosts<'a, R> {
    pub async fn execute(&self, page: i64) -> anyhow::Result<Page<Post>> {
        let window = self.repo.list_latest(LATEST_WINDOW).await?;
        Ok(Page::from_vec(window, page, PER_PAGE))
    }
}
