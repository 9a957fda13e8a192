use crate::application::ports::post_repository::PostRepository;
use crate::domain::pagination::{PER_PAGE, Page};
use crate::domain::posts::Post;

pub struct ListPosts<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> ListPosts<'a, R> {
    pub async fn execute(&self, page: i64) -> anyhow::Result<Page<Post>> {
        let (items, total) = self.repo.list_recent(page.max(1), PER_PAGE).await?;
        Ok(Page::new(items, page, PER_PAGE, total))
    }
}
