use crate::application::ports::post_repository::PostRepository;
use crate::domain::pagination::{PER_PAGE, Page};
use crate::domain::posts::Post;

/// Location browse: a tag matches a post's city or its university.
pub struct TagPosts<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> TagPosts<'a, R> {
    pub async fn execute(&self, tag: &str, page: i64) -> anyhow::Result<Page<Post>> {
        let (items, total) = self.repo.list_by_tag(tag, page.max(1), PER_PAGE).await?;
        Ok(Page::new(items, page, PER_PAGE, total))
    }
}
