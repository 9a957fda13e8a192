use uuid::Uuid;

use crate::application::ports::post_repository::PostRepository;
use crate::domain::posts::Post;

pub struct GetPost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> GetPost<'a, R> {
    pub async fn execute(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        self.repo.find_by_id(id).await
    }
}
