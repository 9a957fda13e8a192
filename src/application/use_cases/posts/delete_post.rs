use uuid::Uuid;

use crate::application::ports::post_repository::PostRepository;
use crate::application::use_cases::posts::update_post::PostAccessError;

pub struct DeletePost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> DeletePost<'a, R> {
    /// Stored image files are left on disk; only the record goes away.
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), PostAccessError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(PostAccessError::NotFound)?;
        if existing.user_id != user_id {
            return Err(PostAccessError::Forbidden);
        }
        if !self.repo.delete_post(id).await? {
            return Err(PostAccessError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryPostRepo, post_fixture, user_fixture};

    #[tokio::test]
    async fn the_author_can_delete() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        let post = repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));
        let uc = DeletePost { repo: &repo };
        uc.execute(post.id, author.id).await.unwrap();
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn a_non_author_is_forbidden_and_the_post_survives() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        let stranger = user_fixture("mallory");
        let post = repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));
        let uc = DeletePost { repo: &repo };
        let err = uc.execute(post.id, stranger.id).await.unwrap_err();
        assert!(matches!(err, PostAccessError::Forbidden));
        assert!(repo.find_by_id(post.id).await.unwrap().is_some());
    }
}
