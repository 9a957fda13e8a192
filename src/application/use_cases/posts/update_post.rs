use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::post_repository::PostRepository;
use crate::domain::posts::{Post, PostUpdate};

pub struct UpdatePost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Error)]
pub enum PostAccessError {
    #[error("post not found")]
    NotFound,
    #[error("only the author may do that")]
    Forbidden,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<'a, R: PostRepository + ?Sized> UpdatePost<'a, R> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: PostUpdate,
    ) -> Result<Post, PostAccessError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(PostAccessError::NotFound)?;
        if existing.user_id != user_id {
            return Err(PostAccessError::Forbidden);
        }
        self.repo
            .update_post(id, &update)
            .await?
            .ok_or(PostAccessError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryPostRepo, post_fixture, user_fixture};

    fn update() -> PostUpdate {
        PostUpdate {
            title: "Updated title".into(),
            story: "Updated story".into(),
            univ: "KU".into(),
            city: "Leuven".into(),
            cost_per_person: 45,
        }
    }

    #[tokio::test]
    async fn the_author_can_edit() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        let post = repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));
        let uc = UpdatePost { repo: &repo };
        let updated = uc.execute(post.id, author.id, update()).await.unwrap();
        assert_eq!(updated.title, "Updated title");
        assert_eq!(updated.city, "Leuven");
        // The image list is not part of an update.
        assert_eq!(updated.images, post.images);
    }

    #[tokio::test]
    async fn a_non_author_is_forbidden() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        let stranger = user_fixture("mallory");
        let post = repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));
        let uc = UpdatePost { repo: &repo };
        let err = uc.execute(post.id, stranger.id, update()).await.unwrap_err();
        assert!(matches!(err, PostAccessError::Forbidden));
    }

    #[tokio::test]
    async fn an_unknown_post_is_not_found() {
        let repo = MemoryPostRepo::default();
        let uc = UpdatePost { repo: &repo };
        let err = uc
            .execute(Uuid::new_v4(), Uuid::new_v4(), update())
            .await
            .unwrap_err();
        assert!(matches!(err, PostAccessError::NotFound));
    }
}
