use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::image_store::ImageStore;
use crate::application::ports::user_repository::{UniqueViolation, UserRepository};
use crate::domain::users::User;

pub struct UpdateAccount<'a, R, S>
where
    R: UserRepository + ?Sized,
    S: ImageStore + ?Sized,
{
    pub repo: &'a R,
    pub images: &'a S,
}

#[derive(Debug, Clone)]
pub struct UpdateAccountRequest {
    pub username: String,
    pub email: String,
    /// Raw upload bytes plus the browser-supplied filename, when a new
    /// profile picture was attached.
    pub picture: Option<(Vec<u8>, Option<String>)>,
}

#[derive(Debug, Error)]
pub enum UpdateAccountError {
    #[error("account not found")]
    NotFound,
    #[error("That email is taken. Please choose a different one.")]
    EmailTaken,
    #[error("That username is taken. Please choose a different one.")]
    UsernameTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<'a, R, S> UpdateAccount<'a, R, S>
where
    R: UserRepository + ?Sized,
    S: ImageStore + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        req: UpdateAccountRequest,
    ) -> Result<User, UpdateAccountError> {
        if let Some(existing) = self.repo.find_by_email(&req.email).await? {
            if existing.id != user_id {
                return Err(UpdateAccountError::EmailTaken);
            }
        }
        if let Some(existing) = self.repo.find_by_username(&req.username).await? {
            if existing.id != user_id {
                return Err(UpdateAccountError::UsernameTaken);
            }
        }

        let image_file = match req.picture {
            Some((bytes, orig)) => Some(
                self.images
                    .store_profile_image(bytes, orig.as_deref())
                    .await?,
            ),
            None => None,
        };

        // The pre-checks above race with concurrent writes; the update itself
        // is the authority on uniqueness.
        let user = self
            .repo
            .update_profile(user_id, &req.username, &req.email, image_file.as_deref())
            .await
            .map_err(|err| match err.downcast_ref::<UniqueViolation>() {
                Some(UniqueViolation::Email) => UpdateAccountError::EmailTaken,
                Some(UniqueViolation::Username) => UpdateAccountError::UsernameTaken,
                None => UpdateAccountError::Other(err),
            })?
            .ok_or(UpdateAccountError::NotFound)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryImageStore, MemoryUserRepo, StaleLookupRepo};
    use crate::application::use_cases::auth::register::{Register, RegisterRequest};

    async fn seed(repo: &MemoryUserRepo, username: &str, email: &str) -> User {
        Register { repo }
            .execute(&RegisterRequest {
                username: username.into(),
                email: email.into(),
                password: "hunter2secret".into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn keeping_your_own_email_is_not_a_conflict() {
        let repo = MemoryUserRepo::default();
        let images = MemoryImageStore::default();
        let user = seed(&repo, "corey", "corey@example.com").await;
        let uc = UpdateAccount {
            repo: &repo,
            images: &images,
        };
        let updated = uc
            .execute(
                user.id,
                UpdateAccountRequest {
                    username: "corey_s".into(),
                    email: "corey@example.com".into(),
                    picture: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "corey_s");
        assert_eq!(updated.image_file, "default.jpg");
    }

    #[tokio::test]
    async fn another_users_email_is_a_conflict() {
        let repo = MemoryUserRepo::default();
        let images = MemoryImageStore::default();
        seed(&repo, "corey", "corey@example.com").await;
        let other = seed(&repo, "dana", "dana@example.com").await;
        let uc = UpdateAccount {
            repo: &repo,
            images: &images,
        };
        let err = uc
            .execute(
                other.id,
                UpdateAccountRequest {
                    username: "dana".into(),
                    email: "corey@example.com".into(),
                    picture: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateAccountError::EmailTaken));
    }

    #[tokio::test]
    async fn a_duplicate_landing_after_the_pre_check_is_still_a_conflict() {
        let inner = MemoryUserRepo::default();
        let images = MemoryImageStore::default();
        seed(&inner, "corey", "corey@example.com").await;
        let dana = seed(&inner, "dana", "dana@example.com").await;
        // Lookups miss, so only the update itself can catch the duplicate.
        let repo = StaleLookupRepo(inner);
        let uc = UpdateAccount {
            repo: &repo,
            images: &images,
        };
        let err = uc
            .execute(
                dana.id,
                UpdateAccountRequest {
                    username: "dana".into(),
                    email: "corey@example.com".into(),
                    picture: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateAccountError::EmailTaken));
    }

    #[tokio::test]
    async fn attaching_a_picture_replaces_the_profile_image() {
        let repo = MemoryUserRepo::default();
        let images = MemoryImageStore::default();
        let user = seed(&repo, "corey", "corey@example.com").await;
        let uc = UpdateAccount {
            repo: &repo,
            images: &images,
        };
        let updated = uc
            .execute(
                user.id,
                UpdateAccountRequest {
                    username: "corey".into(),
                    email: "corey@example.com".into(),
                    picture: Some((vec![1, 2, 3], Some("me.png".into()))),
                },
            )
            .await
            .unwrap();
        assert_ne!(updated.image_file, "default.jpg");
        assert!(updated.image_file.ends_with(".png"));
    }
}
