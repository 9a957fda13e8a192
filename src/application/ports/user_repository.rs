use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::users::User;

/// Marker a repository attaches (inside the `anyhow` chain) when a write
/// trips a uniqueness constraint. Use-case pre-checks race with concurrent
/// writers; callers downcast to this to report a conflict instead of a
/// server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UniqueViolation {
    #[error("email already in use")]
    Email,
    #[error("username already in use")]
    Username,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Update profile fields; `image_file` is left untouched when `None`.
    async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        image_file: Option<&str>,
    ) -> anyhow::Result<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
}
