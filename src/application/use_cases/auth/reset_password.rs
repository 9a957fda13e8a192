use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;

pub struct ResetPassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ResetPassword<'a, R> {
    /// Re-hashes and stores the new password; `false` when the token's
    /// subject no longer exists.
    pub async fn execute(&self, user_id: Uuid, new_password: &str) -> anyhow::Result<bool> {
        let hash = Argon2::default()
            .hash_password(new_password.as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        self.repo.update_password(user_id, &hash).await
    }
}
