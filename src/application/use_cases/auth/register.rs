use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;
use thiserror::Error;

use crate::application::ports::user_repository::{UniqueViolation, UserRepository};
use crate::domain::users::User;

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("That email is taken. Please choose a different one.")]
    EmailTaken,
    #[error("That username is taken. Please choose a different one.")]
    UsernameTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<User, RegisterError> {
        if self.repo.find_by_email(&req.email).await?.is_some() {
            return Err(RegisterError::EmailTaken);
        }
        if self.repo.find_by_username(&req.username).await?.is_some() {
            return Err(RegisterError::UsernameTaken);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        // The pre-checks above race with concurrent inserts; the write itself
        // is the authority on uniqueness.
        match self.repo.create_user(&req.username, &req.email, &hash).await {
            Ok(user) => Ok(user),
            Err(err) => Err(match err.downcast_ref::<UniqueViolation>() {
                Some(UniqueViolation::Email) => RegisterError::EmailTaken,
                Some(UniqueViolation::Username) => RegisterError::UsernameTaken,
                None => RegisterError::Other(err),
            }),
        }
    }
}
