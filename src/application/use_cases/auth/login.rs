use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::User;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// `None` covers both an unknown email and a wrong password.
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<User>> {
        let row = match self.repo.find_by_email(&req.email).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let hash = row.password_hash.clone().unwrap_or_default();
        let parsed = match PasswordHash::new(&hash) {
            Ok(p) => p,
            // An unparseable stored hash counts as a failed login.
            Err(_) => return Ok(None),
        };
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(User {
                password_hash: None,
                ..row
            }))
        } else {
            Ok(None)
        }
    }
}
