use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::User;

pub struct GetAccount<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetAccount<'a, R> {
    pub async fn execute(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.repo.find_by_id(id).await
    }
}
