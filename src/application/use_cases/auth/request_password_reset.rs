use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;

pub struct RequestPasswordReset<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub mailer: &'a M,
}

impl<'a, R, M> RequestPasswordReset<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    /// Looks up the account and mails the caller-built reset link. The
    /// acknowledgment is uniform: an unknown email is not an error, so the
    /// endpoint cannot be used to probe for accounts.
    pub async fn execute<F>(&self, email: &str, reset_url_for: F) -> anyhow::Result<()>
    where
        F: FnOnce(&crate::domain::users::User) -> anyhow::Result<String> + Send,
    {
        let user = match self.repo.find_by_email(email).await? {
            Some(u) => u,
            None => {
                tracing::debug!("password_reset_requested_for_unknown_email");
                return Ok(());
            }
        };
        let url = reset_url_for(&user)?;
        self.mailer.send_password_reset(&user.email, &url).await?;
        Ok(())
    }
}
