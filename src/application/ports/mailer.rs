use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, recipient: &str, reset_url: &str) -> anyhow::Result<()>;
}
