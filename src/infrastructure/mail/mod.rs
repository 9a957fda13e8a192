use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::application::ports::mailer::Mailer;
use crate::bootstrap::config::Config;

/// Async SMTP mailer. With no SMTP host configured it runs in no-op mode
/// and only logs, which keeps development setups mail-server-free.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let from: Mailbox = cfg
            .smtp_from
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid SMTP_FROM address: {e}"))?;

        let transport = if cfg.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; password reset mail will only be logged");
            None
        } else {
            let builder = if cfg.smtp_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            }
            .map_err(|e| anyhow::anyhow!("failed to configure SMTP transport: {e}"))?
            .port(cfg.smtp_port);
            let builder = match (&cfg.smtp_username, &cfg.smtp_password) {
                (Some(user), Some(pass)) => {
                    builder.credentials(Credentials::new(user.clone(), pass.clone()))
                }
                _ => builder,
            };
            Some(builder.build())
        };

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, recipient: &str, reset_url: &str) -> anyhow::Result<()> {
        let body = format!(
            "To reset your password, visit the following link:\n{reset_url}\n\n\
             If you did not make this request then simply ignore this email \
             and no changes will be made.\n"
        );

        let Some(transport) = &self.transport else {
            info!(%recipient, %reset_url, "password_reset_mail_noop");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?)
            .subject("Password Reset Request")
            .body(body)?;
        transport.send(message).await?;
        info!(%recipient, "password_reset_mail_sent");
        Ok(())
    }
}
