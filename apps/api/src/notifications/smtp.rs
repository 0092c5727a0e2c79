use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpConfig;
use crate::notifications::{EmailTemplate, NotificationService, NotifyError};

/// SMTP delivery over a pooled STARTTLS connection.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from: config.from_address.parse()?,
        })
    }
}

#[async_trait]
impl NotificationService for SmtpNotifier {
    async fn send_email(&self, to: &str, template: &EmailTemplate) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(template.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(template.body())?;

        let response = self.mailer.send(message).await?;
        debug!(
            "Sent '{}' email to {to}: {}",
            template.name(),
            response.code()
        );
        Ok(())
    }
}
