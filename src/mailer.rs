use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox,
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use crate::config::Config;
use crate::errors::Result;

/// SMTP notification service. Delivery is attempted per call; a failure
/// surfaces as an error to the handler without undoing anything already
/// committed.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        let sender = config.mail_sender.parse::<Mailbox>()?;

        Ok(Self { transport, sender })
    }

    pub async fn send(&self, subject: &str, recipients: &[String], body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .subject(subject);
        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        let message = builder.body(body.to_string())?;

        self.transport.send(message).await?;
        info!("Sent `{subject}` to {} recipient(s)", recipients.len());

        Ok(())
    }
}
