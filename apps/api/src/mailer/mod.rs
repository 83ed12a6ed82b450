//! Outbound email delivery.
//!
//! `Mailer` is the seam used by outreach orchestration. `SmtpMailer` speaks
//! STARTTLS SMTP with the credentials from `Config`; tests substitute a
//! recording fake. Timing is measured by the caller.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SmtpSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<Attachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        let from = settings.from.parse::<Mailbox>()?;

        info!(
            "SMTP mailer configured ({}:{} as {})",
            settings.host, settings.port, from
        );
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, email)?;
        let response = self.transport.send(message).await?;
        debug!("SMTP accepted message for {}: {:?}", email.to, response.code());
        Ok(())
    }
}

/// HTML body, plus a PDF part when an attachment is present.
pub fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, MailError> {
    let to = email.to.trim().parse::<Mailbox>()?;
    let builder = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject.as_str());

    let html = SinglePart::html(email.html_body.clone());
    let message = match &email.attachment {
        None => builder.singlepart(html),
        Some(attachment) => {
            let content_type = ContentType::parse("application/pdf")
                .map_err(|e| MailError::Build(e.to_string()))?;
            let part = lettre::message::Attachment::new(attachment.filename.clone())
                .body(attachment.bytes.clone(), content_type);
            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(part))
        }
    };

    message.map_err(|e| MailError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        "Ada Lovelace <ada@example.com>".parse().unwrap()
    }

    fn email(to: &str, attachment: Option<Attachment>) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            subject: "Application for SRE - Ada Lovelace".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            attachment,
        }
    }

    #[test]
    fn test_builds_html_message() {
        let message = build_message(&sender(), &email("jobs@acme.test", None)).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: jobs@acme.test"));
        assert!(raw.contains("Subject: Application for SRE - Ada Lovelace"));
        assert!(raw.contains("text/html"));
        assert!(!raw.contains("multipart/mixed"));
    }

    #[test]
    fn test_attachment_makes_multipart() {
        let attachment = Attachment {
            filename: "cv.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let message =
            build_message(&sender(), &email("jobs@acme.test", Some(attachment))).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("cv.pdf"));
    }

    #[test]
    fn test_rejects_bad_recipient() {
        let err = build_message(&sender(), &email("not-an-address", None)).unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
    }
}
