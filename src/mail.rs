//! Quotation delivery by email.
//!
//! [`Mailer`] is the seam the HTTP server and CLI talk to; [`SmtpMailer`] is
//! the production implementation. Port 465 uses implicit TLS, any other port
//! uses STARTTLS.

use anyhow::{anyhow, Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::path::Path;
use tracing::info;

use crate::config::MailConfig;

pub const SUBJECT: &str = "Pharmaceutical quotation";
const BODY: &str = "Please find attached the quotation you requested.";

/// Sends a rendered quotation to a recipient.
pub trait Mailer: Send + Sync {
    fn send_quote(&self, recipient: &str, attachment: &Path) -> Result<()>;
}

/// Build the quotation email with `pdf` attached as `file_name`.
pub fn build_message(sender: &str, recipient: &str, file_name: &str, pdf: Vec<u8>) -> Result<Message> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| anyhow!("invalid sender address '{}': {}", sender, e))?;
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| anyhow!("invalid recipient address '{}': {}", recipient, e))?;
    let pdf_type = ContentType::parse("application/pdf")
        .map_err(|e| anyhow!("invalid attachment content type: {:?}", e))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY.to_string()))
                .singlepart(Attachment::new(file_name.to_string()).body(pdf, pdf_type)),
        )
        .context("Failed to build quotation email")
}

pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let credentials = Credentials::new(self.config.username().to_string(), self.config.password()?);
        let relay = if self.config.smtp_port == 465 {
            SmtpTransport::relay(&self.config.smtp_host)
        } else {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
        };
        let builder = relay.with_context(|| format!("Failed to configure SMTP relay {}", self.config.smtp_host))?;

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build())
    }
}

impl Mailer for SmtpMailer {
    fn send_quote(&self, recipient: &str, attachment: &Path) -> Result<()> {
        let pdf = std::fs::read(attachment)
            .with_context(|| format!("Failed to read quotation: {}", attachment.display()))?;
        let file_name = attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "quotation.pdf".to_string());

        let message = build_message(&self.config.sender, recipient, &file_name, pdf)?;
        self.transport()?
            .send(&message)
            .with_context(|| format!("SMTP delivery to {} failed", recipient))?;

        info!(recipient = %recipient, file = %file_name, "quotation sent");
        Ok(())
    }
}
