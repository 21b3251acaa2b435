//! Outgoing mail for contact submissions.
//!
//! Delivery is behind [`Mailer`]; [`LogMailer`] only records what would
//! have been sent.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Contact;

#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
#[error("Mail delivery failed: {0}")]
pub struct MailError(pub String);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), MailError>;
}

/// Writes each message to the log instead of delivering it
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "Mail logged, not delivered"
        );
        tracing::debug!(body = %message.body);
        Ok(())
    }
}

/// Acknowledgement to the person who wrote in.
pub fn contact_confirmation(contact: &Contact) -> MailMessage {
    let mut body = format!(
        "Dear {},\n\nWe have received your message and will get back to you within 24 hours.\n\nSubject: {}\n",
        contact.name, contact.subject
    );
    if let Some(service) = contact.service {
        body.push_str(&format!("Service: {service}\n"));
    }
    body.push_str(&format!("Message:\n{}\n", contact.message));

    MailMessage {
        to: contact.email.clone(),
        subject: "Thank you for contacting PharmaExport-Distributor".to_string(),
        body,
    }
}

/// Notice to the admin mailbox, with the sender's technical details.
pub fn contact_notification(contact: &Contact, admin_email: &str) -> MailMessage {
    let service = contact
        .service
        .map(|s| format!("Service Interest: {s}\n"))
        .unwrap_or_default();
    let body = format!(
        "Name: {}\nEmail: {}\nPhone: {}\nSubject: {}\n{service}Submitted: {}\n\n{}\n\nIP: {}\nUser Agent: {}\n",
        contact.name,
        contact.email,
        contact.phone.as_deref().unwrap_or("Not provided"),
        contact.subject,
        contact.created_at.to_rfc3339(),
        contact.message,
        contact.ip_address.as_deref().unwrap_or("unknown"),
        contact.user_agent.as_deref().unwrap_or("unknown"),
    );

    MailMessage {
        to: admin_email.to_string(),
        subject: format!("New Contact Form Submission - {}", contact.subject),
        body,
    }
}
