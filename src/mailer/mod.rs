pub mod graph;
pub mod oauth;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::MailSettings;
use crate::models::ContactRequest;

/// Internal diagnostic errors for mail dispatch. Full detail is logged for
/// operators; the handler maps every variant to one fixed user-facing
/// message.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport configuration incomplete: {0}")]
    Config(String),
    #[error("token exchange rejected: {0}")]
    Auth(String),
    #[error("message delivery failed: {0}")]
    Delivery(String),
}

/// A single outbound email. The sender identity belongs to the transport,
/// not the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

/// One concrete way of delivering an email. Exactly one implementation is
/// active per deployment; selection happens at startup, never per call.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError>;
}

/// Sends the two messages a contact submission produces: a notification to
/// the operator and an acknowledgment to the submitter.
#[derive(Clone)]
pub struct ContactMailer {
    transport: Arc<dyn MailTransport>,
    operator_email: String,
}

impl ContactMailer {
    pub fn new(transport: Arc<dyn MailTransport>, operator_email: impl Into<String>) -> Self {
        Self {
            transport,
            operator_email: operator_email.into(),
        }
    }

    /// Builds the transport the resolved settings call for. Fails on
    /// malformed relay configuration without making any network call.
    pub fn from_settings(settings: MailSettings) -> Result<Self, MailError> {
        let operator_email = settings.operator_email().to_string();
        let transport: Arc<dyn MailTransport> = match settings {
            MailSettings::GraphApi { oauth, .. } => Arc::new(graph::GraphSendTransport::new(oauth)),
            MailSettings::OauthSmtp {
                oauth, host, port, ..
            } => Arc::new(smtp::OauthSmtpTransport::new(oauth, host, port)),
            MailSettings::StaticSmtp { smtp, .. } => {
                Arc::new(smtp::StaticSmtpTransport::new(smtp)?)
            }
        };
        Ok(Self::new(transport, operator_email))
    }

    /// Sends the operator notification, then the submitter acknowledgment.
    /// The acknowledgment is only attempted after the notification went
    /// out; a failure anywhere fails the whole call. A caller retry after a
    /// first-send success therefore duplicates the operator notification.
    pub async fn send_contact(&self, submission: &ContactRequest) -> Result<(), MailError> {
        let notification = notification_message(&self.operator_email, submission);
        self.transport.send(&notification).await?;
        info!("Operator notification sent for submission from {}", submission.email);

        let acknowledgment = acknowledgment_message(submission);
        self.transport.send(&acknowledgment).await?;
        info!("Acknowledgment sent to {}", submission.email);

        Ok(())
    }
}

fn notification_message(operator_email: &str, submission: &ContactRequest) -> OutboundMessage {
    OutboundMessage {
        to: operator_email.to_string(),
        subject: format!("New Contact Form Submission from {}", submission.name),
        body: submission.message.clone(),
        reply_to: Some(submission.email.clone()),
    }
}

fn acknowledgment_message(submission: &ContactRequest) -> OutboundMessage {
    OutboundMessage {
        to: submission.email.clone(),
        subject: "We have received your message!".to_string(),
        body: format!(
            "Hi {},\n\nThank you for reaching out! We have received your message \
             and will get back to you as soon as possible.\n\nBest regards",
            submission.name
        ),
        reply_to: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MailTransport for FailingTransport {
        async fn send(&self, _message: &OutboundMessage) -> Result<(), MailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MailError::Delivery("relay said no".to_string()))
        }
    }

    fn submission() -> ContactRequest {
        ContactRequest {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            message: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dual_dispatch_sends_notification_then_acknowledgment() {
        let transport = Arc::new(RecordingTransport::default());
        let mailer = ContactMailer::new(transport.clone(), "owner@consultancy.example");

        mailer.send_contact(&submission()).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);

        let notification = &sent[0];
        assert_eq!(notification.to, "owner@consultancy.example");
        assert_eq!(notification.subject, "New Contact Form Submission from Jane");
        assert_eq!(notification.body, "Hello");
        assert_eq!(notification.reply_to.as_deref(), Some("jane@x.com"));

        let acknowledgment = &sent[1];
        assert_eq!(acknowledgment.to, "jane@x.com");
        assert_eq!(acknowledgment.subject, "We have received your message!");
        assert!(acknowledgment.body.contains("Hi Jane"));
        assert!(acknowledgment.reply_to.is_none());
    }

    #[tokio::test]
    async fn test_failing_first_send_stops_the_dispatch() {
        let transport = Arc::new(FailingTransport::default());
        let mailer = ContactMailer::new(transport.clone(), "owner@consultancy.example");

        let result = mailer.send_contact(&submission()).await;

        assert!(matches!(result, Err(MailError::Delivery(_))));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
