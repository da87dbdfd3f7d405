use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::AsyncSmtpTransportBuilder;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use super::oauth::{self, TokenClient};
use super::{MailError, MailTransport, OutboundMessage};
use crate::config::{OauthSettings, SmtpSettings};

/// Port that implies implicit TLS (wrapper mode) instead of STARTTLS
const SMTPS_PORT: u16 = 465;

fn uses_implicit_tls(port: u16) -> bool {
    port == SMTPS_PORT
}

fn relay_builder(host: &str, port: u16) -> Result<AsyncSmtpTransportBuilder, MailError> {
    let builder = if uses_implicit_tls(port) {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
    };
    builder
        .map(|b| b.port(port))
        .map_err(|e| MailError::Config(format!("invalid SMTP relay configuration: {e}")))
}

fn build_email(sender: &str, message: &OutboundMessage) -> Result<Message, MailError> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| MailError::Delivery(format!("invalid sender address '{sender}': {e}")))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| MailError::Delivery(format!("invalid recipient address '{}': {e}", message.to)))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN);

    if let Some(reply_to) = &message.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .map_err(|e| MailError::Delivery(format!("invalid reply-to address '{reply_to}': {e}")))?;
        builder = builder.reply_to(reply_to);
    }

    builder
        .body(message.body.clone())
        .map_err(|e| MailError::Delivery(e.to_string()))
}

/// Token exchange followed by an XOAUTH2-authenticated relay send. The
/// access token is short-lived, so the relay client is rebuilt per send.
pub struct OauthSmtpTransport {
    token_client: TokenClient,
    user: String,
    host: String,
    port: u16,
}

impl OauthSmtpTransport {
    pub fn new(oauth: OauthSettings, host: String, port: u16) -> Self {
        let user = oauth.user.clone();
        Self {
            token_client: TokenClient::new(oauth, oauth::SMTP_SCOPE),
            user,
            host,
            port,
        }
    }
}

#[async_trait]
impl MailTransport for OauthSmtpTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let access_token = self.token_client.fetch_access_token().await?;
        let email = build_email(&self.user, message)?;

        let transport = relay_builder(&self.host, self.port)?
            .credentials(Credentials::new(self.user.clone(), access_token))
            .authentication(vec![Mechanism::Xoauth2])
            .build();

        transport.send(email).await.map_err(|e| {
            error!("SMTP relay rejected message to {}: {}", message.to, e);
            MailError::Delivery(e.to_string())
        })?;

        info!("SMTP relay accepted message to {}", message.to);
        Ok(())
    }
}

/// Fixed-credential relay send, no token exchange. The relay client is
/// built once at startup.
pub struct StaticSmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl StaticSmtpTransport {
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let transport = relay_builder(&settings.host, settings.port)?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender: settings.username,
        })
    }
}

#[async_trait]
impl MailTransport for StaticSmtpTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let email = build_email(&self.sender, message)?;

        self.transport.send(email).await.map_err(|e| {
            error!("SMTP relay rejected message to {}: {}", message.to, e);
            MailError::Delivery(e.to_string())
        })?;

        info!("SMTP relay accepted message to {}", message.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutboundMessage {
        OutboundMessage {
            to: "owner@consultancy.example".to_string(),
            subject: "New Contact Form Submission from Jane".to_string(),
            body: "Hello".to_string(),
            reply_to: Some("jane@x.com".to_string()),
        }
    }

    #[test]
    fn test_implicit_tls_only_on_port_465() {
        assert!(uses_implicit_tls(465));
        assert!(!uses_implicit_tls(587));
        assert!(!uses_implicit_tls(25));
    }

    #[test]
    fn test_build_email_sets_all_headers() {
        let email = build_email("sender@consultancy.example", &message()).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();

        assert!(formatted.contains("sender@consultancy.example"));
        assert!(formatted.contains("owner@consultancy.example"));
        assert!(formatted.contains("Reply-To"));
        assert!(formatted.contains("jane@x.com"));
        assert!(formatted.contains("Subject: New Contact Form Submission from Jane"));
    }

    #[test]
    fn test_build_email_without_reply_to() {
        let mut msg = message();
        msg.reply_to = None;
        let email = build_email("sender@consultancy.example", &msg).unwrap();
        let formatted = String::from_utf8(email.formatted()).unwrap();
        assert!(!formatted.contains("Reply-To"));
    }

    #[test]
    fn test_build_email_rejects_bad_addresses() {
        let err = build_email("not an address", &message()).unwrap_err();
        assert!(matches!(err, MailError::Delivery(_)));

        let mut msg = message();
        msg.to = "also not an address".to_string();
        let err = build_email("sender@consultancy.example", &msg).unwrap_err();
        assert!(matches!(err, MailError::Delivery(_)));
    }

    #[test]
    fn test_static_transport_builds_for_both_tls_modes() {
        for port in [465, 587] {
            let settings = SmtpSettings {
                host: "mail.example.com".to_string(),
                port,
                username: "sender@consultancy.example".to_string(),
                password: "hunter2".to_string(),
            };
            assert!(StaticSmtpTransport::new(settings).is_ok(), "port {port}");
        }
    }
}
