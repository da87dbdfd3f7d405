use async_trait::async_trait;
use tracing::{error, info};

use super::oauth::{self, TokenClient};
use super::{MailError, MailTransport, OutboundMessage};
use crate::config::OauthSettings;

const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Token exchange followed by one authenticated Graph sendMail call per
/// message.
pub struct GraphSendTransport {
    token_client: TokenClient,
    user: String,
    http: reqwest::Client,
}

impl GraphSendTransport {
    pub fn new(oauth: OauthSettings) -> Self {
        let user = oauth.user.clone();
        Self {
            token_client: TokenClient::new(oauth, oauth::GRAPH_SCOPE),
            user,
            http: reqwest::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/users/{}/sendMail", GRAPH_BASE_URL, self.user)
    }
}

#[async_trait]
impl MailTransport for GraphSendTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        let access_token = self.token_client.fetch_access_token().await?;

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&sendmail_payload(message))
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph sendMail rejected with status {}: {}", status, body);
            return Err(MailError::Delivery(format!("mail API returned {status}")));
        }

        info!("Graph sendMail accepted message to {}", message.to);
        Ok(())
    }
}

fn sendmail_payload(message: &OutboundMessage) -> serde_json::Value {
    let mut mail = serde_json::json!({
        "subject": message.subject,
        "body": {
            "contentType": "Text",
            "content": message.body,
        },
        "toRecipients": [
            { "emailAddress": { "address": message.to } }
        ],
    });
    if let Some(reply_to) = &message.reply_to {
        mail["replyTo"] = serde_json::json!([
            { "emailAddress": { "address": reply_to } }
        ]);
    }
    serde_json::json!({
        "message": mail,
        "saveToSentItems": false,
    })
}
