use serde::Deserialize;
use tracing::{debug, error};

use super::MailError;
use crate::config::OauthSettings;

/// Scope for direct Graph API sends
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Scope for XOAUTH2-authenticated SMTP relay sends
pub const SMTP_SCOPE: &str = "https://outlook.office365.com/.default";

const TOKEN_ENDPOINT_BASE: &str = "https://login.microsoftonline.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the stored refresh token for a short-lived access token at the
/// identity provider's token endpoint.
pub struct TokenClient {
    settings: OauthSettings,
    scope: &'static str,
}

impl TokenClient {
    pub fn new(settings: OauthSettings, scope: &'static str) -> Self {
        Self { settings, scope }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            TOKEN_ENDPOINT_BASE, self.settings.tenant_id
        )
    }

    pub async fn fetch_access_token(&self) -> Result<String, MailError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MailError::Auth(e.to_string()))?;

        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("refresh_token", self.settings.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
            ("scope", self.scope),
        ];

        let response = client
            .post(self.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| MailError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange rejected with status {}: {}", status, body);
            return Err(MailError::Auth(format!(
                "identity provider returned {status}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MailError::Auth(format!("unreadable token response: {e}")))?;

        debug!("Token exchange succeeded");
        Ok(token.access_token)
    }
}
