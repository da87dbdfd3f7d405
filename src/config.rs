use std::env;

use crate::mailer::MailError;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "rs_agent_svc=info,tower_http=debug".to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Model selection for the agent builder
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
}

impl GeneratorConfig {
    pub const DEFAULT_MODEL: &'static str = "openai/gpt-4o-mini";

    pub fn from_env() -> Self {
        Self {
            model: env::var("AGENT_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string()),
        }
    }
}

/// Credentials for the OAuth refresh-token exchange
#[derive(Debug, Clone)]
pub struct OauthSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// Mailbox the messages are sent from
    pub user: String,
}

/// Static credentials for an SMTP relay
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Raw environment values feeding transport resolution. Kept separate from
/// the environment lookup so resolution is testable without mutating the
/// process environment.
#[derive(Debug, Default, Clone)]
pub struct MailVars {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub oauth_user: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub operator_email: Option<String>,
}

impl MailVars {
    pub fn from_env() -> Self {
        Self {
            tenant_id: env::var("OAUTH_TENANT_ID").ok(),
            client_id: env::var("OAUTH_CLIENT_ID").ok(),
            client_secret: env::var("OAUTH_CLIENT_SECRET").ok(),
            refresh_token: env::var("OAUTH_REFRESH_TOKEN").ok(),
            oauth_user: env::var("OAUTH_USER").ok(),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT").ok(),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            operator_email: env::var("CONTACT_EMAIL").ok(),
        }
    }
}

/// Mail transport selection. Exactly one variant is active per deployment,
/// chosen once at startup and never re-branched per call.
#[derive(Debug, Clone)]
pub enum MailSettings {
    /// Token exchange, then direct Graph sendMail calls
    GraphApi {
        oauth: OauthSettings,
        operator_email: String,
    },
    /// Token exchange, then an XOAUTH2-authenticated SMTP relay
    OauthSmtp {
        oauth: OauthSettings,
        host: String,
        port: u16,
        operator_email: String,
    },
    /// Fixed-credential SMTP relay, no token exchange
    StaticSmtp {
        smtp: SmtpSettings,
        operator_email: String,
    },
}

impl MailSettings {
    pub const DEFAULT_OAUTH_SMTP_HOST: &'static str = "smtp.office365.com";
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    pub fn from_env() -> Result<Self, MailError> {
        let kind = env::var("MAIL_TRANSPORT")
            .map_err(|_| MailError::Config("MAIL_TRANSPORT environment variable not set".into()))?;
        Self::resolve(&kind, MailVars::from_env())
    }

    /// Resolves the active transport from the selector and the collected
    /// variables. Every variable the selected variant needs must be present;
    /// nothing here performs network I/O.
    pub fn resolve(kind: &str, vars: MailVars) -> Result<Self, MailError> {
        let operator_email = require(vars.operator_email.clone(), "CONTACT_EMAIL")?;
        match kind {
            "graph" => Ok(MailSettings::GraphApi {
                oauth: oauth_settings(vars)?,
                operator_email,
            }),
            "smtp-oauth" => {
                let host = vars
                    .smtp_host
                    .clone()
                    .unwrap_or_else(|| Self::DEFAULT_OAUTH_SMTP_HOST.to_string());
                let port = parse_port(vars.smtp_port.as_deref(), Self::DEFAULT_SMTP_PORT)?;
                Ok(MailSettings::OauthSmtp {
                    oauth: oauth_settings(vars)?,
                    host,
                    port,
                    operator_email,
                })
            }
            "smtp" => {
                let port = parse_port(vars.smtp_port.as_deref(), Self::DEFAULT_SMTP_PORT)?;
                Ok(MailSettings::StaticSmtp {
                    smtp: SmtpSettings {
                        host: require(vars.smtp_host, "SMTP_HOST")?,
                        port,
                        username: require(vars.smtp_user, "SMTP_USER")?,
                        password: require(vars.smtp_password, "SMTP_PASSWORD")?,
                    },
                    operator_email,
                })
            }
            other => Err(MailError::Config(format!(
                "unknown MAIL_TRANSPORT '{other}' (expected 'graph', 'smtp-oauth' or 'smtp')"
            ))),
        }
    }

    pub fn operator_email(&self) -> &str {
        match self {
            MailSettings::GraphApi { operator_email, .. }
            | MailSettings::OauthSmtp { operator_email, .. }
            | MailSettings::StaticSmtp { operator_email, .. } => operator_email,
        }
    }
}

fn oauth_settings(vars: MailVars) -> Result<OauthSettings, MailError> {
    Ok(OauthSettings {
        tenant_id: require(vars.tenant_id, "OAUTH_TENANT_ID")?,
        client_id: require(vars.client_id, "OAUTH_CLIENT_ID")?,
        client_secret: require(vars.client_secret, "OAUTH_CLIENT_SECRET")?,
        refresh_token: require(vars.refresh_token, "OAUTH_REFRESH_TOKEN")?,
        user: require(vars.oauth_user, "OAUTH_USER")?,
    })
}

fn require(value: Option<String>, var: &str) -> Result<String, MailError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MailError::Config(format!("{var} environment variable not set")))
}

fn parse_port(value: Option<&str>, default: u16) -> Result<u16, MailError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| MailError::Config(format!("SMTP_PORT '{raw}' is not a valid port"))),
    }
}
