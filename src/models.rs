use serde::{Deserialize, Serialize};

/// Request payload for the agent builder endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildAgentRequest {
    pub requirements: String,
    #[serde(default)]
    pub agent_name: Option<String>,
}

/// Response payload for the agent builder endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildAgentResponse {
    pub agent_name: String,
    pub agent_description: String,
    pub implementation_options: String,
}

/// Request payload for the contact endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Response envelope for the contact endpoint
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

impl BuildAgentRequest {
    /// Validates that the requirements are not empty or just whitespace.
    /// The UI recommends a minimum length, but that is the caller's concern.
    pub fn is_valid(&self) -> bool {
        !self.requirements.trim().is_empty()
    }
}

impl ContactRequest {
    /// Validates that all fields are present and the email address is
    /// syntactically plausible
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.message.trim().is_empty()
            && is_valid_email(&self.email)
    }
}

impl ContactResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
/// Deliverability is the mail relay's problem, not ours.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if domain.contains('@') || domain.contains(char::is_whitespace) {
        return false;
    }
    domain.split('.').count() >= 2 && !domain.starts_with('.') && !domain.ends_with('.')
}
