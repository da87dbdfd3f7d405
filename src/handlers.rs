use crate::agent_builder::AgentBuilder;
use crate::error::{AppError, AppResult, CONTACT_FAILED_MSG};
use crate::mailer::ContactMailer;
use crate::models::{
    BuildAgentRequest, BuildAgentResponse, ContactRequest, ContactResponse, HealthResponse,
};
use axum::{Extension, extract::Json, response::Json as ResponseJson};
use tracing::{debug, error, info};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

/// Agent builder handler
/// Turns free-text requirements into a structured agent concept
pub async fn build_agent_handler(
    Extension(builder): Extension<AgentBuilder>,
    Json(payload): Json<BuildAgentRequest>,
) -> AppResult<ResponseJson<BuildAgentResponse>> {
    info!("Agent builder endpoint called");

    // Validate the request
    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Requirements cannot be empty or only whitespace".to_string(),
        ));
    }

    let concept = builder
        .build_concept(&payload.requirements, payload.agent_name.as_deref())
        .await?;

    let response = BuildAgentResponse {
        agent_name: concept.agent_name,
        agent_description: concept.agent_description,
        implementation_options: concept.implementation_options,
    };
    info!("Successfully built agent concept, returning response");
    Ok(ResponseJson(response))
}

/// Contact handler
/// Dispatches the operator notification and the submitter acknowledgment.
/// Dispatch failures answer with the failure envelope rather than an error
/// status; only malformed input is rejected outright.
pub async fn contact_handler(
    Extension(mailer): Extension<ContactMailer>,
    Json(payload): Json<ContactRequest>,
) -> AppResult<ResponseJson<ContactResponse>> {
    info!("Contact endpoint called by {}", payload.email);

    // Validate the request
    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Name, message and a valid email address are required".to_string(),
        ));
    }

    match mailer.send_contact(&payload).await {
        Ok(()) => {
            info!("Contact submission dispatched");
            Ok(ResponseJson(ContactResponse::sent()))
        }
        Err(err) => {
            error!("Contact dispatch failed: {}", err);
            Ok(ResponseJson(ContactResponse::failed(CONTACT_FAILED_MSG)))
        }
    }
}
