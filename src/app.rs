use axum::{Extension, Router};
use tower_http::cors::CorsLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::agent_builder::AgentBuilder;
use crate::config::{GeneratorConfig, MailSettings};
use crate::mailer::ContactMailer;
use crate::routes::create_routes;

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rs_agent_svc=info,tower_http=debug,axum::rejection=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware.
/// The mail transport is resolved here, so an incomplete deployment fails at
/// startup before any request is accepted.
pub async fn create_app() -> Result<Router, anyhow::Error> {
    info!("Initializing application router");

    let builder = AgentBuilder::new(GeneratorConfig::from_env());

    let mail_settings = MailSettings::from_env()?;
    let mailer = ContactMailer::from_settings(mail_settings)?;
    info!("Mail transport initialized");

    Ok(Router::new()
        .merge(create_routes())
        .layer(Extension(builder))
        .layer(Extension(mailer))
        .layer(CorsLayer::permissive()))
}
