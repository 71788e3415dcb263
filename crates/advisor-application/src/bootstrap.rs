//! Wires an [`AdvisorService`] from configuration.

use std::sync::Arc;

use advisor_core::config::{AppConfig, TransportKind};
use advisor_core::secret::SecretService;
use advisor_core::RequestBuilder;
use advisor_interaction::{
    ChatTransport, FlattenedPromptTransport, GeminiApiTransport, ResilientCaller, RetryPolicy,
};
use anyhow::{Context, Result};

use crate::advisor_service::{AdvisorService, DEFAULT_GREETING};

/// Resolves the credential and assembles the service described by `config`.
pub async fn build_service(
    config: &AppConfig,
    secrets: &dyn SecretService,
) -> Result<AdvisorService> {
    let api_key = secrets
        .gemini_api_key()
        .await
        .context("Failed to resolve the Gemini credential")?;

    let transport: Arc<dyn ChatTransport> = match config.transport {
        TransportKind::Gemini => Arc::new(GeminiApiTransport::new(api_key)),
        TransportKind::Flattened => Arc::new(FlattenedPromptTransport::new(api_key)),
    };

    Ok(service_with_transport(config, transport))
}

/// Assembles the service around an already constructed transport.
pub fn service_with_transport(config: &AppConfig, transport: Arc<dyn ChatTransport>) -> AdvisorService {
    tracing::info!(
        transport = transport.name(),
        model = %config.model,
        convention = %config.convention,
        grounding = config.grounding,
        "Advisor configured"
    );

    let caller = ResilientCaller::new(transport)
        .with_policy(RetryPolicy::from_settings(&config.retry));
    let builder = RequestBuilder::new()
        .with_model(config.model.clone())
        .with_convention(config.convention)
        .with_grounding(config.grounding);
    let greeting = config.greeting.then(|| DEFAULT_GREETING.to_string());

    AdvisorService::new(caller, builder).with_greeting(greeting)
}
