use rand::Rng;
use rig::extractor::{ExtractionError, Extractor};
use rig::providers::openrouter;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GeneratorConfig;

/// Structured concept produced by the model. The camelCase renames keep the
/// model-facing schema identical to the wire schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentConcept {
    /// The name of the AI agent
    pub agent_name: String,
    /// The description of the AI agent
    pub agent_description: String,
    /// The implementation options for the AI agent
    pub implementation_options: String,
}

/// Internal diagnostic errors for the generator. Full detail is logged for
/// operators; callers map every variant to one fixed user-facing message.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator configuration error: {0}")]
    Config(String),
    #[error("model call failed: {0}")]
    Upstream(String),
    #[error("model output did not match the expected structure: {0}")]
    Schema(String),
}

const AGENT_BUILDER_PROMPT: &str = r#"
You are an AI agent builder tool that helps users define the requirements for a new AI agent.
You are given the requirements for a new agent and the agent's name.
Generate a description of a possible agent that meets these requirements, and concrete implementation options for building it.
Keep the description and the implementation options grounded in the stated requirements.
"#;

/// Turns free-text requirements into a structured agent concept via a single
/// schema-validated model call. Stateless: each call builds its own client
/// and shares nothing with other calls.
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    model: String,
}

impl AgentBuilder {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            model: config.model,
        }
    }

    pub async fn build_concept(
        &self,
        requirements: &str,
        agent_name: Option<&str>,
    ) -> Result<AgentConcept, GeneratorError> {
        let name = resolve_agent_name(agent_name, &mut rand::thread_rng());
        let prompt = build_prompt(requirements, &name);
        debug!("Agent builder prompt: {}", prompt);

        let extractor = self.extractor()?;
        let mut concept = extractor.extract(prompt.as_str()).await.map_err(|e| match e {
            ExtractionError::NoData => {
                GeneratorError::Schema("model returned no structured output".to_string())
            }
            ExtractionError::DeserializationError(err) => GeneratorError::Schema(err.to_string()),
            ExtractionError::CompletionError(err) => GeneratorError::Upstream(err.to_string()),
        })?;

        // The resolved name is authoritative; the model only fills in the rest.
        concept.agent_name = name;
        info!("Built agent concept '{}'", concept.agent_name);
        Ok(concept)
    }

    fn extractor(
        &self,
    ) -> Result<Extractor<openrouter::CompletionModel, AgentConcept>, GeneratorError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| GeneratorError::Config("OPENROUTER_API_KEY not set".to_string()))?;
        let client = openrouter::Client::new(&api_key);
        Ok(client
            .extractor::<AgentConcept>(&self.model)
            .preamble(AGENT_BUILDER_PROMPT)
            .build())
    }
}

/// Returns the supplied name verbatim, or a `Agent-<n>` placeholder with
/// `n` in `[0, 999]`. Blank names count as absent. The rng is injected so
/// callers and tests control the randomness source.
pub fn resolve_agent_name<R: Rng>(supplied: Option<&str>, rng: &mut R) -> String {
    match supplied {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("Agent-{}", rng.gen_range(0..1000)),
    }
}

fn build_prompt(requirements: &str, agent_name: &str) -> String {
    format!("Agent Requirements: {requirements}\nAgent Name: {agent_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_supplied_name_is_returned_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            resolve_agent_name(Some("Support Triage Bot"), &mut rng),
            "Support Triage Bot"
        );
    }

    #[test]
    fn test_blank_name_counts_as_absent() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = resolve_agent_name(Some("   "), &mut rng);
        assert!(name.starts_with("Agent-"));
    }

    #[test]
    fn test_default_name_matches_placeholder_pattern() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let name = resolve_agent_name(None, &mut rng);
            let suffix = name.strip_prefix("Agent-").expect("Agent- prefix");
            let n: u32 = suffix.parse().expect("numeric suffix");
            assert!(n <= 999, "suffix {n} out of range");
        }
    }

    #[test]
    fn test_default_name_is_deterministic_for_a_seeded_rng() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(resolve_agent_name(None, &mut a), resolve_agent_name(None, &mut b));
    }

    #[test]
    fn test_prompt_embeds_requirements_and_name() {
        let prompt = build_prompt("An agent that reads support emails", "Agent-42");
        assert!(prompt.contains("An agent that reads support emails"));
        assert!(prompt.contains("Agent Name: Agent-42"));
    }

    #[test]
    fn test_concept_serializes_with_camel_case_names() {
        let concept = AgentConcept {
            agent_name: "Agent-1".to_string(),
            agent_description: "desc".to_string(),
            implementation_options: "options".to_string(),
        };
        let json = serde_json::to_value(&concept).unwrap();
        assert_eq!(json["agentName"], "Agent-1");
        assert_eq!(json["agentDescription"], "desc");
        assert_eq!(json["implementationOptions"], "options");
    }
}
