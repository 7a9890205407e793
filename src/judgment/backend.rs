// ============================================================
// Layer 5 — Reasoning Backend (Anthropic HTTP)
// ============================================================
// Concrete ReasoningService over the Anthropic messages API.
//
// Error policy:
//   - A missing ANTHROPIC_API_KEY is a ConfigurationFailure and
//     is raised at CONSTRUCTION time, before any document is
//     processed. This is the single abort condition of stage A.
//   - Everything at request time (HTTP errors, timeout expiry,
//     an unexpected response shape) is recoverable: it bubbles
//     up to the JudgmentClient, which degrades the document to
//     an ERREUR verdict and the batch continues.
//
// The agent carries an explicit timeout so a hung backend can
// never hang the pipeline.
//
// Reference: Rust Book §9 (Error Handling)
//            ureq crate documentation

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use crate::domain::errors::PipelineError;
use crate::domain::traits::{Completion, ReasoningService};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicBackend {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Build the backend from the process environment.
    /// Fails fatally when ANTHROPIC_API_KEY is absent or blank.
    pub fn from_env(model: &str, timeout_secs: u64) -> Result<Self, PipelineError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PipelineError::ConfigurationFailure(
                    "variable d'environnement ANTHROPIC_API_KEY absente".into(),
                )
            })?;

        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();

        Ok(Self { agent, api_key, model: model.to_string() })
    }
}

impl ReasoningService for AnthropicBackend {
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<Completion> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_message}],
        });

        let response = self
            .agent
            .post(API_URL)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", API_VERSION)
            .set("content-type", "application/json")
            .send_json(body)
            .context("appel API Anthropic")?;

        let value: serde_json::Value =
            response.into_json().context("décodage de la réponse API")?;

        let text = value["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("réponse API sans bloc de texte"))?
            .trim()
            .to_string();

        Ok(Completion {
            text,
            model: value["model"].as_str().unwrap_or(&self.model).to_string(),
            input_tokens: value["usage"]["input_tokens"].as_u64().unwrap_or(0),
            output_tokens: value["usage"]["output_tokens"].as_u64().unwrap_or(0),
        })
    }
}
