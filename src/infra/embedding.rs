// ============================================================
// Layer 6 — HTTP Embedder
// ============================================================
// Concrete Embedder over a text-embedding HTTP service (any
// server speaking the common `{"inputs": ...} → [[f32]]` shape,
// e.g. a local text-embeddings-inference instance serving
// multilingual-e5-base).
//
// The endpoint is plain configuration: when none is configured
// the retriever simply never gets an Embedder and stays in
// degraded mode. Request errors and timeouts bubble up as
// recoverable errors — the retriever logs a warning and falls
// back; nothing here can abort a run.
//
// Reference: ureq crate documentation

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use crate::domain::traits::Embedder;

pub struct HttpEmbedder {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpEmbedder {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self { agent, endpoint: endpoint.trim_end_matches('/').to_string() }
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .agent
            .post(&format!("{}/embed", self.endpoint))
            .set("content-type", "application/json")
            .send_json(json!({ "inputs": text }))
            .context("appel du service d'embedding")?;

        let mut vectors: Vec<Vec<f32>> = response
            .into_json()
            .context("décodage de la réponse d'embedding")?;

        if vectors.is_empty() {
            return Err(anyhow!("réponse d'embedding vide"));
        }
        Ok(vectors.remove(0))
    }
}
