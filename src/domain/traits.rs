// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are the seams between the pipeline and its external
// collaborators. By programming against traits instead of
// concrete types we can swap implementations without changing
// the code that uses them:
//
//   - JsonVectorIndex implements SemanticIndex
//   - HttpEmbedder implements Embedder
//   - AnthropicBackend implements ReasoningService
//   - tests plug in cheap in-memory fakes for all three
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;

use crate::domain::evidence::EvidenceChunk;

// ─── Embedder ─────────────────────────────────────────────────────────────────
/// Turns text into a dense vector. The pipeline never looks
/// inside the vector — it only hands it to a SemanticIndex.
pub trait Embedder {
    /// Embed one text. The caller is responsible for any model
    /// prefix convention ("query: " / "passage: ").
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

// ─── SemanticIndex ────────────────────────────────────────────────────────────
/// A store of embedded norm chunks, queryable by vector
/// similarity (cosine).
pub trait SemanticIndex {
    /// Return the k chunks most similar to the query vector,
    /// best first.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<EvidenceChunk>>;
}

// ─── ReasoningService ─────────────────────────────────────────────────────────
/// One completion from the reasoning service, with the token
/// usage it reported.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw reply text — may or may not be valid JSON
    pub text: String,
    /// Model identifier as reported by the service
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// The external judgment backend. A blocking call: the caller
/// imposes a timeout at construction, and expiry surfaces as a
/// recoverable error, never a hang.
pub trait ReasoningService {
    fn complete(&self, system_prompt: &str, user_message: &str) -> Result<Completion>;
}
