// ============================================================
// Layer 3 — Evidence Domain Types
// ============================================================
// A norm excerpt retrieved as audit evidence, plus the
// metadata carried along from the norm's frontmatter. Evidence
// is ephemeral: produced for one judgment call, formatted into
// the prompt, and dropped.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// Frontmatter metadata inherited by every chunk of a norm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Norm category (e.g. "legal", "sop")
    #[serde(default, rename = "type")]
    pub norm_type: String,

    /// Human-readable origin of the norm (e.g. "CGI art. 39-4")
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub version: String,

    /// Raw tag list as declared in the norm frontmatter
    #[serde(default)]
    pub tags: String,

    /// What document types the norm applies to
    #[serde(default)]
    pub applicable_a: String,

    /// Filename the chunk came from
    #[serde(default)]
    pub fichier: String,
}

/// One retrieved norm excerpt, scoped to a single judgment call.
#[derive(Debug, Clone)]
pub struct EvidenceChunk {
    /// The excerpt text itself
    pub text: String,

    /// Label identifying where the excerpt came from
    pub source_label: String,

    pub metadata: ChunkMetadata,
}
