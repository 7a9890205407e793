// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// Represents a single accounting document loaded from the
// dropzone. This is a plain data struct with no behaviour —
// the frontmatter has already been split from the body by the
// time a Document is created, and the struct is never mutated
// afterwards.
//
// Using #[derive(Debug, Clone)] gives us:
//   - Debug: lets us print the struct with {:?}
//   - Clone: lets us make copies of the struct
//   - Serialize/Deserialize: lets us save/load as JSON
//
// Reference: Rust Book §5 (Structs and Methods)
//            Rust Book §10 (Derive Macros)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One accounting document awaiting audit.
/// Immutable once loaded: retrieval and judgment only read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier — the `id` frontmatter field when present,
    /// otherwise the file stem
    pub id: String,

    /// The filename — kept for traceability so every artifact
    /// and log entry can point back at its source
    pub filename: String,

    /// Tags from the frontmatter, already stripped of brackets
    /// and quotes. Empty when the document declares none.
    pub tags: Vec<String>,

    /// All `key: value` pairs from the frontmatter block.
    /// BTreeMap keeps serialized output in a stable order.
    pub fields: BTreeMap<String, String>,

    /// The body text, frontmatter excluded
    pub body: String,
}

impl Document {
    /// The declared document type, `"inconnu"` when absent.
    pub fn doc_type(&self) -> &str {
        self.fields.get("type").map(String::as_str).unwrap_or("inconnu")
    }

    /// The declared gross amount (montant_ttc), `"N/A"` when absent.
    /// Kept as the raw declared string: the judgment prompt quotes
    /// what the document says, it does not reinterpret it.
    pub fn declared_gross(&self) -> &str {
        self.fields.get("montant_ttc").map(String::as_str).unwrap_or("N/A")
    }

    /// Tags rejoined into one comma-separated string for the
    /// retrieval query.
    pub fn tags_joined(&self) -> String {
        self.tags.join(", ")
    }

    /// The filename without its extension, used as the stem of
    /// every artifact name derived from this document.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }
}
