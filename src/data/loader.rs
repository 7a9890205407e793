// ============================================================
// Layer 4 — Document Loader
// ============================================================
// Loads dropzone documents: UTF-8 Markdown with an optional
// leading frontmatter block.
//
// Frontmatter format:
//   ---
//   id: FAC_2026_001
//   type: facture_fournisseur
//   tags: [tva, cadeau, achat]
//   montant_ttc: 120.00
//   ---
//   ...body...
//
// Parsing rules:
//   - The block is bounded by a `---` marker alone on its own
//     line, opening and closing. No block → empty metadata map,
//     NOT an error (many older documents have no frontmatter).
//   - Each `key: value` line splits on the FIRST colon only, so
//     values may themselves contain colons.
//   - tags is conventionally a bracketed comma list; brackets
//     and quotes are stripped and the list is kept in order.
//   - The only hard failure is a file that cannot be read as
//     UTF-8 text at all (MalformedInput).
//
// Reference: Rust Book §8 (Strings)
//            Rust Book §9 (Error Handling)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::document::Document;
use crate::domain::errors::PipelineError;

/// Loads audit documents from the dropzone directory.
pub struct DocumentLoader {
    dir: PathBuf,
}

impl DocumentLoader {
    /// Create a new DocumentLoader pointed at a directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List the pending .md documents, sorted by filename so a
    /// run always processes them in a stable order.
    pub fn pending_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            tracing::warn!(
                "Dropzone '{}' does not exist — nothing to audit",
                self.dir.display()
            );
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Load and parse one document.
    pub fn load(&self, path: &Path) -> Result<Document, PipelineError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            PipelineError::MalformedInput(format!("{} : {e}", path.display()))
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("inconnu")
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("inconnu")
            .to_string();

        let (fields, body) = split_frontmatter(&raw);
        let tags = parse_tags(fields.get("tags").map(String::as_str).unwrap_or(""));
        let id = fields.get("id").cloned().unwrap_or(stem);

        Ok(Document { id, filename, tags, fields, body })
    }
}

/// Split a document into its frontmatter map and body.
/// A missing or unterminated block degrades to an empty map with
/// the full text as body.
fn split_frontmatter(raw: &str) -> (BTreeMap<String, String>, String) {
    let mut fields = BTreeMap::new();

    // The block must START the document: "---\n...\n---"
    let Some(rest) = raw.strip_prefix("---\n").or_else(|| raw.strip_prefix("---\r\n")) else {
        return (fields, raw.trim().to_string());
    };

    // Find the closing marker alone on its own line
    let mut block_len = None;
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            block_len = Some(offset);
            offset += line.len();
            break;
        }
        offset += line.len();
    }

    let Some(block_len) = block_len else {
        // Opening marker but no closing one → treat as body
        return (fields, raw.trim().to_string());
    };

    for line in rest[..block_len].lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    let body = rest[offset..].trim().to_string();
    (fields, body)
}

/// Parse the conventional bracketed comma list of tags.
/// `[tva, 'cadeau', "achat"]` → ["tva", "cadeau", "achat"]
fn parse_tags(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|t| t.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
