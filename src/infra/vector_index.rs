// ============================================================
// Layer 6 — Local Vector Index
// ============================================================
// A small persistent store of embedded norm chunks, backed by
// one JSON file (kos_db/index.json). The ingest use case writes
// it; the retriever's primary path queries it.
//
// Query = brute-force cosine similarity over all records. The
// norm corpus is a few hundred chunks at most, so a linear scan
// beats carrying a vector-database dependency.
//
// Vectors are stored normalized at ingest time, but query()
// still divides by both norms so un-normalized vectors (or a
// hand-edited index) rank correctly.
//
// Reference: Rust Book §13 (Iterators)
//            Rust Book §9 (Error Handling)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::evidence::{ChunkMetadata, EvidenceChunk};
use crate::domain::traits::SemanticIndex;

/// One embedded chunk as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    /// "{stem}_chunk_{i}" — stable across re-ingestions
    pub id: String,
    pub vector: Vec<f32>,
    pub texte: String,
    pub metadata: ChunkMetadata,
}

pub struct JsonVectorIndex {
    records: Vec<IndexRecord>,
}

impl JsonVectorIndex {
    /// Load the index from disk. A missing or unreadable file is
    /// an error — the caller (retriever) treats it as "index
    /// unavailable" and degrades.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("index introuvable : {}", path.display()))?;
        let records: Vec<IndexRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("index corrompu : {}", path.display()))?;
        tracing::info!("Vector index loaded: {} chunks", records.len());
        Ok(Self { records })
    }

    /// Write the full index atomically (temp file + rename).
    pub fn save(path: &Path, records: &[IndexRecord]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp: PathBuf = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string(records)?)?;
        fs::rename(&tmp, path)
            .with_context(|| format!("écriture de l'index {}", path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SemanticIndex for JsonVectorIndex {
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<EvidenceChunk>> {
        let mut scored: Vec<(f32, &IndexRecord)> = self
            .records
            .iter()
            .map(|r| (cosine(vector, &r.vector), r))
            .collect();

        // Best first. NaN scores (zero vectors) sort last.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, r)| EvidenceChunk {
                text:         r.texte.clone(),
                source_label: if r.metadata.source.is_empty() {
                    "N/A".to_string()
                } else {
                    r.metadata.source.clone()
                },
                metadata: r.metadata.clone(),
            })
            .collect())
    }
}

/// Cosine similarity. Zero-norm vectors score 0 instead of NaN.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, vector: Vec<f32>, texte: &str, source: &str) -> IndexRecord {
        IndexRecord {
            id: id.into(),
            vector,
            texte: texte.into(),
            metadata: ChunkMetadata { source: source.into(), ..ChunkMetadata::default() },
        }
    }

    #[test]
    fn test_cosine_orders_by_similarity() {
        let index = JsonVectorIndex {
            records: vec![
                record("a", vec![1.0, 0.0], "aligné", "A"),
                record("b", vec![0.0, 1.0], "orthogonal", "B"),
                record("c", vec![0.7, 0.7], "diagonal", "C"),
            ],
        };
        let top = index.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].text, "aligné");
        assert_eq!(top[1].text, "diagonal");
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        let index = JsonVectorIndex {
            records: vec![record("a", vec![1.0], "seul", "A")],
        };
        assert_eq!(index.query(&[1.0], 3).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_vector_scores_zero_not_nan() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kos_db/index.json");
        let records = vec![record("n1_chunk_0", vec![0.5, 0.5], "texte de norme", "CGI")];

        JsonVectorIndex::save(&path, &records).unwrap();
        let index = JsonVectorIndex::load(&path).unwrap();
        assert_eq!(index.len(), 1);

        let top = index.query(&[0.5, 0.5], 1).unwrap();
        assert_eq!(top[0].source_label, "CGI");
    }

    #[test]
    fn test_missing_index_is_an_error() {
        assert!(JsonVectorIndex::load(Path::new("/nonexistent/index.json")).is_err());
    }

    #[test]
    fn test_corrupt_index_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        fs::write(&path, "pas du json").unwrap();
        assert!(JsonVectorIndex::load(&path).is_err());
    }
}
