// ============================================================
// Layer 2 — Ingest Use Case
// ============================================================
// Builds the local vector index from the norm corpus:
//
//   scan norm dirs → parse frontmatter → chunk → embed → save
//
// Each chunk inherits its parent document's frontmatter and is
// embedded with the "passage: " prefix; queries use "query: "
// (asymmetric retrieval, both prefixes are part of the model's
// contract). Chunk ids are "{stem}_chunk_{i}".
//
// Requires a reachable embedding endpoint — unlike the audit
// stage, there is no degraded mode here: an index of garbage is
// worse than no index.
//
// Reference: Rust Book §9 (Error Handling)
//            Clean Architecture pattern

use std::path::Path;

use anyhow::{bail, Result};
use walkdir::WalkDir;

use crate::data::chunker::Chunker;
use crate::data::loader::DocumentLoader;
use crate::domain::evidence::ChunkMetadata;
use crate::domain::traits::Embedder;
use crate::infra::config::PipelineConfig;
use crate::infra::embedding::HttpEmbedder;
use crate::infra::vector_index::{IndexRecord, JsonVectorIndex};

pub struct IngestUseCase {
    config: PipelineConfig,
}

impl IngestUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        let Some(endpoint) = cfg.embed_endpoint.as_deref() else {
            bail!("ingestion requires an embedding endpoint (--embed-endpoint)");
        };
        let embedder = HttpEmbedder::new(endpoint, cfg.request_timeout_secs);

        let chunker = Chunker::for_norms();
        let mut records: Vec<IndexRecord> = Vec::new();
        let mut documents = 0usize;

        for dir in &cfg.norm_dirs {
            if !dir.exists() {
                tracing::warn!("Norm directory '{}' does not exist, skipped", dir.display());
                continue;
            }
            for path in sorted_markdown_files(dir) {
                match self.ingest_file(&path, &chunker, &embedder, &mut records) {
                    Ok(()) => documents += 1,
                    Err(e) => {
                        tracing::warn!(
                            "Échec lecture {} : {e}",
                            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                        );
                    }
                }
            }
        }

        if records.is_empty() {
            tracing::warn!("Aucun chunk à ingérer — vérifier les répertoires de normes.");
            return Ok(());
        }

        JsonVectorIndex::save(&cfg.index_path, &records)?;
        println!(
            "  Ingestion terminée : {} documents, {} chunks → {}",
            documents,
            records.len(),
            cfg.index_path.display()
        );
        Ok(())
    }

    fn ingest_file(
        &self,
        path: &Path,
        chunker: &Chunker,
        embedder: &HttpEmbedder,
        records: &mut Vec<IndexRecord>,
    ) -> Result<()> {
        // The norm corpus shares the dropzone's frontmatter
        // format, so the same loader parses both.
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let document = DocumentLoader::new(parent).load(path)?;

        let field = |key: &str| document.fields.get(key).cloned().unwrap_or_default();
        let metadata = ChunkMetadata {
            norm_type:    field("type"),
            source:       field("source"),
            version:      field("version"),
            tags:         field("tags"),
            applicable_a: field("applicable_a"),
            fichier:      document.filename.clone(),
        };

        let stem = document.stem().to_string();
        for (i, chunk) in chunker.chunk(&document.body).into_iter().enumerate() {
            let vector = embedder.embed(&format!("passage: {chunk}"))?;
            records.push(IndexRecord {
                id:       format!("{stem}_chunk_{i}"),
                vector,
                texte:    chunk,
                metadata: metadata.clone(),
            });
        }

        tracing::info!("  Scanné : {}", document.filename);
        Ok(())
    }
}

/// Recursive, filename-sorted .md listing.
fn sorted_markdown_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut paths: Vec<std::path::PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    paths.sort();
    paths
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sorted_markdown_files_recurses_and_filters() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.md"), "x").unwrap();
        fs::write(tmp.path().join("sub/a.md"), "x").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let names: Vec<String> = sorted_markdown_files(tmp.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_missing_endpoint_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::from_base_dir(tmp.path());
        assert!(IngestUseCase::new(cfg).execute().is_err());
    }
}
