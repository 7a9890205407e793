// ============================================================
// Layer 2 — Audit Use Case
// ============================================================
// Stage A of the pipeline: audit every pending document.
//
// Per document, five steps:
//   1. Load it from the dropzone (frontmatter + body)
//   2. Retrieve norm evidence for its tags
//   3. Obtain a structured verdict from the reasoning service
//   4. Route the verdict to exactly one artifact file
//   5. Collect the result for the iteration log
//
// Fault containment:
//   - A missing API key is the ONLY fatal error, and it fires
//     BEFORE any document is touched — a misconfigured run
//     consumes nothing.
//   - Everything else is per-document: an unreadable file is
//     counted and skipped, a backend or parse failure becomes
//     an ERREUR verdict, and the loop keeps going.
//
// Reference: Rust Book §9 (Error Handling)
//            Clean Architecture pattern

use std::env;

use anyhow::Result;
use chrono::Local;

use crate::data::loader::DocumentLoader;
use crate::data::retriever::EvidenceRetriever;
use crate::domain::document::Document;
use crate::domain::traits::{Embedder, SemanticIndex};
use crate::infra::config::PipelineConfig;
use crate::infra::embedding::HttpEmbedder;
use crate::infra::iteration_log::{DocumentDetail, IterationLedger, IterationRecord};
use crate::infra::router::VerdictRouter;
use crate::infra::vector_index::JsonVectorIndex;
use crate::judgment::backend::AnthropicBackend;
use crate::judgment::client::JudgmentClient;

pub struct AuditUseCase {
    config: PipelineConfig,
}

impl AuditUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // Fail fast: a missing credential must abort before any
        // document is consumed.
        let backend = AnthropicBackend::from_env(&cfg.model, cfg.request_timeout_secs)?;
        let client = JudgmentClient::new(Box::new(backend), cfg.rate_input, cfg.rate_output);

        let retriever = self.build_retriever();
        let router = VerdictRouter::new(cfg);
        let loader = DocumentLoader::new(&cfg.dropzone_dir);

        let pipeline_id = env::var("CI_PIPELINE_ID").unwrap_or_else(|_| "local".to_string());
        let start = Local::now();

        let paths = loader.pending_paths()?;
        if paths.is_empty() {
            println!("  Aucun document en attente dans le dropzone.");
            return Ok(());
        }

        let mut details: Vec<DocumentDetail> = Vec::with_capacity(paths.len());
        let mut ignored = 0usize;

        for path in &paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  ► Traitement : {name}");

            let document = match loader.load(path) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Document '{name}' illisible, ignoré : {e}");
                    ignored += 1;
                    continue;
                }
            };

            let evidence = retriever.retrieve(&document.tags);
            let verdict = client.judge(&document, &evidence);
            let fichier_sorti = router.route(&document, &verdict)?;

            println!("  ✓ Verdict    : {}", verdict.category.as_str());
            println!("  ✓ Motif      : {}", verdict.motif);
            println!(
                "  ✓ Risque     : {}",
                verdict.niveau_risque.map(|r| r.as_str()).unwrap_or("")
            );
            println!(
                "  ✓ Action ERP : {}",
                verdict.action_erp.map(|a| a.as_str()).unwrap_or("")
            );
            println!("  ✓ Coût LLM   : {} EUR\n", verdict.usage.cout_estime_eur);

            details.push(detail_for(&document, &verdict, fichier_sorti));
        }

        let record = IterationRecord::aggregate(&pipeline_id, start, Local::now(), details);
        let summary = record.resume.clone();
        let iteration_id = IterationLedger::new(&cfg.iterations_log).append(record)?;
        println!("  ✓ Itération loguée : {iteration_id}");

        println!(
            "\n  Conformes : {} | Rejets : {} | Avertissements : {} | Erreurs : {} | Ignorés : {}",
            summary.get("CONFORME").copied().unwrap_or(0),
            summary.get("REJET").copied().unwrap_or(0),
            summary.get("AVERTISSEMENT").copied().unwrap_or(0),
            summary.get("ERREUR").copied().unwrap_or(0),
            ignored,
        );
        println!("  Pipeline terminé.\n");
        Ok(())
    }

    /// Semantic backend when an endpoint is configured AND the
    /// local index loads; substring fallback otherwise.
    fn build_retriever(&self) -> EvidenceRetriever {
        let cfg = &self.config;
        let Some(endpoint) = cfg.embed_endpoint.as_deref() else {
            tracing::info!("No embedding endpoint — substring retrieval only");
            return EvidenceRetriever::substring_only(cfg.norm_dirs.clone());
        };

        match JsonVectorIndex::load(&cfg.index_path) {
            Ok(index) if !index.is_empty() => {
                let embedder: Box<dyn Embedder> =
                    Box::new(HttpEmbedder::new(endpoint, cfg.request_timeout_secs));
                let index: Box<dyn SemanticIndex> = Box::new(index);
                EvidenceRetriever::new(cfg.norm_dirs.clone(), Some(embedder), Some(index))
            }
            Ok(_) => {
                tracing::warn!(
                    "Vector index '{}' is empty — substring retrieval only",
                    cfg.index_path.display()
                );
                EvidenceRetriever::substring_only(cfg.norm_dirs.clone())
            }
            Err(e) => {
                tracing::warn!(
                    "Vector index '{}' unavailable ({e}) — substring retrieval only",
                    cfg.index_path.display()
                );
                EvidenceRetriever::substring_only(cfg.norm_dirs.clone())
            }
        }
    }
}

fn detail_for(
    document: &Document,
    verdict: &crate::domain::verdict::Verdict,
    fichier_sorti: Option<String>,
) -> DocumentDetail {
    DocumentDetail {
        fichier:            document.filename.clone(),
        doc_type:           document.doc_type().to_string(),
        verdict:            verdict.category.as_str().to_string(),
        motif:              verdict.motif.clone(),
        articles_appliques: verdict.articles_appliques.clone(),
        niveau_risque:      verdict
            .niveau_risque
            .map(|r| r.as_str().to_string())
            .unwrap_or_default(),
        action_erp:         verdict
            .action_erp
            .map(|a| a.as_str().to_string())
            .unwrap_or_default(),
        llm:                verdict.usage.llm.clone(),
        tokens_input:       verdict.usage.input_tokens,
        tokens_output:      verdict.usage.output_tokens,
        cout_eur:           verdict.usage.cout_estime_eur,
        fichier_sorti,
    }
}
