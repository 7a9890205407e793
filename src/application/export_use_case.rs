// ============================================================
// Layer 2 — Export Use Case
// ============================================================
// Stage B of the pipeline: turn approved payloads into one
// ledger-import CSV batch, then archive the consumed payloads.
//
// Per-item isolation — one bad payload NEVER aborts the batch:
//   - unreadable / malformed JSON  → rejected
//   - unrecognized structure       → ignored
//   - double-entry integrity break → rejected
//   - valid                        → rows written, payload
//                                    queued for archiving
//
// Archiving happens strictly AFTER the CSV is flushed and
// closed. A crash mid-run leaves payloads in place, so the next
// run simply picks them up again.
//
// Reference: Rust Book §9 (Error Handling)
//            Clean Architecture pattern

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use crate::data::payload::{self, PayloadFile};
use crate::domain::integrity;
use crate::infra::config::PipelineConfig;
use crate::infra::erp_csv::{build_rows, CsvBatch};

/// End-of-run counters, printed and returned for tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub detected: usize,
    pub rows: usize,
    pub archived: usize,
    pub ignored: usize,
    pub rejected: usize,
    pub csv_filename: String,
}

pub struct ExportUseCase {
    config: PipelineConfig,
}

impl ExportUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ExportSummary> {
        let cfg = &self.config;
        fs::create_dir_all(&cfg.archive_dir)?;

        let paths = self.payload_paths()?;
        let mut summary = ExportSummary {
            detected: paths.len(),
            ..ExportSummary::default()
        };

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
        let date_jour = now.format("%d/%m/%Y").to_string();

        let mut batch = CsvBatch::create(&cfg.exports_dir, &timestamp)?;
        let mut to_archive: Vec<PathBuf> = Vec::new();

        for path in &paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let raw = match fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!("ERREUR [{name}] : fichier illisible — {e}");
                    summary.rejected += 1;
                    continue;
                }
            };

            let parsed: PayloadFile = match serde_json::from_str::<serde_json::Value>(&raw) {
                Err(e) => {
                    tracing::error!("ERREUR [{name}] : JSON malformé — {e}");
                    summary.rejected += 1;
                    continue;
                }
                Ok(value) => match serde_json::from_value(value) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        tracing::warn!("Structure non reconnue [{name}], ignoré : {e}");
                        summary.ignored += 1;
                        continue;
                    }
                },
            };

            let imputation = match payload::normalize(parsed) {
                Ok(imputation) => imputation,
                Err(e) => {
                    tracing::warn!("Structure incomplète [{name}], ignoré : {e}");
                    summary.ignored += 1;
                    continue;
                }
            };

            if let Err(e) = integrity::check(
                imputation.montant_ht,
                imputation.tva_deductible,
                imputation.montant_ttc,
            ) {
                tracing::error!("ERREUR [{name}] : {e}");
                summary.rejected += 1;
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("inconnu");
            let libelle = format!("Achat - {}", stem.trim_start_matches("PAYLOAD_"));

            let rows = build_rows(
                &imputation.compte_debit,
                &imputation.compte_credit,
                imputation.montant_ht,
                imputation.tva_deductible,
                imputation.montant_ttc,
                &imputation.statut,
                &date_jour,
                &cfg.journal_code,
                &cfg.tax_account,
                &libelle,
            );
            batch.write_rows(&rows)?;
            summary.rows += rows.len();
            to_archive.push(path.clone());
        }

        summary.csv_filename = batch.filename();
        // The CSV must be durable before any source file moves
        batch.finish()?;

        for path in &to_archive {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match fs::rename(path, cfg.archive_dir.join(&name)) {
                Ok(()) => summary.archived += 1,
                Err(e) => tracing::error!("Archivage impossible [{name}] : {e}"),
            }
        }

        println!("  Payloads détectés   : {}", summary.detected);
        println!("  Lignes exportées    : {}", summary.rows);
        println!("  Fichiers archivés   : {}", summary.archived);
        println!("  Fichiers ignorés    : {}", summary.ignored);
        println!("  Fichiers rejetés    : {}", summary.rejected);
        println!("  Fichier ERP         : {}", summary.csv_filename);

        Ok(summary)
    }

    /// Pending payloads, sorted by filename for stable batches.
    /// Archived payloads live in a subdirectory and are not
    /// picked up again.
    fn payload_paths(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.payloads_dir;
        if !dir.exists() {
            tracing::warn!("Payload directory '{}' does not exist", dir.display());
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("lecture du répertoire {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}
