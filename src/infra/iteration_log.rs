// ============================================================
// Layer 6 — Iteration Ledger
// ============================================================
// Durable, ordered history of every pipeline run. One run = one
// IterationRecord appended to a cumulative JSON array.
//
// The log file is the sole source of truth: the next sequential
// id is len(existing) + 1, formatted "ITER_%04d". A corrupted
// or missing file is treated as empty (with a warning) so the
// pipeline stays self-healing — history is lost, the run is not.
//
// Concurrency: the raw read-modify-write cycle is NEVER exposed
// to callers. The only public mutation is append(), and the
// rewrite goes through a temp file + atomic rename, so a crash
// mid-write can't leave a half-written log behind. Concurrent
// runs of the same stage remain the caller's job to serialize
// (one CI job at a time).
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-document detail kept inside an IterationRecord.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub fichier: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Verdict category wire name (CONFORME, REJET, ...)
    pub verdict: String,
    pub motif: String,
    pub articles_appliques: Vec<String>,
    pub niveau_risque: String,
    pub action_erp: String,
    pub llm: String,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cout_eur: Decimal,
    /// Artifact filename produced by the router, if any
    pub fichier_sorti: Option<String>,
}

/// Summary of one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// "ITER_%04d" — assigned by append(), never by the caller
    pub iteration_id: String,
    /// CI pipeline id, or "local"
    pub pipeline_id: String,
    pub timestamp_start: String,
    pub timestamp_end: String,
    pub duration_seconds: f64,
    pub documents_count: usize,
    /// Outcome counts per verdict category, all four keys always
    /// present
    pub resume: BTreeMap<String, u64>,
    pub cout_total_eur: Decimal,
    pub tokens_total_input: u64,
    pub tokens_total_output: u64,
    pub documents: Vec<DocumentDetail>,
}

impl IterationRecord {
    /// Aggregate one run's per-document details into a record.
    /// The iteration_id is left blank — append() fills it in.
    pub fn aggregate(
        pipeline_id: &str,
        start: DateTime<Local>,
        end: DateTime<Local>,
        documents: Vec<DocumentDetail>,
    ) -> Self {
        let mut resume: BTreeMap<String, u64> = ["CONFORME", "REJET", "AVERTISSEMENT", "ERREUR"]
            .into_iter()
            .map(|k| (k.to_string(), 0))
            .collect();

        let mut cout_total = Decimal::ZERO;
        let mut tokens_in = 0u64;
        let mut tokens_out = 0u64;

        for detail in &documents {
            *resume.entry(detail.verdict.clone()).or_insert(0) += 1;
            cout_total += detail.cout_eur;
            tokens_in += detail.tokens_input;
            tokens_out += detail.tokens_output;
        }

        let duration_ms = (end - start).num_milliseconds();
        let duration_seconds = ((duration_ms as f64 / 1000.0) * 100.0).round() / 100.0;

        Self {
            iteration_id:        String::new(),
            pipeline_id:         pipeline_id.to_string(),
            timestamp_start:     start.to_rfc3339(),
            timestamp_end:       end.to_rfc3339(),
            duration_seconds,
            documents_count:     documents.len(),
            resume,
            cout_total_eur:      cout_total.round_dp(5),
            tokens_total_input:  tokens_in,
            tokens_total_output: tokens_out,
            documents,
        }
    }
}

/// The append-only run log.
pub struct IterationLedger {
    path: PathBuf,
}

impl IterationLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one record, assigning the next sequential id.
    /// Returns the assigned id.
    pub fn append(&self, mut record: IterationRecord) -> Result<String> {
        let mut existing = self.read_all();
        record.iteration_id = format!("ITER_{:04}", existing.len() + 1);
        let id = record.iteration_id.clone();
        existing.push(record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Full rewrite through a temp file + rename, so a crash
        // mid-write never corrupts the existing log.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&existing)?)?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("écriture du journal {}", self.path.display()))?;

        Ok(id)
    }

    /// All recorded iterations. Missing file → empty; corrupt
    /// file → warning + empty (self-healing, never fatal).
    pub fn read_all(&self) -> Vec<IterationRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "Iteration log '{}' is corrupt ({e}) — starting over empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn detail(verdict: &str, cout: Decimal) -> DocumentDetail {
        DocumentDetail {
            fichier:            "FAC_001.md".into(),
            doc_type:           "facture_fournisseur".into(),
            verdict:            verdict.into(),
            motif:              String::new(),
            articles_appliques: vec![],
            niveau_risque:      String::new(),
            action_erp:         String::new(),
            llm:                "claude-sonnet-4-6".into(),
            tokens_input:       100,
            tokens_output:      50,
            cout_eur:           cout,
            fichier_sorti:      None,
        }
    }

    fn record(details: Vec<DocumentDetail>) -> IterationRecord {
        let start = Local.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let end   = Local.with_ymd_and_hms(2026, 8, 26, 12, 0, 42).unwrap();
        IterationRecord::aggregate("local", start, end, details)
    }

    #[test]
    fn test_aggregate_counts_and_sums() {
        let r = record(vec![
            detail("CONFORME", dec!(0.001)),
            detail("CONFORME", dec!(0.002)),
            detail("REJET", dec!(0.003)),
        ]);
        assert_eq!(r.documents_count, 3);
        assert_eq!(r.resume["CONFORME"], 2);
        assert_eq!(r.resume["REJET"], 1);
        assert_eq!(r.resume["ERREUR"], 0);
        assert_eq!(r.cout_total_eur, dec!(0.006));
        assert_eq!(r.tokens_total_input, 300);
        assert_eq!(r.duration_seconds, 42.0);
    }

    #[test]
    fn test_sequential_ids_across_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = IterationLedger::new(tmp.path().join("logs/iterations.json"));

        let id1 = ledger
            .append(record(vec![detail("CONFORME", dec!(0.001)), detail("REJET", dec!(0.001))]))
            .unwrap();
        let id2 = ledger
            .append(record(vec![
                detail("CONFORME", dec!(0.001)),
                detail("CONFORME", dec!(0.001)),
                detail("ERREUR", dec!(0)),
            ]))
            .unwrap();

        assert_eq!(id1, "ITER_0001");
        assert_eq!(id2, "ITER_0002");

        let all = ledger.read_all();
        assert_eq!(all.len(), 2);
        // Per-run counts, never cumulative across records
        assert_eq!(all[0].documents_count, 2);
        assert_eq!(all[1].documents_count, 3);
    }

    #[test]
    fn test_corrupt_log_treated_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("iterations.json");
        fs::write(&path, "{{{ pas du json").unwrap();

        let ledger = IterationLedger::new(&path);
        assert!(ledger.read_all().is_empty());

        // And appending starts over at 1
        let id = ledger.append(record(vec![])).unwrap();
        assert_eq!(id, "ITER_0001");
    }

    #[test]
    fn test_missing_log_treated_as_empty() {
        let ledger = IterationLedger::new("/nonexistent/iterations.json");
        assert!(ledger.read_all().is_empty());
    }
}
