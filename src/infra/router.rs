// ============================================================
// Layer 6 — Verdict Router
// ============================================================
// Persists one verdict as exactly one artifact, chosen by the
// verdict category:
//
//   REJET, AVERTISSEMENT → RAPPORT_{stem}_{ts}.json (reports)
//   CONFORME             → PAYLOAD_{stem}_{ts}.json (payloads)
//   ERREUR               → configurable: a rejection report
//                          (default) or no artifact at all
//
// Filenames embed the document stem plus a timestamp, so
// re-auditing the same document at a later time creates a NEW
// file. That is intentional: the artifact directories are an
// append-only audit trail, not a cache. Artifacts are never
// edited after creation — the export stage only MOVES them.
//
// The approved payload carries the 3-leg écriture the exporter
// consumes: débit HT on the recommended expense account, débit
// TVA on the fixed tax account, crédit TTC on the recommended
// supplier account.
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json (json! macro)

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use rust_decimal::Decimal;
use serde_json::json;

use crate::domain::document::Document;
use crate::domain::verdict::{Verdict, VerdictCategory};
use crate::infra::config::PipelineConfig;

pub struct VerdictRouter {
    reports_dir: PathBuf,
    payloads_dir: PathBuf,
    tax_account: String,
    journal_code: String,
    route_error_verdicts: bool,
}

impl VerdictRouter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            reports_dir:          config.reports_dir.clone(),
            payloads_dir:         config.payloads_dir.clone(),
            tax_account:          config.tax_account.clone(),
            journal_code:         config.journal_code.clone(),
            route_error_verdicts: config.route_error_verdicts,
        }
    }

    /// Route one verdict. Returns the artifact filename, or None
    /// when the category produces no artifact (ERREUR with error
    /// routing disabled).
    pub fn route(&self, document: &Document, verdict: &Verdict) -> Result<Option<String>> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.route_at(document, verdict, &timestamp)
    }

    /// Timestamp-injectable variant so tests get deterministic
    /// filenames.
    fn route_at(
        &self,
        document: &Document,
        verdict: &Verdict,
        timestamp: &str,
    ) -> Result<Option<String>> {
        match verdict.category {
            VerdictCategory::Rejet | VerdictCategory::Avertissement => {
                Ok(Some(self.write_report(document, verdict, timestamp)?))
            }
            VerdictCategory::Erreur if self.route_error_verdicts => {
                Ok(Some(self.write_report(document, verdict, timestamp)?))
            }
            VerdictCategory::Erreur => {
                tracing::warn!(
                    "ERREUR verdict for '{}' routed nowhere (error routing disabled)",
                    document.filename
                );
                Ok(None)
            }
            VerdictCategory::Conforme => {
                Ok(Some(self.write_payload(document, verdict, timestamp)?))
            }
        }
    }

    /// RejectionReport: the full verdict, wrapped with source and
    /// audit date.
    fn write_report(
        &self,
        document: &Document,
        verdict: &Verdict,
        timestamp: &str,
    ) -> Result<String> {
        let report = json!({
            "document_source": document.filename,
            "date_audit": timestamp,
            "verdict": verdict,
        });

        let name = format!("RAPPORT_{}_{}.json", document.stem(), timestamp);
        self.write_artifact(&self.reports_dir, &name, &report)?;
        tracing::info!("  → RAPPORT REJET  : {name}");
        Ok(name)
    }

    /// ApprovedPayload: the ergo_pgi_export_v1 envelope with the
    /// 3-leg écriture.
    fn write_payload(
        &self,
        document: &Document,
        verdict: &Verdict,
        timestamp: &str,
    ) -> Result<String> {
        let imputation = verdict.imputation_recommandee.clone().unwrap_or_default();

        let payload = json!({
            "ergo_pgi_export_v1": {
                "document_source": document.filename,
                "date_export": timestamp,
                "compliance_status": "conforme",
                "analyse_par": verdict.usage.llm,
                "cout_eur": verdict.usage.cout_estime_eur,
                "ecriture": {
                    "journal": self.journal_code,
                    "libelle": format!("Import auto — {}", document.filename),
                    "lignes": [
                        {
                            "compte": imputation.compte_debit,
                            "debit": imputation.montant_ht,
                            "credit": Decimal::ZERO,
                        },
                        {
                            "compte": self.tax_account,
                            "debit": imputation.tva_deductible,
                            "credit": Decimal::ZERO,
                        },
                        {
                            "compte": imputation.compte_credit,
                            "debit": Decimal::ZERO,
                            "credit": imputation.montant_ttc,
                        },
                    ],
                },
            }
        });

        let name = format!("PAYLOAD_{}_{}.json", document.stem(), timestamp);
        self.write_artifact(&self.payloads_dir, &name, &payload)?;
        tracing::info!("  → PAYLOAD ERP    : {name}");
        Ok(name)
    }

    fn write_artifact(
        &self,
        dir: &PathBuf,
        name: &str,
        content: &serde_json::Value,
    ) -> Result<()> {
        fs::create_dir_all(dir)?;
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(content)?)
            .with_context(|| format!("écriture de l'artefact {}", path.display()))?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posting::Posting;
    use crate::domain::verdict::UsageMeta;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn doc() -> Document {
        Document {
            id:       "FAC_001".into(),
            filename: "FAC_001.md".into(),
            tags:     vec![],
            fields:   BTreeMap::new(),
            body:     String::new(),
        }
    }

    fn conforme_verdict() -> Verdict {
        let mut v = Verdict::erreur("");
        v.category = VerdictCategory::Conforme;
        v.imputation_recommandee = Some(Posting {
            compte_debit:       "62888".into(),
            compte_credit:      "401".into(),
            montant_ht:         dec!(100.00),
            tva_deductible:     dec!(20.00),
            tva_non_deductible: dec!(0),
            montant_ttc:        dec!(120.00),
        });
        v.usage = UsageMeta {
            llm:             "claude-sonnet-4-6".into(),
            input_tokens:    100,
            output_tokens:   50,
            cout_estime_eur: dec!(0.00105),
        };
        v
    }

    fn router(base: &std::path::Path, route_errors: bool) -> VerdictRouter {
        let mut cfg = PipelineConfig::from_base_dir(base);
        cfg.route_error_verdicts = route_errors;
        VerdictRouter::new(&cfg)
    }

    #[test]
    fn test_rejet_writes_report() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), true);

        let mut v = Verdict::erreur("TVA non déductible");
        v.category = VerdictCategory::Rejet;

        let name = r.route_at(&doc(), &v, "20260826_120000").unwrap().unwrap();
        assert_eq!(name, "RAPPORT_FAC_001_20260826_120000.json");

        let written = fs::read_to_string(tmp.path().join("reports").join(&name)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["document_source"], "FAC_001.md");
        assert_eq!(value["verdict"]["verdict"], "REJET");
    }

    #[test]
    fn test_conforme_writes_payload_with_three_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), true);

        let name = r
            .route_at(&doc(), &conforme_verdict(), "20260826_120000")
            .unwrap()
            .unwrap();
        assert_eq!(name, "PAYLOAD_FAC_001_20260826_120000.json");

        let written = fs::read_to_string(tmp.path().join("payloads").join(&name)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let lignes = &value["ergo_pgi_export_v1"]["ecriture"]["lignes"];
        assert_eq!(lignes.as_array().unwrap().len(), 3);
        assert_eq!(lignes[0]["compte"], "62888");
        assert_eq!(lignes[0]["debit"], 100.0);
        assert_eq!(lignes[1]["compte"], "44566");
        assert_eq!(lignes[1]["debit"], 20.0);
        assert_eq!(lignes[2]["credit"], 120.0);
        assert_eq!(value["ergo_pgi_export_v1"]["compliance_status"], "conforme");
    }

    #[test]
    fn test_erreur_routed_as_report_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), true);

        let v = Verdict::erreur("réponse illisible");
        let name = r.route_at(&doc(), &v, "20260826_120000").unwrap();
        assert!(name.unwrap().starts_with("RAPPORT_"));
    }

    #[test]
    fn test_erreur_routed_nowhere_when_disabled() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), false);

        let v = Verdict::erreur("réponse illisible");
        assert!(r.route_at(&doc(), &v, "20260826_120000").unwrap().is_none());
        // And nothing was written anywhere
        assert!(!tmp.path().join("reports").exists());
        assert!(!tmp.path().join("payloads").exists());
    }

    #[test]
    fn test_repeated_routing_appends_new_files() {
        let tmp = tempfile::tempdir().unwrap();
        let r = router(tmp.path(), true);
        let v = conforme_verdict();

        r.route_at(&doc(), &v, "20260826_120000").unwrap();
        r.route_at(&doc(), &v, "20260826_130000").unwrap();

        let count = fs::read_dir(tmp.path().join("payloads")).unwrap().count();
        assert_eq!(count, 2);
    }
}
