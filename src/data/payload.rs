// ============================================================
// Layer 4 — Payload Shapes & Normalization
// ============================================================
// The export stage must accept TWO historical payload schemas:
//
//   1. Rich (current): produced by the verdict router —
//      { "ergo_pgi_export_v1": { "ecriture": { "lignes": [
//            débit HT, débit TVA, ..., crédit TTC ] } } }
//      Ligne 0 is always the net debit, ligne 1 the tax debit
//      (only when 3+ lignes exist), and the LAST ligne the
//      gross credit.
//
//   2. Flat (legacy): a raw verdict dump —
//      { "verdict": { "imputation_recommandee": {
//            "montant_ht": ..., "montant_ttc": ... } } }
//
// serde's untagged enum tries each shape in order, and the
// adapter below normalizes either into ONE canonical Imputation
// before any validation runs. Nothing downstream of this module
// knows two schemas ever existed.
//
// Account labels in rich payloads sometimes carry a trailing
// description ("62888 — Charges diverses"); everything after an
// em- or en-dash separator is stripped.
//
// Reference: serde.rs (untagged enum representations)
//            Rust Book §6 (Enums and Pattern Matching)

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::errors::PipelineError;

/// Default accounts when a payload omits them.
const DEFAULT_DEBIT_ACCOUNT: &str = "62888";
const DEFAULT_CREDIT_ACCOUNT: &str = "401";
/// Default export status when the payload declares none.
const DEFAULT_STATUS: &str = "A_VALIDER";

/// Either of the two accepted payload schemas.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PayloadFile {
    Rich {
        ergo_pgi_export_v1: RichExport,
    },
    Flat {
        verdict: FlatVerdict,
    },
}

/// The `ergo_pgi_export_v1` block of a rich payload.
#[derive(Debug, Deserialize)]
pub struct RichExport {
    #[serde(default)]
    pub compliance_status: String,
    #[serde(default)]
    pub ecriture: Ecriture,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ecriture {
    #[serde(default)]
    pub lignes: Vec<Ligne>,
}

/// One posting line of a rich payload.
#[derive(Debug, Default, Deserialize)]
pub struct Ligne {
    #[serde(default)]
    pub compte: Option<String>,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

/// The `verdict` block of a flat payload. Only the fields the
/// exporter needs — everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct FlatVerdict {
    #[serde(default)]
    pub imputation_recommandee: Option<FlatImputation>,
    #[serde(default)]
    pub action_erp: Option<String>,
}

/// Flat imputation block. The two amounts are Options on
/// purpose: their PRESENCE is a schema requirement, a defaulted
/// zero would hide a broken payload.
#[derive(Debug, Deserialize)]
pub struct FlatImputation {
    #[serde(default)]
    pub compte_debit: Option<String>,
    #[serde(default)]
    pub compte_credit: Option<String>,
    pub montant_ht: Option<Decimal>,
    #[serde(default)]
    pub tva_deductible: Decimal,
    pub montant_ttc: Option<Decimal>,
}

/// The canonical posting extracted from either schema. This is
/// the ONLY shape the integrity check and CSV writer ever see.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub compte_debit: String,
    pub compte_credit: String,
    pub montant_ht: Decimal,
    pub tva_deductible: Decimal,
    pub montant_ttc: Decimal,
    /// Export status stamped on every CSV row for this item
    pub statut: String,
}

/// Normalize either payload shape into the canonical Imputation.
/// Structure problems surface as MissingField — the caller skips
/// the item and continues the batch.
pub fn normalize(payload: PayloadFile) -> Result<Imputation, PipelineError> {
    match payload {
        PayloadFile::Rich { ergo_pgi_export_v1 } => normalize_rich(ergo_pgi_export_v1),
        PayloadFile::Flat { verdict } => normalize_flat(verdict),
    }
}

fn normalize_rich(export: RichExport) -> Result<Imputation, PipelineError> {
    let lignes = &export.ecriture.lignes;
    if lignes.len() < 2 {
        return Err(PipelineError::MissingField(
            "ergo_pgi_export_v1.ecriture.lignes (moins de 2 lignes)".into(),
        ));
    }

    let ligne_ht  = &lignes[0];
    // The dedicated tax line only exists in 3-line écritures
    let tva = if lignes.len() >= 3 { lignes[1].debit } else { Decimal::ZERO };
    let ligne_ttc = &lignes[lignes.len() - 1];

    let statut = if export.compliance_status.is_empty() {
        DEFAULT_STATUS.to_string()
    } else {
        export.compliance_status.to_uppercase()
    };

    Ok(Imputation {
        compte_debit:  clean_account(ligne_ht.compte.as_deref(), DEFAULT_DEBIT_ACCOUNT),
        compte_credit: clean_account(ligne_ttc.compte.as_deref(), DEFAULT_CREDIT_ACCOUNT),
        montant_ht:    ligne_ht.debit,
        tva_deductible: tva,
        montant_ttc:   ligne_ttc.credit,
        statut,
    })
}

fn normalize_flat(verdict: FlatVerdict) -> Result<Imputation, PipelineError> {
    let imputation = verdict
        .imputation_recommandee
        .ok_or_else(|| PipelineError::MissingField("verdict.imputation_recommandee".into()))?;

    let montant_ht = imputation
        .montant_ht
        .ok_or_else(|| PipelineError::MissingField("imputation_recommandee.montant_ht".into()))?;
    let montant_ttc = imputation
        .montant_ttc
        .ok_or_else(|| PipelineError::MissingField("imputation_recommandee.montant_ttc".into()))?;

    Ok(Imputation {
        compte_debit: imputation
            .compte_debit
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_DEBIT_ACCOUNT.to_string()),
        compte_credit: imputation
            .compte_credit
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CREDIT_ACCOUNT.to_string()),
        montant_ht,
        tva_deductible: imputation.tva_deductible,
        montant_ttc,
        statut: verdict
            .action_erp
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
    })
}

/// Strip a trailing dash-separated description from an account
/// label: "62888 — Charges diverses" → "62888".
fn clean_account(raw: Option<&str>, default: &str) -> String {
    let cleaned = raw
        .unwrap_or("")
        .split(" —")
        .next()
        .unwrap_or("")
        .split(" –")
        .next()
        .unwrap_or("")
        .trim();
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(json: &str) -> PayloadFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rich_payload_normalizes_three_lines() {
        let payload = parse(
            r#"{
              "ergo_pgi_export_v1": {
                "document_source": "FAC_001.md",
                "compliance_status": "conforme",
                "ecriture": {
                  "journal": "ACH",
                  "lignes": [
                    {"compte": "62888 — Charges diverses", "debit": 100.0, "credit": 0},
                    {"compte": "44566", "debit": 20.0, "credit": 0},
                    {"compte": "401", "debit": 0, "credit": 120.0}
                  ]
                }
              }
            }"#,
        );
        let imp = normalize(payload).unwrap();
        assert_eq!(imp.compte_debit, "62888");
        assert_eq!(imp.compte_credit, "401");
        assert_eq!(imp.montant_ht, dec!(100));
        assert_eq!(imp.tva_deductible, dec!(20));
        assert_eq!(imp.montant_ttc, dec!(120));
        assert_eq!(imp.statut, "CONFORME");
    }

    #[test]
    fn test_rich_payload_two_lines_has_zero_tax() {
        let payload = parse(
            r#"{"ergo_pgi_export_v1": {"ecriture": {"lignes": [
                {"compte": "62888", "debit": 100.0, "credit": 0},
                {"compte": "401", "debit": 0, "credit": 100.0}
            ]}}}"#,
        );
        let imp = normalize(payload).unwrap();
        assert_eq!(imp.tva_deductible, Decimal::ZERO);
        assert_eq!(imp.montant_ttc, dec!(100));
        // No declared status → default
        assert_eq!(imp.statut, "A_VALIDER");
    }

    #[test]
    fn test_rich_payload_single_line_is_missing_field() {
        let payload = parse(
            r#"{"ergo_pgi_export_v1": {"ecriture": {"lignes": [
                {"compte": "62888", "debit": 100.0}
            ]}}}"#,
        );
        assert!(matches!(
            normalize(payload).unwrap_err(),
            PipelineError::MissingField(_)
        ));
    }

    #[test]
    fn test_flat_payload_normalizes() {
        let payload = parse(
            r#"{"verdict": {
                "verdict": "CONFORME",
                "action_erp": "INJECTER",
                "imputation_recommandee": {
                    "compte_debit": "6234",
                    "compte_credit": "401",
                    "montant_ht": 100.0,
                    "tva_deductible": 20.0,
                    "montant_ttc": 120.0
                }
            }}"#,
        );
        let imp = normalize(payload).unwrap();
        assert_eq!(imp.compte_debit, "6234");
        assert_eq!(imp.statut, "INJECTER");
        assert_eq!(imp.montant_ht, dec!(100));
    }

    #[test]
    fn test_flat_payload_missing_imputation_is_missing_field() {
        let payload = parse(r#"{"verdict": {"verdict": "CONFORME"}}"#);
        let err = normalize(payload).unwrap_err();
        assert!(err.to_string().contains("imputation_recommandee"));
    }

    #[test]
    fn test_flat_payload_missing_amounts_is_missing_field() {
        let payload = parse(
            r#"{"verdict": {"imputation_recommandee": {"compte_debit": "6234"}}}"#,
        );
        assert!(matches!(
            normalize(payload).unwrap_err(),
            PipelineError::MissingField(_)
        ));
    }

    #[test]
    fn test_flat_payload_defaults_accounts_and_status() {
        let payload = parse(
            r#"{"verdict": {"imputation_recommandee": {
                "montant_ht": 50.0, "montant_ttc": 50.0
            }}}"#,
        );
        let imp = normalize(payload).unwrap();
        assert_eq!(imp.compte_debit, "62888");
        assert_eq!(imp.compte_credit, "401");
        assert_eq!(imp.statut, "A_VALIDER");
    }

    #[test]
    fn test_neither_shape_fails_decoding() {
        let result: Result<PayloadFile, _> = serde_json::from_str(r#"{"autre": 1}"#);
        assert!(result.is_err());
    }
}
