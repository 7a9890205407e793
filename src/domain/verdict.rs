// ============================================================
// Layer 3 — Verdict Domain Type
// ============================================================
// The structured compliance decision returned by the reasoning
// service for one document. Field names follow the JSON wire
// format of the artifacts ("verdict", "motif", "_meta", ...)
// so a serialized Verdict is byte-compatible with the existing
// report and payload archives.
//
// Required vs optional:
//   - category is required: a reply without a parsable
//     "verdict" key fails strict decoding and the recovery
//     parser takes over (see judgment::parser)
//   - everything else defaults, because the external text
//     generator is unreliable by nature
//
// Reference: Rust Book §10 (Derive Macros)
//            serde.rs (field attributes, enum representations)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::posting::Posting;

/// The four possible audit outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictCategory {
    #[serde(rename = "CONFORME")]
    Conforme,
    #[serde(rename = "REJET")]
    Rejet,
    #[serde(rename = "AVERTISSEMENT")]
    Avertissement,
    #[serde(rename = "ERREUR")]
    Erreur,
}

impl VerdictCategory {
    /// Wire-format name, used for summary counters and console output.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictCategory::Conforme      => "CONFORME",
            VerdictCategory::Rejet         => "REJET",
            VerdictCategory::Avertissement => "AVERTISSEMENT",
            VerdictCategory::Erreur        => "ERREUR",
        }
    }
}

/// Risk level attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "FAIBLE")]
    Faible,
    #[serde(rename = "MOYEN")]
    Moyen,
    #[serde(rename = "ELEVE")]
    Eleve,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Faible => "FAIBLE",
            RiskLevel::Moyen  => "MOYEN",
            RiskLevel::Eleve  => "ELEVE",
        }
    }
}

/// What the ERP should do with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErpAction {
    #[serde(rename = "INJECTER")]
    Injecter,
    #[serde(rename = "BLOQUER")]
    Bloquer,
    #[serde(rename = "REVUE_HUMAINE")]
    RevueHumaine,
}

impl ErpAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErpAction::Injecter     => "INJECTER",
            ErpAction::Bloquer      => "BLOQUER",
            ErpAction::RevueHumaine => "REVUE_HUMAINE",
        }
    }
}

/// Token usage and cost metadata, attached by the JudgmentClient
/// after parsing — never trusted from the model reply itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageMeta {
    /// Identifier of the model that produced the verdict
    #[serde(default)]
    pub llm: String,

    #[serde(default)]
    pub input_tokens: u64,

    #[serde(default)]
    pub output_tokens: u64,

    /// Estimated cost in EUR, rounded to 5 decimal places
    #[serde(default)]
    pub cout_estime_eur: Decimal,
}

/// The full structured verdict for one document.
/// Produced exactly once per document; immutable; written into
/// exactly one routed artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "verdict")]
    pub category: VerdictCategory,

    /// Short explanation of the decision
    #[serde(default)]
    pub motif: String,

    /// Legal references the decision relies on
    #[serde(default)]
    pub articles_appliques: Vec<String>,

    /// Corrective actions, when applicable
    #[serde(default)]
    pub corrections_requises: Vec<String>,

    /// Suggested double-entry posting — only meaningful for
    /// CONFORME verdicts
    #[serde(default)]
    pub imputation_recommandee: Option<Posting>,

    #[serde(default)]
    pub niveau_risque: Option<RiskLevel>,

    #[serde(default)]
    pub action_erp: Option<ErpAction>,

    /// Filled in by the JudgmentClient, not by the model
    #[serde(rename = "_meta", default)]
    pub usage: UsageMeta,
}

impl Verdict {
    /// The sentinel verdict produced when a reply cannot be
    /// decoded at all. Carries the raw reply as the motif so
    /// nothing is lost for later inspection.
    pub fn erreur(motif: impl Into<String>) -> Self {
        Self {
            category:               VerdictCategory::Erreur,
            motif:                  motif.into(),
            articles_appliques:     Vec::new(),
            corrections_requises:   Vec::new(),
            imputation_recommandee: None,
            niveau_risque:          None,
            action_erp:             None,
            usage:                  UsageMeta::default(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_wire_names() {
        for (cat, name) in [
            (VerdictCategory::Conforme, "\"CONFORME\""),
            (VerdictCategory::Rejet, "\"REJET\""),
            (VerdictCategory::Avertissement, "\"AVERTISSEMENT\""),
            (VerdictCategory::Erreur, "\"ERREUR\""),
        ] {
            assert_eq!(serde_json::to_string(&cat).unwrap(), name);
        }
    }

    #[test]
    fn test_optional_fields_default() {
        let v: Verdict = serde_json::from_str(r#"{"verdict": "CONFORME"}"#).unwrap();
        assert_eq!(v.category, VerdictCategory::Conforme);
        assert!(v.motif.is_empty());
        assert!(v.imputation_recommandee.is_none());
        assert!(v.niveau_risque.is_none());
    }

    #[test]
    fn test_missing_category_is_a_decode_error() {
        assert!(serde_json::from_str::<Verdict>(r#"{"motif": "x"}"#).is_err());
    }

    #[test]
    fn test_erreur_sentinel_keeps_raw_motif() {
        let v = Verdict::erreur("désolé, je ne peux pas");
        assert_eq!(v.category, VerdictCategory::Erreur);
        assert_eq!(v.motif, "désolé, je ne peux pas");
    }
}
