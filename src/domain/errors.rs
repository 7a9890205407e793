// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the pipeline can meet, classified by what the
// caller is allowed to do about it:
//
//   MalformedInput         → skip the item, count it, continue
//   MissingField           → skip the item, count it, continue
//   IntegrityViolation     → reject the item, count it, continue
//   ExternalServiceFailure → degrade (fallback / ERREUR verdict),
//                            never abort the batch
//   ConfigurationFailure   → fatal, aborts the run before any
//                            document is processed
//
// ConfigurationFailure is the ONLY variant that may surface as
// a non-zero process exit; everything else is absorbed by the
// use cases and reported in the run summary.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file could not be read or decoded at all
    #[error("entrée illisible : {0}")]
    MalformedInput(String),

    /// A required schema field is absent or empty
    #[error("champ obligatoire manquant : {0}")]
    MissingField(String),

    /// Debits and credits disagree beyond the tolerance.
    /// Carries the full numbers so the log line can show the
    /// exact discrepancy.
    #[error(
        "intégrité comptable violée : HT({ht}) + TVA({tva}) = {somme} ≠ TTC({ttc}) — écart {ecart}"
    )]
    IntegrityViolation {
        ht: Decimal,
        tva: Decimal,
        ttc: Decimal,
        /// Sum of the debit legs (ht + tva)
        somme: Decimal,
        /// Absolute discrepancy |ht + tva - ttc|
        ecart: Decimal,
    },

    /// A retrieval or judgment backend is unreachable or erroring
    #[error("service externe indisponible : {0}")]
    ExternalServiceFailure(String),

    /// Missing credentials or unusable configuration — fatal
    #[error("configuration invalide : {0}")]
    ConfigurationFailure(String),
}
