// ============================================================
// Layer 3 — Posting Domain Type
// ============================================================
// One balanced double-entry accounting movement: a net leg, an
// optional deductible-tax leg, and a gross leg.
//
// Why rust_decimal::Decimal and not f64?
//   Monetary amounts must be exact. With binary floats,
//   100.00 + 20.00 can come out as 119.99999999999999, and a
//   rounding leak like that would trip (or worse, mask) the
//   double-entry integrity check downstream. Decimal stores
//   base-10 digits, so 0.01 is exactly 0.01.
//
// Wire keys are the original artifact keys (montant_ht, ...),
// serialized as plain JSON numbers via the serde-float feature.
//
// Reference: rust_decimal crate documentation
//            Rust Book §5 (Structs)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The posting suggested by a CONFORME verdict.
/// Every amount defaults to zero so a partially filled
/// imputation block still decodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Posting {
    /// Expense account receiving the net debit (e.g. 62888)
    #[serde(default)]
    pub compte_debit: String,

    /// Supplier account receiving the gross credit (e.g. 401)
    #[serde(default)]
    pub compte_credit: String,

    /// Net amount (hors taxe)
    #[serde(default)]
    pub montant_ht: Decimal,

    /// Deductible tax, debited to the fixed tax account
    #[serde(default)]
    pub tva_deductible: Decimal,

    /// Non-deductible tax — informational, carried but never
    /// exported as its own ledger row
    #[serde(default)]
    pub tva_non_deductible: Decimal,

    /// Gross amount (toutes taxes comprises)
    #[serde(default)]
    pub montant_ttc: Decimal,
}

/// Which side of the ledger a row lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Single-letter CSV code: D for débit, C for crédit.
    pub fn code(&self) -> &'static str {
        match self {
            Side::Debit  => "D",
            Side::Credit => "C",
        }
    }
}

/// One row of the ledger-import CSV. Ephemeral — built by the
/// export batcher and written straight out, never persisted.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    /// Posting date, formatted DD/MM/YYYY
    pub date: String,
    pub journal: String,
    pub compte: String,
    pub sens: Side,
    pub montant: Decimal,
    pub libelle: String,
    pub statut: String,
}

impl LedgerRow {
    /// Render as one semicolon-delimited CSV line.
    /// Amounts always carry exactly 2 decimal places.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{};{};{};{};{:.2};{};{}",
            self.date,
            self.journal,
            self.compte,
            self.sens.code(),
            self.montant,
            self.libelle,
            self.statut,
        )
    }
}
