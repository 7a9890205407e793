// ============================================================
// Layer 3 — Double-Entry Integrity Gate
// ============================================================
// The one hard numeric correctness check in the system.
//
// The fundamental law of double-entry accounting says the sum
// of debits equals the sum of credits for any transaction. For
// our 3-leg postings that reduces to:
//
//     montant_ht + tva_deductible = montant_ttc
//
// An unbalanced posting injected into the ERP corrupts the
// external ledger, so a violation must PREVENT export — the
// numbers are never silently "fixed".
//
// The tolerance of 0.01 currency units exists because upstream
// systems legitimately round each leg to the cent; it is an
// absolute tolerance, not a relative one.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::errors::PipelineError;

/// Maximum acceptable |HT + TVA - TTC|, in currency units.
pub const TOLERANCE: Decimal = dec!(0.01);

/// Check the double-entry invariant on one posting.
///
/// Returns Ok(()) iff |net + tax - gross| <= 0.01; otherwise an
/// IntegrityViolation carrying the computed discrepancy so the
/// caller can log the exact numbers.
pub fn check(net: Decimal, tax: Decimal, gross: Decimal) -> Result<(), PipelineError> {
    let somme = net + tax;
    let ecart = (somme - gross).abs();
    if ecart <= TOLERANCE {
        Ok(())
    } else {
        Err(PipelineError::IntegrityViolation {
            ht: net,
            tva: tax,
            ttc: gross,
            somme,
            ecart,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_posting_passes() {
        assert!(check(dec!(100.00), dec!(20.00), dec!(120.00)).is_ok());
    }

    #[test]
    fn test_zero_tax_posting_passes() {
        assert!(check(dec!(100.00), dec!(0.00), dec!(100.00)).is_ok());
    }

    #[test]
    fn test_discrepancy_exactly_at_tolerance_passes() {
        // 0.01 is inside the gate, strictly more is not
        assert!(check(dec!(100.00), dec!(20.00), dec!(120.01)).is_ok());
        assert!(check(dec!(100.00), dec!(20.00), dec!(119.99)).is_ok());
    }

    #[test]
    fn test_discrepancy_just_past_tolerance_fails() {
        assert!(check(dec!(100.00), dec!(20.00), dec!(120.02)).is_err());
    }

    #[test]
    fn test_violation_carries_exact_discrepancy() {
        let err = check(dec!(100.00), dec!(20.00), dec!(125.00)).unwrap_err();
        match err {
            PipelineError::IntegrityViolation { ecart, somme, .. } => {
                assert_eq!(ecart, dec!(5.00));
                assert_eq!(somme, dec!(120.00));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_discrepancy_uses_absolute_value() {
        let err = check(dec!(100.00), dec!(30.00), dec!(120.00)).unwrap_err();
        match err {
            PipelineError::IntegrityViolation { ecart, .. } => assert_eq!(ecart, dec!(10.00)),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
