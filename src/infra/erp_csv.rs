// ============================================================
// Layer 6 — ERP CSV Batch Writer
// ============================================================
// Writes one ledger-import batch per export run:
//
//   exports/IMPORT_CEGID_{ts}.csv
//
// Semicolon-delimited, one fixed header row, then up to three
// rows per approved payload (HT débit, TVA débit, TTC crédit).
// Zero-amount legs are skipped: the HT and TTC rows appear when
// the amount is non-zero, the TVA row only when strictly
// positive.
//
// Ordering constraint: finish() flushes and closes the CSV, and
// MUST be called before any consumed payload is archived. A
// crash before finish() leaves every payload in place for the
// next run; a crash after leaves at worst an already-complete
// CSV plus a few unarchived payloads, which re-export
// harmlessly duplicated rows — never a truncated batch with
// vanished sources.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::domain::posting::{LedgerRow, Side};

pub const CSV_HEADER: &str = "DATE;JOURNAL;COMPTE;SENS;MONTANT;LIBELLE;STATUT_KOS";

/// Build the ledger rows for one canonical imputation.
/// `date` is already formatted DD/MM/YYYY.
pub fn build_rows(
    compte_debit: &str,
    compte_credit: &str,
    montant_ht: Decimal,
    tva_deductible: Decimal,
    montant_ttc: Decimal,
    statut: &str,
    date: &str,
    journal: &str,
    tax_account: &str,
    libelle: &str,
) -> Vec<LedgerRow> {
    let mut rows = Vec::with_capacity(3);

    if !montant_ht.is_zero() {
        rows.push(LedgerRow {
            date:    date.to_string(),
            journal: journal.to_string(),
            compte:  compte_debit.to_string(),
            sens:    Side::Debit,
            montant: montant_ht,
            libelle: libelle.to_string(),
            statut:  statut.to_string(),
        });
    }

    if tva_deductible > Decimal::ZERO {
        rows.push(LedgerRow {
            date:    date.to_string(),
            journal: journal.to_string(),
            compte:  tax_account.to_string(),
            sens:    Side::Debit,
            montant: tva_deductible,
            libelle: libelle.to_string(),
            statut:  statut.to_string(),
        });
    }

    if !montant_ttc.is_zero() {
        rows.push(LedgerRow {
            date:    date.to_string(),
            journal: journal.to_string(),
            compte:  compte_credit.to_string(),
            sens:    Side::Credit,
            montant: montant_ttc,
            libelle: libelle.to_string(),
            statut:  statut.to_string(),
        });
    }

    rows
}

/// One open CSV batch. Created with the header already written,
/// consumed by finish().
pub struct CsvBatch {
    path: PathBuf,
    writer: BufWriter<File>,
    rows_written: usize,
}

impl CsvBatch {
    /// Open exports/IMPORT_CEGID_{timestamp}.csv and write the
    /// header row.
    pub fn create(exports_dir: &PathBuf, timestamp: &str) -> Result<Self> {
        fs::create_dir_all(exports_dir)?;
        let path = exports_dir.join(format!("IMPORT_CEGID_{timestamp}.csv"));
        let file = File::create(&path)
            .with_context(|| format!("création du batch CSV {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}")?;

        Ok(Self { path, writer, rows_written: 0 })
    }

    pub fn write_rows(&mut self, rows: &[LedgerRow]) -> Result<()> {
        for row in rows {
            writeln!(self.writer, "{}", row.to_csv_line())?;
            self.rows_written += 1;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Flush and close the file. Archiving consumed payloads is
    /// only legal after this returns Ok.
    pub fn finish(self) -> Result<()> {
        let mut writer = self.writer;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("fermeture du batch CSV : {e}"))?
            .sync_all()?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rows_for(ht: Decimal, tva: Decimal, ttc: Decimal) -> Vec<LedgerRow> {
        build_rows(
            "62888", "401", ht, tva, ttc,
            "INJECTER", "26/08/2026", "ACH", "44566", "Achat - FAC_001",
        )
    }

    #[test]
    fn test_full_posting_produces_three_rows() {
        let rows = rows_for(dec!(100.00), dec!(20.00), dec!(120.00));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].compte, "62888");
        assert_eq!(rows[0].sens, Side::Debit);
        assert_eq!(rows[1].compte, "44566");
        assert_eq!(rows[2].compte, "401");
        assert_eq!(rows[2].sens, Side::Credit);
        assert_eq!(rows[2].montant, dec!(120.00));
    }

    #[test]
    fn test_zero_tax_skips_tva_row() {
        let rows = rows_for(dec!(50.00), dec!(0), dec!(50.00));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].compte, "62888");
        assert_eq!(rows[1].compte, "401");
    }

    #[test]
    fn test_negative_tax_skips_tva_row() {
        // Strictly-positive rule: a negative TVA never becomes a row
        let rows = rows_for(dec!(50.00), dec!(-1.00), dec!(49.00));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_batch_writes_header_then_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let exports = tmp.path().to_path_buf();

        let mut batch = CsvBatch::create(&exports, "20260826_120000").unwrap();
        batch.write_rows(&rows_for(dec!(100.00), dec!(20.00), dec!(120.00))).unwrap();
        assert_eq!(batch.rows_written(), 3);
        let name = batch.filename();
        batch.finish().unwrap();

        assert_eq!(name, "IMPORT_CEGID_20260826_120000.csv");
        let written = fs::read_to_string(exports.join(&name)).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "26/08/2026;ACH;62888;D;100.00;Achat - FAC_001;INJECTER");
        assert_eq!(lines[3], "26/08/2026;ACH;401;C;120.00;Achat - FAC_001;INJECTER");
    }

    #[test]
    fn test_empty_batch_is_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let exports = tmp.path().to_path_buf();

        let batch = CsvBatch::create(&exports, "20260826_120000").unwrap();
        let name = batch.filename();
        batch.finish().unwrap();

        let written = fs::read_to_string(exports.join(name)).unwrap();
        assert_eq!(written.trim(), CSV_HEADER);
    }
}
