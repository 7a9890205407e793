// ============================================================
// Layer 6 — Pipeline Configuration
// ============================================================
// One explicit struct holding every filesystem path and tunable
// the pipeline uses. No component reads process-wide path state:
// the CLI builds a PipelineConfig once and passes it down, which
// keeps every component constructible in a tempdir for tests.
//
// Directory layout rooted at `base_dir`:
//
//   base/
//   ├── norms/
//   │   ├── legal/        ← legal corpus (.md with frontmatter)
//   │   └── sop/          ← internal SOP corpus
//   ├── dropzone/         ← documents awaiting audit (input)
//   ├── reports/          ← RAPPORT_*.json (rejections/warnings)
//   ├── payloads/         ← PAYLOAD_*.json (approved, pending export)
//   │   └── archive/      ← payloads already exported
//   ├── exports/          ← IMPORT_ERP_*.csv batches
//   ├── kos_db/
//   │   └── index.json    ← local vector index (optional)
//   └── logs/
//       └── iterations.json
//
// Reference: Rust Book §7 (Module System)
//            Rust Book §12 (Accepting Command Line Arguments)

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Everything the two pipeline stages need to know about their
/// environment. Built by the CLI layer, immutable afterwards.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories scanned by the degraded-mode norm search
    pub norm_dirs: Vec<PathBuf>,

    /// Input documents awaiting audit
    pub dropzone_dir: PathBuf,

    /// Rejection/warning reports (stage A output)
    pub reports_dir: PathBuf,

    /// Approved ERP payloads (stage A output, stage B input)
    pub payloads_dir: PathBuf,

    /// CSV import batches (stage B output)
    pub exports_dir: PathBuf,

    /// Consumed payloads are moved here after a successful export
    pub archive_dir: PathBuf,

    /// Local vector index queried by the retriever's primary path
    pub index_path: PathBuf,

    /// Append-only iteration log (JSON array)
    pub iterations_log: PathBuf,

    /// HTTP endpoint of the embedding service; None disables the
    /// semantic primary path entirely (degraded mode)
    pub embed_endpoint: Option<String>,

    /// Reasoning model identifier
    pub model: String,

    /// Cost per input token, EUR
    pub rate_input: Decimal,

    /// Cost per output token, EUR
    pub rate_output: Decimal,

    /// Account receiving the deductible-tax debit leg
    pub tax_account: String,

    /// Journal code stamped on every exported row
    pub journal_code: String,

    /// Whether ERREUR verdicts also produce a rejection report.
    /// false reproduces the historical behaviour (errors only
    /// appear in the iteration log).
    pub route_error_verdicts: bool,

    /// Timeout for outbound HTTP calls, seconds
    pub request_timeout_secs: u64,
}

impl PipelineConfig {
    /// Default layout rooted at `base_dir` (see module header).
    pub fn from_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base = base_dir.as_ref();
        let payloads_dir = base.join("payloads");
        Self {
            norm_dirs:            vec![base.join("norms/legal"), base.join("norms/sop")],
            dropzone_dir:         base.join("dropzone"),
            reports_dir:          base.join("reports"),
            archive_dir:          payloads_dir.join("archive"),
            payloads_dir,
            exports_dir:          base.join("exports"),
            index_path:           base.join("kos_db/index.json"),
            iterations_log:       base.join("logs/iterations.json"),
            embed_endpoint:       None,
            model:                "claude-sonnet-4-6".to_string(),
            rate_input:           dec!(0.000003),
            rate_output:          dec!(0.000015),
            tax_account:          "44566".to_string(),
            journal_code:         "ACH".to_string(),
            route_error_verdicts: true,
            request_timeout_secs: 120,
        }
    }
}
