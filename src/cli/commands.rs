// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `audit`, `export` and `ingest`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → u64, bool, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::infra::config::PipelineConfig;

/// The three top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit pending documents and route their verdicts
    Audit(AuditArgs),

    /// Export approved payloads into one ERP CSV batch
    Export(ExportArgs),

    /// Build the norm vector index from the norm corpus
    Ingest(IngestArgs),
}

/// Flags shared by every stage: where the pipeline tree lives
/// and how to reach the embedding service.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Root of the pipeline directory tree
    #[arg(long, default_value = ".")]
    pub base_dir: String,

    /// Embedding service URL; omit to disable semantic retrieval
    #[arg(long, env = "KOS_EMBED_ENDPOINT")]
    pub embed_endpoint: Option<String>,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

/// All arguments for the `audit` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Reasoning model identifier
    #[arg(long, default_value = "claude-sonnet-4-6")]
    pub model: String,

    /// Also write a rejection report for ERREUR verdicts.
    /// Disable to reproduce the historical behaviour where
    /// errors only appear in the iteration log.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub route_errors: bool,
}

/// All arguments for the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Journal code stamped on every exported row
    #[arg(long, default_value = "ACH")]
    pub journal: String,

    /// Account receiving the deductible-tax debit leg
    #[arg(long, default_value = "44566")]
    pub tax_account: String,
}

/// All arguments for the `ingest` command
#[derive(Args, Debug)]
pub struct IngestArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Convert CLI args into the application-layer PipelineConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
fn base_config(common: &CommonArgs) -> PipelineConfig {
    let mut config = PipelineConfig::from_base_dir(&common.base_dir);
    config.embed_endpoint = common.embed_endpoint.clone();
    config.request_timeout_secs = common.timeout;
    config
}

impl From<AuditArgs> for PipelineConfig {
    fn from(a: AuditArgs) -> Self {
        let mut config = base_config(&a.common);
        config.model = a.model;
        config.route_error_verdicts = a.route_errors;
        config
    }
}

impl From<ExportArgs> for PipelineConfig {
    fn from(a: ExportArgs) -> Self {
        let mut config = base_config(&a.common);
        config.journal_code = a.journal;
        config.tax_account = a.tax_account;
        config
    }
}

impl From<IngestArgs> for PipelineConfig {
    fn from(a: IngestArgs) -> Self {
        base_config(&a.common)
    }
}
