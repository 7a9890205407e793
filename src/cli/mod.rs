// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `audit`  — audits pending documents and routes verdicts
//   2. `export` — batches approved payloads into one ERP CSV
//   3. `ingest` — builds the norm vector index
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AuditArgs, Commands, ExportArgs, IngestArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "kos-compta",
    version = "2.0.0",
    about = "Audit accounting documents for compliance, then export approved ones to the ERP."
)]
pub struct Cli {
    /// The subcommand to run (audit, export or ingest)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Audit(args)  => Self::run_audit(args),
            Commands::Export(args) => Self::run_export(args),
            Commands::Ingest(args) => Self::run_ingest(args),
        }
    }

    /// Handles the `audit` subcommand.
    fn run_audit(args: AuditArgs) -> Result<()> {
        use crate::application::audit_use_case::AuditUseCase;

        println!("\n╔══════════════════════════════════════╗");
        println!("║  ERGO KOS_COMPTA — Compliance Agent  ║");
        println!("╚══════════════════════════════════════╝\n");

        // Convert CLI args → application config (separates presentation from domain)
        AuditUseCase::new(args.into()).execute()
    }

    /// Handles the `export` subcommand.
    fn run_export(args: ExportArgs) -> Result<()> {
        use crate::application::export_use_case::ExportUseCase;

        println!("\n╔══════════════════════════════════════╗");
        println!("║  ERGO KOS_COMPTA — Export ERP        ║");
        println!("╚══════════════════════════════════════╝\n");

        ExportUseCase::new(args.into()).execute()?;
        Ok(())
    }

    /// Handles the `ingest` subcommand.
    fn run_ingest(args: IngestArgs) -> Result<()> {
        use crate::application::ingest_use_case::IngestUseCase;

        tracing::info!("Building the norm vector index");
        IngestUseCase::new(args.into()).execute()
    }
}
