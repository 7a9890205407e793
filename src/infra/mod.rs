// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns shared by both pipeline stages:
//
//   config.rs        — PipelineConfig: every path and tunable,
//                      built once by the CLI and passed down
//
//   router.rs        — VerdictRouter: verdict → artifact file
//                      (rejection report or approved payload)
//
//   erp_csv.rs       — Ledger-import CSV batches, plus the
//                      posting → rows expansion rules
//
//   iteration_log.rs — Append-only run history with sequential
//                      ITER_%04d ids
//
//   vector_index.rs  — Local JSON vector store with brute-force
//                      cosine search (the retriever's primary
//                      backend)
//
//   embedding.rs     — HTTP client for the embedding service
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations (e.g. swap the
//     JSON vector index for a real vector database)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Pipeline paths and tunables
pub mod config;

/// Verdict → artifact routing
pub mod router;

/// ERP CSV batch writing
pub mod erp_csv;

/// Append-only iteration history
pub mod iteration_log;

/// Local JSON vector index
pub mod vector_index;

/// Embedding service HTTP client
pub mod embedding;
