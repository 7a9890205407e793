// ============================================================
// Layer 5 — Judgment
// ============================================================
// Everything around the external reasoning service:
//
//   backend.rs — the HTTP client (Anthropic messages API) with
//                an explicit timeout; the ONLY place in the
//                crate that can abort a run (missing API key)
//
//   parser.rs  — two-stage verdict decoding: strict JSON parse,
//                then a balanced-brace recovery pass, then the
//                ERREUR sentinel. Always terminates in a
//                Verdict, never an error.
//
//   client.rs  — JudgmentClient: builds the prompt, calls the
//                backend, attaches the usage/cost metadata.
//
// Reference: Rust Book §10 (Trait Objects)

/// HTTP reasoning backend (credentials, timeout)
pub mod backend;

/// Recovery parsing of unreliable model replies
pub mod parser;

/// The JudgmentClient orchestrating one judgment call
pub mod client;
