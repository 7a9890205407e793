// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw files on disk and the typed domain
// objects the use cases orchestrate.
//
// Stage A flow:
//
//   dropzone/*.md
//       │
//       ▼
//   DocumentLoader     → frontmatter + body → Document
//       │
//       ▼
//   EvidenceRetriever  → top-k norm excerpts (or substring
//       │                 fallback) as one prompt-ready block
//       ▼
//   (Layer 5 judgment takes over)
//
// Stage B flow:
//
//   payloads/*.json
//       │
//       ▼
//   payload::PayloadFile  → one of two historical schemas
//       │
//       ▼
//   payload::normalize    → canonical Imputation
//
// The Chunker only runs at ingestion time, cutting norm bodies
// into embedding-sized windows.
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads dropzone documents and parses their frontmatter
pub mod loader;

/// Splits norm documents into overlapping chunks for embedding
pub mod chunker;

/// Semantic retrieval with substring fallback
pub mod retriever;

/// The two accepted payload schemas and their normalization
pub mod payload;
