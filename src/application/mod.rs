// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one pipeline stage (audit, export, or ingest).
//
// Rules for this layer:
//   - No parsing, judging, or CSV formatting here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination: sequencing, per-item fault
//     containment, and end-of-run accounting
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Stage A: audit pending documents
pub mod audit_use_case;

// Stage B: export approved payloads to the ERP CSV
pub mod export_use_case;

// Offline: build the norm vector index
pub mod ingest_use_case;
