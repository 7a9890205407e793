// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// This is the heart of the application — pure Rust structs
// and traits that define the core concepts of the system.
//
// Rules for this layer:
//   - NO file I/O or network calls
//   - NO HTTP client or serde_json::Value plumbing
//   - Only plain Rust structs, enums, and traits
//
// Why keep this layer pure?
//   - Easy to unit test (no backend needed)
//   - Easy to understand (no framework noise)
//   - Easy to swap implementations (just implement the trait)
//
// Think of this layer as the "dictionary" of the system —
// it defines what things ARE, not how they work.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// An audited accounting document loaded from disk
pub mod document;

// The structured compliance verdict returned by the reasoning service
pub mod verdict;

// A balanced double-entry posting (net, tax, gross legs)
pub mod posting;

// The double-entry integrity gate (debits = credits)
pub mod integrity;

// A norm excerpt used as audit evidence
pub mod evidence;

// The error taxonomy shared by both pipeline stages
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
