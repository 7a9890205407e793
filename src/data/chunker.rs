// ============================================================
// Layer 4 — Norm Chunker
// ============================================================
// Splits long norm documents into overlapping windows of text
// before embedding.
//
// Why do we need chunking?
//   Embedding models work best on passage-sized inputs, and
//   retrieval should return the *relevant paragraph* of a legal
//   text, not the whole statute. Norms can run to many pages.
//
// Solution: sliding window with overlap
//   - Split the text into chunks of `chunk_size` characters
//     (windows snap back to the nearest char boundary so we
//     never cut a multi-byte UTF-8 sequence)
//   - Adjacent chunks share `overlap` characters, so a clause
//     sitting on a boundary appears whole in at least one chunk
//
// The stride (step between chunks) = chunk_size - overlap.
// Defaults follow the ingestion convention: 700 / 100.
//
// Reference: Rust Book §8 (Slices, UTF-8 Strings)

pub struct Chunker {
    /// Target number of characters per chunk
    chunk_size: usize,
    /// Number of characters shared between adjacent chunks
    overlap: usize,
}

impl Chunker {
    /// Create a new Chunker.
    ///
    /// # Panics
    /// Panics if overlap >= chunk_size, because that would
    /// create an infinite loop (stride would be 0 or negative)
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(
            overlap < chunk_size,
            "overlap ({}) must be less than chunk_size ({})",
            overlap,
            chunk_size
        );
        Self { chunk_size, overlap }
    }

    /// The ingestion defaults: 700-char windows, 100-char overlap.
    pub fn for_norms() -> Self {
        Self::new(700, 100)
    }

    /// Split text into overlapping character-level chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let stride = self.chunk_size.saturating_sub(self.overlap);

        let mut chunks = Vec::new();
        let mut start  = 0usize;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }
            start += stride;
        }

        chunks
    }
}
