// ============================================================
// Layer 5 — Verdict Recovery Parser
// ============================================================
// The reasoning service is asked for pure JSON, but an external
// text generator is unreliable by nature: replies arrive
// wrapped in prose ("Voici le résultat : {...} Merci."), inside
// markdown fences, or occasionally as plain refusal text.
//
// Two-stage decode, guaranteed to terminate in a Verdict:
//
//   1. Strict: serde_json on the trimmed reply.
//   2. Recovery: locate the FIRST balanced {...} span (brace
//      counting, string-literal and escape aware so braces
//      inside JSON strings don't derail it) and decode that.
//   3. Sentinel: {category: ERREUR, motif: <raw reply>} — the
//      raw text is preserved for later inspection.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §8 (Strings and bytes)

use crate::domain::verdict::Verdict;

/// Decode a raw model reply into a Verdict. Never fails.
pub fn parse_verdict(raw: &str) -> Verdict {
    let trimmed = raw.trim();

    if let Ok(verdict) = serde_json::from_str::<Verdict>(trimmed) {
        return verdict;
    }

    if let Some(span) = balanced_json_span(trimmed) {
        if let Ok(verdict) = serde_json::from_str::<Verdict>(span) {
            tracing::debug!("Verdict recovered from embedded JSON span");
            return verdict;
        }
    }

    tracing::warn!("Unparsable reply — synthesizing ERREUR verdict");
    Verdict::erreur(raw)
}

/// Find the first balanced `{...}` span in a text.
///
/// Tracks JSON string literals so a `{` or `}` inside a quoted
/// string does not affect the depth count, and `\"` escapes do
/// not close the string early.
fn balanced_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
