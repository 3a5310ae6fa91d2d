//! JSON recovery from free-form model text.
//!
//! Even well-prompted models wrap their JSON in ```json fences or pad it
//! with prose ("Here is the extracted data: ..."). This stage strips fence
//! markers anywhere in the text, then recovers the object in two passes:
//!
//! 1. **Balanced scan (preferred)** — walk each `{` candidate and find the
//!    first structurally balanced object (bracket-depth aware, string- and
//!    escape-aware) that parses as JSON. Robust against trailing prose that
//!    itself contains braces.
//! 2. **Naive span (fallback)** — first `{` through last `}` as a single
//!    greedy span. Kept for compatibility: it is the only pass that can
//!    salvage some sloppy-but-parseable replies the balanced scan skips, and
//!    its parse error is the diagnostic reported when everything fails.
//!
//! Known limitation of the fallback: a reply containing multiple independent
//! JSON fragments, or braces inside surrounding prose, can widen the span
//! past the real object. The balanced scan running first makes that case
//! rare.

use crate::error::ExtractError;
use crate::pipeline::request::DocumentKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

// Opening fences may carry a language tag (```json); closing fences are bare.
static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("fence regex"));

/// Recover and parse a single JSON object from reply text.
///
/// # Errors
/// * [`ExtractError::NoJsonFound`] — no `{...}` span exists in the text.
/// * [`ExtractError::MalformedJson`] — a span exists but no candidate parses.
pub fn extract_json(reply: &str, kind: DocumentKind) -> Result<Value, ExtractError> {
    let stripped = RE_FENCE.replace_all(reply, "");

    let (first, last) = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(first), Some(last)) if first < last => (first, last),
        _ => {
            debug!(kind = kind.noun(), "no JSON span in reply");
            return Err(ExtractError::NoJsonFound { kind });
        }
    };

    if let Some(value) = first_balanced_object(&stripped[first..=last]) {
        return Ok(value);
    }

    // Fallback: the greedy span. Its parse error is the most specific
    // diagnosis available once the balanced scan has come up empty.
    let span = &stripped[first..=last];
    serde_json::from_str(span).map_err(|e| {
        debug!(kind = kind.noun(), error = %e, "candidate JSON span failed to parse");
        ExtractError::MalformedJson {
            kind,
            detail: e.to_string(),
        }
    })
}

/// Find the first structurally balanced `{...}` object that parses as JSON.
///
/// Tries every `{` in order; for each, scans forward tracking brace depth
/// with string-literal and escape awareness, and attempts a parse on the
/// balanced slice. Returns the first candidate that parses to an object.
fn first_balanced_object(text: &str) -> Option<Value> {
    for (start, _) in text.char_indices().filter(|(_, c)| *c == '{') {
        let Some(len) = balanced_len(&text[start..]) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str::<Value>(&text[start..start + len]) {
            if value.is_object() {
                return Some(value);
            }
        }
    }
    None
}

/// Length of the balanced object starting at the first byte of `text`
/// (which must be `{`), or `None` if the braces never re-balance.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}
