//! Response classification: short-circuit obviously unusable replies.
//!
//! Two cheap checks run before any JSON work: blank replies and refusals
//! ("I cannot process this document..."). Refusal detection is a replaceable
//! policy object — a predicate over raw text — so future phrase sets or
//! language-specific variants can be swapped without touching the pipeline's
//! control flow. The control flow itself adds one guard the policy does not
//! own: a reply matching a refusal phrase is only treated as a refusal when
//! it contains no `{` at all. An apology that still carries a JSON object is
//! incidental preamble and must reach the extractor; and pure substring
//! matching alone would misfire on invoices that legitimately mention a
//! supplier who "cannot" fulfil an order.

use crate::error::ExtractError;
use crate::pipeline::request::DocumentKind;
use tracing::debug;

/// Phrases that indicate the model declined or failed to read the document.
pub const REFUSAL_PHRASES: [&str; 11] = [
    "cannot process",
    "unable to",
    "not able to",
    "cannot read",
    "cannot extract",
    "cannot access",
    "sorry",
    "i apologize",
    "not supported",
    "cannot view",
    "cannot see",
];

/// Predicate deciding whether raw reply text reads as a refusal.
pub trait RefusalPolicy: Send + Sync {
    fn is_refusal(&self, reply: &str) -> bool;
}

/// Default policy: case-insensitive match against a fixed phrase list.
#[derive(Debug, Clone)]
pub struct PhraseListPolicy {
    phrases: Vec<String>,
}

impl PhraseListPolicy {
    /// A policy over a custom phrase set. Phrases are matched lower-cased.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for PhraseListPolicy {
    fn default() -> Self {
        Self::new(REFUSAL_PHRASES)
    }
}

impl RefusalPolicy for PhraseListPolicy {
    fn is_refusal(&self, reply: &str) -> bool {
        let lower = reply.to_lowercase();
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

/// Inspect the reply before structural parsing.
///
/// # Errors
/// * [`ExtractError::EmptyReply`] — blank or whitespace-only text.
/// * [`ExtractError::ModelRefusal`] — the policy matched and the reply
///   contains no `{` character at all.
pub fn classify_reply(
    reply: &str,
    kind: DocumentKind,
    policy: &dyn RefusalPolicy,
) -> Result<(), ExtractError> {
    if reply.trim().is_empty() {
        debug!(kind = kind.noun(), "reply was empty after trimming");
        return Err(ExtractError::EmptyReply { kind });
    }

    if policy.is_refusal(reply) && !reply.contains('{') {
        debug!(kind = kind.noun(), "reply classified as refusal");
        return Err(ExtractError::ModelRefusal { kind });
    }

    Ok(())
}
