//! Error types for the doc2invoice library.
//!
//! Every terminal failure of the extraction pipeline is one [`ExtractError`]
//! variant — none is retried internally and none escapes as an unhandled
//! fault; the pipeline boundary converts each into the response envelope.
//!
//! The `Display` messages are the user-facing text. Diagnostic detail from
//! the upstream service or the JSON parser stays in variant fields so the
//! transport layer can log it, but it is never interpolated into the
//! user-facing message for refusal/parse failures — only operator-facing
//! upstream errors carry their detail verbatim.

use crate::pipeline::request::DocumentKind;
use thiserror::Error;

/// All failures produced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No usable document bytes were supplied.
    #[error("An invoice document is required. Attach an image or PDF and try again.")]
    InvalidInput,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The completion endpoint is not configured (missing API key or URL).
    #[error("Extraction service is not configured: {reason}")]
    UpstreamUnavailable { reason: String },

    /// The completion endpoint returned a non-success response or the call
    /// failed in transit. Operator-facing, so the upstream detail is shown.
    #[error("{}", upstream_message(.status, .detail))]
    UpstreamError {
        status: Option<u16>,
        detail: String,
    },

    // ── Reply classification errors ───────────────────────────────────────
    /// The model returned blank or whitespace-only text.
    #[error("The model returned an empty reply for this {}. {}", .kind.noun(), capture_hint(*.kind))]
    EmptyReply { kind: DocumentKind },

    /// The model declined to process the document (refusal phrase, no JSON).
    #[error("The model could not read this {}. {}", .kind.noun(), capture_hint(*.kind))]
    ModelRefusal { kind: DocumentKind },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// No `{...}` span could be recovered from the reply text.
    #[error("No structured invoice data was found in the reply for this {}. {}", .kind.noun(), capture_hint(*.kind))]
    NoJsonFound { kind: DocumentKind },

    /// A JSON span was found but failed to parse. The parser's reason is
    /// kept for logs, not shown to the user.
    #[error("The extracted invoice data was incomplete or malformed. {}", capture_hint(*.kind))]
    MalformedJson {
        kind: DocumentKind,
        detail: String,
    },

    /// Required top-level keys missing after a successful parse.
    #[error("The extracted data is missing the required '{missing}' section. Please review the invoice and enter the details manually.")]
    SchemaInvalid { missing: String },
}

impl ExtractError {
    /// Which transport bucket this failure belongs to, so the HTTP layer can
    /// pick a status code deterministically.
    pub fn class(&self) -> ErrorClass {
        match self {
            ExtractError::InvalidInput
            | ExtractError::EmptyReply { .. }
            | ExtractError::ModelRefusal { .. }
            | ExtractError::NoJsonFound { .. }
            | ExtractError::MalformedJson { .. }
            | ExtractError::SchemaInvalid { .. } => ErrorClass::BadRequest,
            ExtractError::InvalidConfig(_)
            | ExtractError::UpstreamUnavailable { .. }
            | ExtractError::UpstreamError { .. } => ErrorClass::Internal,
        }
    }
}

/// Transport bucket for a failure: request-shaped problems vs. service-side
/// configuration/upstream problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller's document or the model's reply was unusable (HTTP 400).
    BadRequest,
    /// Configuration or upstream service failure (HTTP 500).
    Internal,
}

impl ErrorClass {
    /// The HTTP status code for this bucket.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::Internal => 500,
        }
    }
}

/// Retry guidance appended to classification/parse failures, worded per
/// document kind: a failing PDF is often recoverable as a photo.
fn capture_hint(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Pdf => "Try uploading a photo or scanned image of the invoice instead.",
        DocumentKind::Image => "Try again with a clearer, well-lit photo of the invoice.",
    }
}

fn upstream_message(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("Extraction service returned HTTP {code}: {detail}"),
        None => format!("Extraction service request failed: {detail}"),
    }
}
