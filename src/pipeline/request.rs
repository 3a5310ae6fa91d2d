//! Request building: document bytes → instruction + base64 data URI.
//!
//! VLM APIs accept documents as base64 data URIs embedded in the JSON
//! request body. The mime hint matters: `application/pdf` tells a
//! PDF-capable endpoint to page through the file, while `image/jpeg` routes
//! through the ordinary vision path. The task instruction is also picked per
//! kind, because multi-page aggregation only needs spelling out for PDFs.

use crate::error::ExtractError;
use crate::prompts::{IMAGE_TASK_INSTRUCTION, PDF_TASK_INSTRUCTION};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What kind of document was uploaded. Decides the mime hint, the task
/// instruction, and the wording of user-facing failure guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    /// Mime type used in the data URI.
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image/jpeg",
            DocumentKind::Pdf => "application/pdf",
        }
    }

    /// Human-readable noun for error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::Pdf => "PDF",
        }
    }

    /// The task instruction sent alongside the document.
    pub fn task_instruction(&self) -> &'static str {
        match self {
            DocumentKind::Image => IMAGE_TASK_INSTRUCTION,
            DocumentKind::Pdf => PDF_TASK_INSTRUCTION,
        }
    }
}

/// One extraction attempt's input. Created per upload, discarded after a
/// single pipeline run.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

/// The built upstream payload: task instruction plus the document as a
/// `data:<mime>;base64,...` URI.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    pub instruction: &'static str,
    pub data_uri: String,
    pub kind: DocumentKind,
}

/// Build the upstream payload for a document. Pure transform.
///
/// # Errors
/// [`ExtractError::InvalidInput`] when `bytes` is empty.
pub fn build_payload(request: &ExtractionRequest) -> Result<RequestPayload, ExtractError> {
    if request.bytes.is_empty() {
        return Err(ExtractError::InvalidInput);
    }

    let b64 = STANDARD.encode(&request.bytes);
    debug!(
        kind = request.kind.noun(),
        bytes = request.bytes.len(),
        base64_len = b64.len(),
        "encoded document payload"
    );

    Ok(RequestPayload {
        instruction: request.kind.task_instruction(),
        data_uri: format!("data:{};base64,{}", request.kind.mime(), b64),
        kind: request.kind,
    })
}
