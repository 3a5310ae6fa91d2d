//! HTTP interface: a small axum app around the extractor.
//!
//! One extraction endpoint plus a health probe. The handler decodes the
//! uploaded base64 itself so a garbage upload is rejected as a 400 before
//! any upstream call is made, and every response — success or failure — is
//! the same [`ResponseEnvelope`] JSON shape.

use crate::envelope::ResponseEnvelope;
use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::pipeline::request::DocumentKind;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Uploads are base64 inside JSON, so allow for the ~4/3 expansion over a
/// 20 MB document.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
}

/// Build the application router.
pub fn app(extractor: Arc<Extractor>) -> Router {
    Router::new()
        .route("/api/extract", post(extract_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(AppState { extractor })
}

async fn health_check() -> &'static str {
    "OK"
}

/// Request body for `/api/extract`. Exactly one of the two fields should be
/// set; when both are present the PDF wins, matching the richer instruction
/// it carries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractBody {
    image_base64: Option<String>,
    pdf_base64: Option<String>,
}

async fn extract_handler(
    State(state): State<AppState>,
    Json(body): Json<ExtractBody>,
) -> (StatusCode, Json<ResponseEnvelope>) {
    let (encoded, kind) = match (&body.pdf_base64, &body.image_base64) {
        (Some(pdf), _) => (pdf, DocumentKind::Pdf),
        (None, Some(image)) => (image, DocumentKind::Image),
        (None, None) => {
            return respond(
                ExtractError::InvalidInput.class().status_code(),
                ResponseEnvelope::failure(&ExtractError::InvalidInput),
            );
        }
    };

    let bytes = match decode_document(encoded) {
        Ok(bytes) => bytes,
        Err(err) => return respond(err.class().status_code(), ResponseEnvelope::failure(&err)),
    };

    info!(kind = kind.noun(), bytes = bytes.len(), "received extraction upload");
    let (status, envelope) = state.extractor.extract_to_envelope(bytes, kind).await;
    respond(status, envelope)
}

fn respond(status: u16, envelope: ResponseEnvelope) -> (StatusCode, Json<ResponseEnvelope>) {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope))
}

/// Decode an upload that may arrive as bare base64 or as a full
/// `data:<mime>;base64,...` URI (browsers produce the latter).
fn decode_document(encoded: &str) -> Result<Vec<u8>, ExtractError> {
    let b64 = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or(ExtractError::InvalidInput)?,
        None => encoded,
    };
    STANDARD
        .decode(b64.trim())
        .map_err(|_| ExtractError::InvalidInput)
}
