//! Response envelope: the one JSON shape every caller sees.
//!
//! Success carries the normalized record under `data`; failure carries the
//! user-facing message under `error`. Exactly one of the two keys appears in
//! the serialized form, so clients can branch on key presence without
//! inspecting status codes.

use crate::error::ExtractError;
use crate::record::InvoiceRecord;
use serde::{Deserialize, Serialize};

/// The terminal result of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success { data: InvoiceRecord },
    Failure { error: String },
}

impl ResponseEnvelope {
    pub fn success(record: InvoiceRecord) -> Self {
        ResponseEnvelope::Success { data: record }
    }

    /// Wrap a pipeline failure. Only the `Display` message crosses this
    /// boundary; diagnostic fields stay behind for logging.
    pub fn failure(err: &ExtractError) -> Self {
        ResponseEnvelope::Failure {
            error: err.to_string(),
        }
    }

    /// Convert a pipeline outcome into `(http_status, envelope)`.
    pub fn from_outcome(outcome: Result<InvoiceRecord, ExtractError>) -> (u16, Self) {
        match outcome {
            Ok(record) => (200, Self::success(record)),
            Err(err) => (err.class().status_code(), Self::failure(&err)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::DocumentKind;

    #[test]
    fn success_envelope_has_only_data_key() {
        let envelope = ResponseEnvelope::success(InvoiceRecord::default());
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert!(json.get("data").is_some());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_envelope_has_only_error_key() {
        let envelope = ResponseEnvelope::failure(&ExtractError::InvalidInput);
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert!(json.get("error").is_some());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn outcome_maps_to_status_codes() {
        let (ok_status, ok_env) = ResponseEnvelope::from_outcome(Ok(InvoiceRecord::default()));
        assert_eq!(ok_status, 200);
        assert!(ok_env.is_success());

        let (bad_status, _) = ResponseEnvelope::from_outcome(Err(ExtractError::ModelRefusal {
            kind: DocumentKind::Image,
        }));
        assert_eq!(bad_status, 400);

        let (internal_status, _) =
            ResponseEnvelope::from_outcome(Err(ExtractError::UpstreamUnavailable {
                reason: "no key".into(),
            }));
        assert_eq!(internal_status, 500);
    }

    #[test]
    fn failure_carries_the_display_message() {
        let err = ExtractError::SchemaInvalid {
            missing: "invoice".into(),
        };
        match ResponseEnvelope::failure(&err) {
            ResponseEnvelope::Failure { error } => assert_eq!(error, err.to_string()),
            other => panic!("expected failure envelope, got {other:?}"),
        }
    }
}
