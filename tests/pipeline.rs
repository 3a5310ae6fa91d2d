//! End-to-end pipeline tests with a scripted completion client.
//!
//! Each test feeds the extractor a canned model reply and asserts the
//! terminal outcome a caller would see: the typed record on success, or the
//! classified failure with its user-facing message. No network I/O.

use async_trait::async_trait;
use doc2invoice::{
    CompletionClient, DocumentKind, ExtractError, Extractor, RawModelReply, ResponseEnvelope,
};
use std::sync::Arc;

/// A client that replays a fixed reply, or a fixed failure.
struct ScriptedClient {
    outcome: Result<String, ExtractError>,
}

impl ScriptedClient {
    fn reply(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(text.to_string()),
        })
    }

    fn failing(err: ExtractError) -> Arc<Self> {
        Arc::new(Self { outcome: Err(err) })
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        _: &doc2invoice::pipeline::request::RequestPayload,
    ) -> Result<RawModelReply, ExtractError> {
        match &self.outcome {
            Ok(text) => Ok(RawModelReply { text: text.clone() }),
            Err(ExtractError::UpstreamError { status, detail }) => {
                Err(ExtractError::UpstreamError {
                    status: *status,
                    detail: detail.clone(),
                })
            }
            Err(_) => Err(ExtractError::UpstreamUnavailable {
                reason: "scripted failure".into(),
            }),
        }
    }
}

fn extractor(reply: &str) -> Extractor {
    Extractor::with_client(ScriptedClient::reply(reply))
}

const FULL_REPLY: &str = r#"{
  "supplier": {
    "name": "Acme Exports Ltd",
    "contactPerson": "Jordan Reyes",
    "email": "sales@acme.example",
    "phone": "+1 555 0100",
    "address": "1 Dock Road, Harborside",
    "country": "US"
  },
  "invoice": {
    "invoiceNumber": "INV-2024-0042",
    "date": "2024-03-15",
    "totalAmount": 1240.00
  },
  "products": [
    { "name": "Steel widget", "quantity": 10, "unit": "PCS", "rate": 100, "hsCode": "847150" },
    { "name": "Packing crate", "quantity": 2, "unit": "Box", "rate": 120, "hsCode": "" }
  ]
}"#;

#[tokio::test]
async fn clean_reply_yields_a_fully_typed_record() {
    let record = extractor(FULL_REPLY)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect("must extract");

    assert_eq!(record.supplier.name, "Acme Exports Ltd");
    assert_eq!(record.invoice.invoice_number, "INV-2024-0042");
    assert_eq!(record.invoice.total_amount, 1240.0);
    assert_eq!(record.products.len(), 2);
    assert_eq!(record.products[0].unit, "pcs");
    assert_eq!(record.products[1].unit, "box");
}

#[tokio::test]
async fn fenced_reply_with_empty_products_succeeds() {
    let reply = "```json\n{\"supplier\":{\"name\":\"Acme\"},\"invoice\":{\"invoiceNumber\":\"A-1\"},\"products\":[]}\n```";
    let record = extractor(reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect("must extract");
    assert!(record.products.is_empty());
    assert_eq!(record.invoice.invoice_number, "A-1");
}

#[tokio::test]
async fn prose_wrapped_reply_succeeds() {
    let reply = format!("Here is the extracted invoice data:\n\n{FULL_REPLY}\n\nLet me know if you need anything else!");
    let record = extractor(&reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect("must extract");
    assert_eq!(record.products.len(), 2);
}

#[tokio::test]
async fn pdf_refusal_suggests_a_photo_instead() {
    let err = extractor("I'm sorry, I am unable to process this document.")
        .extract(b"%PDF-1.7".to_vec(), DocumentKind::Pdf)
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        ExtractError::ModelRefusal {
            kind: DocumentKind::Pdf
        }
    ));
    let msg = err.to_string();
    assert!(msg.contains("PDF"), "got: {msg}");
    assert!(msg.to_lowercase().contains("photo"), "got: {msg}");
}

#[tokio::test]
async fn missing_invoice_section_is_schema_invalid() {
    let reply = r#"{"supplier":{"name":"Acme"},"products":[]}"#;
    let err = extractor(reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect_err("must fail");

    match err {
        ExtractError::SchemaInvalid { missing } => assert_eq!(missing, "invoice"),
        other => panic!("expected SchemaInvalid, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_reply_with_recoverable_inner_object_fails_schema() {
    // The outer object never closes; the JSON stage recovers the balanced
    // supplier sub-object, and the schema check rejects it.
    let reply = r#"{"supplier":{"name":"Acme"}"#;
    let err = extractor(reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ExtractError::SchemaInvalid { .. }));
}

#[tokio::test]
async fn unparseable_json_span_is_malformed_json() {
    let reply = r#"Partial output: {"supplier": }"#;
    let err = extractor(reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ExtractError::MalformedJson { .. }));
    // Parser internals never reach the user-facing message.
    assert!(!err.to_string().contains("column"));
}

#[tokio::test]
async fn non_array_products_still_succeeds_with_empty_list() {
    let reply = r#"{"supplier":{},"invoice":{"totalAmount":50},"products":"none found"}"#;
    let record = extractor(reply)
        .extract(b"jpeg".to_vec(), DocumentKind::Image)
        .await
        .expect("must extract");
    assert!(record.products.is_empty());
    assert_eq!(record.invoice.total_amount, 50.0);
}

#[tokio::test]
async fn upstream_failure_maps_to_internal_envelope() {
    let extractor = Extractor::with_client(ScriptedClient::failing(ExtractError::UpstreamError {
        status: Some(503),
        detail: "upstream overloaded".into(),
    }));

    let (status, envelope) = extractor
        .extract_to_envelope(b"jpeg".to_vec(), DocumentKind::Image)
        .await;

    assert_eq!(status, 500);
    match envelope {
        ResponseEnvelope::Failure { error } => {
            assert!(error.contains("503"), "got: {error}");
        }
        other => panic!("expected failure envelope, got {other:?}"),
    }
}

#[tokio::test]
async fn success_envelope_carries_the_record() {
    let (status, envelope) = extractor(FULL_REPLY)
        .extract_to_envelope(b"jpeg".to_vec(), DocumentKind::Image)
        .await;

    assert_eq!(status, 200);
    let json = serde_json::to_value(&envelope).expect("envelope serializes");
    assert_eq!(json["data"]["supplier"]["name"], "Acme Exports Ltd");
    assert_eq!(json["data"]["products"][0]["hsCode"], "847150");
    assert!(json.get("error").is_none());
}
