//! The extraction pipeline orchestrator.
//!
//! [`Extractor`] wires the five stages into one async call:
//!
//! ```text
//! bytes ─▶ build_payload ─▶ complete ─▶ classify ─▶ extract_json ─▶ normalize
//! ```
//!
//! Each stage either hands a refined value to the next or terminates the run
//! with an [`ExtractError`]; nothing is retried internally. One extraction is
//! one task — concurrent uploads share nothing but the immutable client and
//! policy behind their `Arc`s.

use crate::config::ExtractorConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ExtractError;
use crate::pipeline::classify::{classify_reply, PhraseListPolicy, RefusalPolicy};
use crate::pipeline::client::{CompletionClient, OpenAiCompatClient};
use crate::pipeline::extract_json::extract_json;
use crate::pipeline::normalize::normalize_record;
use crate::pipeline::request::{build_payload, DocumentKind, ExtractionRequest};
use crate::record::InvoiceRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns uploaded document bytes into a typed [`InvoiceRecord`].
///
/// Cheap to clone and safe to share across request handlers.
#[derive(Clone)]
pub struct Extractor {
    client: Arc<dyn CompletionClient>,
    refusal: Arc<dyn RefusalPolicy>,
}

impl Extractor {
    /// Build an extractor backed by the production OpenAI-compatible client.
    ///
    /// # Errors
    /// [`ExtractError::UpstreamUnavailable`] when the configuration is
    /// missing credentials or an endpoint.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            client: Arc::new(OpenAiCompatClient::from_config(config)?),
            refusal: Arc::new(PhraseListPolicy::default()),
        })
    }

    /// Build an extractor around any [`CompletionClient`]. This is the test
    /// seam: substitute clients replay canned replies without network I/O.
    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            refusal: Arc::new(PhraseListPolicy::default()),
        }
    }

    /// Replace the refusal-detection policy.
    pub fn with_refusal_policy(mut self, policy: Arc<dyn RefusalPolicy>) -> Self {
        self.refusal = policy;
        self
    }

    /// Run the full pipeline on one document.
    pub async fn extract(
        &self,
        bytes: Vec<u8>,
        kind: DocumentKind,
    ) -> Result<InvoiceRecord, ExtractError> {
        let request = ExtractionRequest { bytes, kind };
        let payload = build_payload(&request)?;

        let reply = self.client.complete(&payload).await?;
        classify_reply(&reply.text, kind, self.refusal.as_ref())?;

        let value = extract_json(&reply.text, kind)?;
        let record = normalize_record(&value)?;

        info!(
            kind = kind.noun(),
            products = record.products.len(),
            invoice_number = %record.invoice.invoice_number,
            "extraction succeeded"
        );
        Ok(record)
    }

    /// Run the pipeline and fold the outcome into the transport shape.
    ///
    /// Never fails: every pipeline error becomes a failure envelope with its
    /// status code, logged here so transports don't have to.
    pub async fn extract_to_envelope(
        &self,
        bytes: Vec<u8>,
        kind: DocumentKind,
    ) -> (u16, ResponseEnvelope) {
        let outcome = self.extract(bytes, kind).await;
        if let Err(err) = &outcome {
            warn!(kind = kind.noun(), error = %err, "extraction failed");
        }
        ResponseEnvelope::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::client::RawModelReply;
    use crate::pipeline::request::RequestPayload;
    use async_trait::async_trait;

    struct CannedClient {
        reply: String,
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(&self, _: &RequestPayload) -> Result<RawModelReply, ExtractError> {
            Ok(RawModelReply {
                text: self.reply.clone(),
            })
        }
    }

    fn extractor(reply: &str) -> Extractor {
        Extractor::with_client(Arc::new(CannedClient {
            reply: reply.to_string(),
        }))
    }

    #[tokio::test]
    async fn happy_path_produces_a_record() {
        let reply = r#"{"supplier":{"name":"Acme"},"invoice":{"invoiceNumber":"INV-1","totalAmount":10},"products":[]}"#;
        let record = extractor(reply)
            .extract(b"img".to_vec(), DocumentKind::Image)
            .await
            .expect("must extract");
        assert_eq!(record.supplier.name, "Acme");
        assert_eq!(record.invoice.total_amount, 10.0);
    }

    #[tokio::test]
    async fn empty_bytes_fail_before_any_network_call() {
        struct PanicClient;
        #[async_trait]
        impl CompletionClient for PanicClient {
            async fn complete(&self, _: &RequestPayload) -> Result<RawModelReply, ExtractError> {
                panic!("must not be reached for empty input");
            }
        }
        let extractor = Extractor::with_client(Arc::new(PanicClient));
        let err = extractor
            .extract(Vec::new(), DocumentKind::Pdf)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ExtractError::InvalidInput));
    }

    #[tokio::test]
    async fn refusal_reply_becomes_model_refusal() {
        let err = extractor("I'm sorry, I cannot process this document.")
            .extract(b"doc".to_vec(), DocumentKind::Pdf)
            .await
            .expect_err("must fail");
        assert!(matches!(
            err,
            ExtractError::ModelRefusal {
                kind: DocumentKind::Pdf
            }
        ));
    }

    #[tokio::test]
    async fn envelope_folds_failure_with_status() {
        let (status, envelope) = extractor("")
            .extract_to_envelope(b"doc".to_vec(), DocumentKind::Image)
            .await;
        assert_eq!(status, 400);
        assert!(!envelope.is_success());
    }

    #[tokio::test]
    async fn custom_refusal_policy_is_used() {
        struct Never;
        impl RefusalPolicy for Never {
            fn is_refusal(&self, _: &str) -> bool {
                false
            }
        }
        // With refusals disabled, an apology without JSON falls through to
        // the JSON extractor and reports NoJsonFound instead.
        let err = extractor("Sorry, I cannot help with that.")
            .with_refusal_policy(Arc::new(Never))
            .extract(b"doc".to_vec(), DocumentKind::Image)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ExtractError::NoJsonFound { .. }));
    }
}
