//! # doc2invoice
//!
//! Defensive extraction of structured invoice data from document images and
//! PDFs using vision language models.
//!
//! The crate treats the model as an unreliable component: its reply is raw
//! text that may be perfect JSON, fenced JSON, prose-wrapped JSON, a refusal,
//! or garbage. A staged pipeline turns that text into a strictly typed
//! [`InvoiceRecord`] or a classified, user-facing failure:
//!
//! ```text
//!  document bytes
//!        │
//!        ▼
//!  ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//!  │ request     │──▶│ completion   │──▶│ classify   │
//!  │ (base64 URI)│   │ client (LLM) │   │ (refusals) │
//!  └─────────────┘   └──────────────┘   └─────┬──────┘
//!                                             │
//!        ┌────────────────────────────────────┘
//!        ▼
//!  ┌─────────────┐   ┌──────────────┐   ┌────────────┐
//!  │ extract     │──▶│ normalize    │──▶│ envelope   │
//!  │ JSON        │   │ (schema)     │   │ (transport)│
//!  └─────────────┘   └──────────────┘   └────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use doc2invoice::{DocumentKind, Extractor, ExtractorConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::builder()
//!     .api_key("sk-...")
//!     .base_url("https://api.openai.com/v1")
//!     .build()?;
//!
//! let extractor = Extractor::new(&config)?;
//! let bytes = std::fs::read("invoice.jpg")?;
//! let record = extractor.extract(bytes, DocumentKind::Image).await?;
//! println!("{} line items", record.products.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! * A returned [`InvoiceRecord`] is fully populated: no nulls, no NaN,
//!   units lower-cased with `"pcs"` as the fallback, total never negative.
//! * Every failure is an [`ExtractError`] with a user-facing message; raw
//!   upstream text never leaks into success output.
//! * Normalization is idempotent — re-normalizing a record's own JSON yields
//!   the same record.

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod server;

pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use envelope::ResponseEnvelope;
pub use error::{ErrorClass, ExtractError};
pub use extract::Extractor;
pub use pipeline::client::{CompletionClient, RawModelReply};
pub use pipeline::request::DocumentKind;
pub use record::{InvoiceHeader, InvoiceRecord, LineItem, Supplier};
