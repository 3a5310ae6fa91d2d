//! Pipeline stages for invoice-data extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. substitute the upstream client in tests) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! request ──▶ client ──▶ classify ──▶ extract_json ──▶ normalize
//! (data URI)  (VLM call) (empty/     (fences, span     (coerce into
//!                         refusal)    recovery, parse)   InvoiceRecord)
//! ```
//!
//! 1. [`request`]      — wrap the document bytes in a per-kind instruction
//!    and base64 data URI
//! 2. [`client`]       — drive the chat-completion call; the only stage with
//!    network I/O and the pipeline's sole suspension point
//! 3. [`classify`]     — short-circuit blank or refusal replies before any
//!    parsing work
//! 4. [`extract_json`] — recover a JSON object from free-form reply text
//! 5. [`normalize`]    — enforce the top-level shape and coerce every leaf
//!    into the canonical record

pub mod classify;
pub mod client;
pub mod extract_json;
pub mod normalize;
pub mod request;
