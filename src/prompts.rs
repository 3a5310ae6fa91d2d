//! Prompts for vision-model invoice extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the schema the model is asked for and the
//!    schema the normalizer enforces must stay in lockstep; both point here.
//!
//! 2. **Testability** — unit tests can inspect the prompts directly without
//!    a live model, so a rule silently dropped from the instruction text is
//!    caught as a test failure.
//!
//! The system prompt is fixed: it is the schema-and-rules contract the whole
//! pipeline is built around and is not caller-overridable.

/// Fixed system instruction sent with every extraction request.
///
/// Requests exactly the [`crate::record::InvoiceRecord`] shape, JSON only,
/// `""`/`0` for unknowns, lower-case units from the recommended set,
/// ISO dates, and one merged `products` array for multi-page documents.
pub const SYSTEM_PROMPT: &str = r#"You are an expert invoice data extraction engine. You read an invoice document and return its contents as a single JSON object.

Return a JSON object with exactly this shape:

{
  "supplier": {
    "name": "",
    "contactPerson": "",
    "email": "",
    "phone": "",
    "address": "",
    "country": ""
  },
  "invoice": {
    "invoiceNumber": "",
    "date": "",
    "totalAmount": 0
  },
  "products": [
    {
      "name": "",
      "quantity": 0,
      "unit": "pcs",
      "rate": 0,
      "hsCode": ""
    }
  ]
}

Follow these rules precisely:

1. Output ONLY the JSON object — no markdown fences, no commentary, no explanations.
2. Use "" for unknown text fields and 0 for unknown numeric fields.
3. Keep "unit" lower-case and within this set where possible: pcs, kg, m, box, set, carton, roll, ltr, gm.
4. Format "date" as YYYY-MM-DD.
5. "hsCode" is the HS/tariff code as digits only; leave it "" when the document does not show one.
6. If the document has multiple pages, merge the line items from ALL pages into the single "products" array.
7. Preserve the order in which line items appear on the document."#;

/// Task instruction attached to the document for image uploads.
pub const IMAGE_TASK_INSTRUCTION: &str =
    "Extract the supplier details, invoice header, and every line item from this invoice image.";

/// Task instruction attached to the document for PDF uploads.
///
/// Spells out multi-page aggregation again at the user-message level: models
/// follow page-merging far more reliably when the request itself repeats it.
pub const PDF_TASK_INSTRUCTION: &str = "Extract the supplier details, invoice header, and every line item from this invoice PDF. \
The document may span multiple pages — read every page and aggregate all line items into the one products array.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RECOMMENDED_UNITS;

    #[test]
    fn system_prompt_requests_required_sections() {
        for key in ["\"supplier\"", "\"invoice\"", "\"products\""] {
            assert!(SYSTEM_PROMPT.contains(key), "prompt must request {key}");
        }
    }

    #[test]
    fn system_prompt_requests_json_only_and_iso_dates() {
        assert!(SYSTEM_PROMPT.contains("ONLY the JSON object"));
        assert!(SYSTEM_PROMPT.contains("YYYY-MM-DD"));
        assert!(SYSTEM_PROMPT.contains("merge the line items from ALL pages"));
    }

    #[test]
    fn system_prompt_lists_every_recommended_unit() {
        for unit in RECOMMENDED_UNITS {
            assert!(SYSTEM_PROMPT.contains(unit), "prompt must mention {unit}");
        }
    }

    #[test]
    fn pdf_instruction_mentions_multi_page_aggregation() {
        assert!(PDF_TASK_INSTRUCTION.contains("multiple pages"));
        assert!(PDF_TASK_INSTRUCTION.contains("aggregate"));
        assert!(!IMAGE_TASK_INSTRUCTION.contains("pages"));
    }
}
