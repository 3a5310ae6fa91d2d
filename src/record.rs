//! The target invoice shape produced by the extraction pipeline.
//!
//! Every field is a concrete `String` or `f64` — never an `Option`. The
//! normalizer ([`crate::pipeline::normalize`]) guarantees that whatever the
//! model replied with, the record handed to callers contains no nulls, no
//! NaN, and no missing leaves. Wire names are camelCase to match the JSON
//! shape the system prompt requests from the model and the shape the HTTP
//! API returns to clients.

use serde::{Deserialize, Serialize};

/// Units the system prompt recommends for line items.
///
/// Recommended, not enforced: the normalizer lower-cases whatever the model
/// produced and only substitutes `"pcs"` when the field is empty.
pub const RECOMMENDED_UNITS: [&str; 9] = [
    "pcs", "kg", "m", "box", "set", "carton", "roll", "ltr", "gm",
];

/// A fully normalized invoice: supplier, header, line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub supplier: Supplier,
    pub invoice: InvoiceHeader,
    /// Line items in the order they were extracted. May be empty.
    pub products: Vec<LineItem>,
}

/// Supplier block. All fields default to the empty string when the model
/// omitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Supplier {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub country: String,
}

/// Invoice header block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceHeader {
    pub invoice_number: String,
    /// ISO date, `YYYY-MM-DD`, as requested from the model. Passed through
    /// without re-parsing.
    pub date: String,
    /// Grand total. Coerced to a finite number, never negative, 0 default.
    pub total_amount: f64,
}

/// One extracted line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    /// Lower-cased unit, `"pcs"` when the model left it blank.
    pub unit: String,
    pub rate: f64,
    /// HS/tariff code digits, empty when not printed on the document.
    pub hs_code: String,
}
