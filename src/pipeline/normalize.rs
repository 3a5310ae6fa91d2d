//! Schema validation and defensive normalization.
//!
//! The upstream model is not trusted to respect the requested schema, so
//! every leaf field is coerced into its canonical type here. Presence of the
//! three top-level sections is the only hard requirement: a reply missing
//! `supplier` or `invoice` carries nothing worth salvaging, but a missing or
//! mis-typed line-item list is recoverable and degrades to an empty list.
//!
//! Normalization is a fixed point: running it again on its own serialized
//! output yields the same record.

use crate::error::ExtractError;
use crate::record::{InvoiceHeader, InvoiceRecord, LineItem, Supplier};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use tracing::debug;

const REQUIRED_KEYS: [&str; 3] = ["supplier", "invoice", "products"];

static EMPTY: Lazy<Map<String, Value>> = Lazy::new(Map::new);

/// Enforce the top-level shape and coerce every field of the parsed reply
/// into a canonical [`InvoiceRecord`].
///
/// # Errors
/// [`ExtractError::SchemaInvalid`] when any of `supplier`, `invoice`,
/// `products` is absent (presence check only — deep shape is coerced, not
/// validated).
pub fn normalize_record(value: &Value) -> Result<InvoiceRecord, ExtractError> {
    let obj = value.as_object().unwrap_or(&EMPTY);

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .filter(|key| !obj.contains_key(**key))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ExtractError::SchemaInvalid {
            missing: missing.join(", "),
        });
    }

    let supplier = section(obj, "supplier");
    let invoice = section(obj, "invoice");

    // A non-array products value is recoverable; degrade to an empty list.
    let products: Vec<LineItem> = match obj.get("products") {
        Some(Value::Array(items)) => items.iter().map(normalize_item).collect(),
        _ => {
            debug!("products was not a sequence; defaulting to empty");
            Vec::new()
        }
    };

    Ok(InvoiceRecord {
        supplier: Supplier {
            name: raw_string(supplier.get("name")),
            contact_person: raw_string(supplier.get("contactPerson")),
            email: raw_string(supplier.get("email")),
            phone: raw_string(supplier.get("phone")),
            address: raw_string(supplier.get("address")),
            country: raw_string(supplier.get("country")),
        },
        invoice: InvoiceHeader {
            invoice_number: raw_string(invoice.get("invoiceNumber")),
            date: raw_string(invoice.get("date")),
            total_amount: coerce_number(invoice.get("totalAmount")).max(0.0),
        },
        products,
    })
}

fn normalize_item(value: &Value) -> LineItem {
    let obj = value.as_object().unwrap_or(&EMPTY);

    let unit = coerce_string(obj.get("unit")).to_lowercase();
    LineItem {
        name: coerce_string(obj.get("name")),
        quantity: coerce_number(obj.get("quantity")),
        unit: if unit.is_empty() { "pcs".to_string() } else { unit },
        rate: coerce_number(obj.get("rate")),
        hs_code: coerce_string(obj.get("hsCode")),
    }
}

/// A top-level section as a map; a mis-typed section degrades to empty so
/// its fields take their defaults.
fn section<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a Map<String, Value> {
    obj.get(key).and_then(Value::as_object).unwrap_or(&EMPTY)
}

/// Supplier/header fields are passed through as given: the system prompt
/// already constrains them to scalar strings, so anything else defaults.
fn raw_string(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Line-item string coercion: scalars become trimmed strings, everything
/// else the empty string.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion: finite numbers pass, numeric strings parse, everything
/// else — including anything NaN-producing — is exactly 0.
fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}
