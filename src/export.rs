// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use serde_json::json;

use crate::ast::{Document, Entry, Property, Value};
use crate::file::read_document;
use crate::ModfileError;

/// Export a manifest document to JSON.
///
/// Layout:
/// - `forge`: the preamble URL or null
/// - `header` / `footer`: the pinned top and bottom comments
/// - `entries`: one object per entry in canonical order, with the raw
///   properties, the resolved `version` and `branch`, and the entry's
///   metadata pairs
///
/// # Examples
/// ```no_run
/// use modfile::{export::export_document_to_json, parse};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = parse("mod 'puppetlabs-stdlib', '9.4.1'\n")?;
/// println!("{}", export_document_to_json(&doc)?);
/// # Ok(())
/// # }
/// ```
pub fn export_document_to_json(doc: &Document) -> Result<String, ModfileError> {
    fn value_to_json(v: &Value) -> serde_json::Value {
        match v {
            Value::QuotedString(s) => json!({ "string": s }),
            Value::Symbol(s) => json!({ "symbol": s }),
        }
    }

    fn property_to_json(p: &Property) -> serde_json::Value {
        match &p.value {
            Some(value) => json!({ "key": value_to_json(&p.key), "value": value_to_json(value) }),
            None => json!({ "bare": value_to_json(&p.key) }),
        }
    }

    fn entry_to_json(doc: &Document, e: &Entry) -> serde_json::Value {
        let metadata = doc
            .metadata_for_entry(&e.name)
            .map(|m| {
                m.pairs
                    .iter()
                    .map(|p| json!({ "tag": p.tag, "data": p.data }))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        json!({
            "name": e.name,
            "properties": e.properties.iter().map(property_to_json).collect::<Vec<_>>(),
            "version": e.resolve_value("version"),
            "branch": e.resolve_value("branch"),
            "metadata": metadata,
        })
    }

    let top = json!({
        "forge": doc.preamble.as_ref().map(|p| p.url.as_str()),
        "header": doc.top_block_comments().map(|c| c.text.as_str()).collect::<Vec<_>>(),
        "entries": doc.entries().map(|e| entry_to_json(doc, e)).collect::<Vec<_>>(),
        "footer": doc.bottom_block_comments().map(|c| c.text.as_str()).collect::<Vec<_>>(),
    });

    serde_json::to_string_pretty(&top).map_err(|e| {
        ModfileError::invalid_input(format!("Failed to encode JSON: {}", e), None)
    })
}

/// Read, parse and export a manifest file in one call.
pub fn export_manifest_file(path: impl AsRef<Path>) -> Result<String, ModfileError> {
    let doc = read_document(path)?;
    export_document_to_json(&doc)
}
