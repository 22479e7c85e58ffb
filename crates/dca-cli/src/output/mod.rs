pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};
use std::error::Error;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => json::print_json(value)?,
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value)?,
        OutputFormat::Minimal => minimal::print_minimal(value)?,
    }
    Ok(())
}

/// The `result` of a computation envelope, or the value itself.
pub(crate) fn unwrap_envelope(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Render a scalar for a single cell. Decimals arrive as strings.
pub(crate) fn cell(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(|v| cell(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Chart series come as parallel arrays of equal length; turn them into
/// one row per index. `None` when the object is not shaped that way.
pub(crate) fn columns_to_rows(map: &Map<String, Value>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let mut len = None;
    for value in map.values() {
        let items = value.as_array()?;
        if !items.iter().all(is_scalar) {
            return None;
        }
        match len {
            None => len = Some(items.len()),
            Some(n) if n != items.len() => return None,
            Some(_) => {}
        }
    }
    let len = len?;

    // Month labels lead; the remaining series keep key order.
    let mut headers: Vec<String> = map.keys().cloned().collect();
    if let Some(pos) = headers.iter().position(|h| h == "labels") {
        let labels = headers.remove(pos);
        headers.insert(0, labels);
    }
    let rows = (0..len)
        .map(|i| {
            headers
                .iter()
                .map(|h| map[h].get(i).map(|v| cell(v, "")).unwrap_or_default())
                .collect()
        })
        .collect();
    Some((headers, rows))
}

/// Header and rows for an array of objects, keyed by the first object.
pub(crate) fn records_to_rows(items: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let first = items.first()?.as_object()?;
    let headers: Vec<String> = first.keys().cloned().collect();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(|v| cell(v, "")).unwrap_or_default())
                .collect()
        })
        .collect();
    Some((headers, rows))
}
