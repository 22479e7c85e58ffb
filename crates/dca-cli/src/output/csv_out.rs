use serde_json::Value;
use std::io;

use super::{cell, columns_to_rows, is_scalar, records_to_rows, unwrap_envelope};

/// Write output as CSV to stdout.
///
/// Ledger rows and period returns become one line per record, chart series
/// one line per month. Anything else is flattened to `field,value` pairs
/// with dotted paths for nested sections.
pub fn print_csv(value: &Value) -> csv::Result<()> {
    write_csv(io::stdout().lock(), value)
}

pub(crate) fn write_csv<W: io::Write>(out: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let body = unwrap_envelope(value);
    let table = match body {
        Value::Array(items) => records_to_rows(items)
            .or_else(|| Some((vec!["value".into()], items.iter().map(|v| vec![cell(v, "")]).collect()))),
        Value::Object(map) => columns_to_rows(map),
        _ => None,
    };

    match table {
        Some((headers, rows)) => std::iter::once(headers)
            .chain(rows)
            .try_for_each(|record| wtr.write_record(&record))?,
        None => {
            let mut pairs = Vec::new();
            flatten("", body, &mut pairs);
            std::iter::once(["field".to_string(), "value".to_string()])
                .chain(pairs.into_iter().map(|(k, v)| [k, v]))
                .try_for_each(|record| wtr.write_record(&record))?
        }
    }
    wtr.flush()?;
    Ok(())
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(&join(key), val, out);
            }
        }
        Value::Array(items) if !items.iter().all(is_scalar) => {
            for (i, item) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), item, out);
            }
        }
        scalar => out.push((prefix.to_string(), cell(scalar, ""))),
    }
}
