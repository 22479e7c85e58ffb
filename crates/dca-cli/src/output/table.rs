use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, columns_to_rows, is_scalar, records_to_rows};

/// Format output as tables. Nested sections of a dashboard each get their
/// own titled table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if map.contains_key("result") => {
            if let Some(result) = map.get("result") {
                print_section(None, result);
            }
            print_envelope_notes(map);
        }
        other => print_section(None, other),
    }
}

fn print_section(title: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some((headers, rows)) = columns_to_rows(map) {
                print_titled(title, grid(headers, rows));
                return;
            }

            let scalars: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(_, v)| !is_section(v))
                .collect();
            if !scalars.is_empty() {
                let rows = scalars
                    .into_iter()
                    .map(|(k, v)| vec![k.clone(), cell(v, "-")])
                    .collect();
                print_titled(title, grid(vec!["Field".into(), "Value".into()], rows));
            }

            for (key, nested) in map {
                if is_section(nested) {
                    let label = match title {
                        Some(t) => format!("{t}.{key}"),
                        None => key.clone(),
                    };
                    print_section(Some(label.as_str()), nested);
                }
            }
        }
        Value::Array(items) => match records_to_rows(items) {
            Some((headers, rows)) => print_titled(title, grid(headers, rows)),
            None if items.is_empty() => print_titled(title, "(empty)".to_string()),
            None => {
                let rows = items.iter().map(|v| vec![cell(v, "-")]).collect();
                print_titled(title, grid(vec!["Value".into()], rows));
            }
        },
        Value::Null => print_titled(title, "-".to_string()),
        scalar => print_titled(title, cell(scalar, "-")),
    }
}

/// Objects and arrays of objects get their own table.
fn is_section(value: &Value) -> bool {
    value.is_object() || value.as_array().is_some_and(|a| !a.iter().all(is_scalar))
}

fn grid(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    Table::from(builder).to_string()
}

fn print_titled(title: Option<&str>, body: String) {
    if let Some(t) = title {
        println!("\n{}", t.bold());
    }
    println!("{body}");
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}
