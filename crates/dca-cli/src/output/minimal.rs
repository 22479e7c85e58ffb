use serde_json::Value;
use std::io::{self, Write};

use super::{cell, unwrap_envelope};

/// Headline field per command, in priority order. Dotted entries reach into
/// dashboard sections.
const HEADLINE_PATHS: &[&str] = &[
    "rate",
    "money_weighted_return",
    "result_pct",
    "percentage",
    "needs_rebalancing",
    "moderate.value",
    "count",
    "kpis.result_pct",
];

/// Print just the key answer value from the output.
///
/// Arrays (the ledger, a trajectory) print their last element's headline,
/// falling back to the whole element.
pub fn print_minimal(value: &Value) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{}", headline(unwrap_envelope(value)))
}

fn headline(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            for path in HEADLINE_PATHS {
                if let Some(found) = lookup(value, path).filter(|v| !v.is_null()) {
                    return cell(found, "null");
                }
            }
            match map.iter().next() {
                Some((key, val)) => format!("{key}: {}", cell(val, "null")),
                None => String::new(),
            }
        }
        Value::Array(items) => items.last().map(last_row).unwrap_or_default(),
        other => cell(other, "null"),
    }
}

fn last_row(row: &Value) -> String {
    ["total_now", "moderate"]
        .iter()
        .find_map(|k| row.get(*k).filter(|v| !v.is_null()))
        .map(|v| cell(v, "null"))
        .unwrap_or_else(|| cell(row, "null"))
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}
