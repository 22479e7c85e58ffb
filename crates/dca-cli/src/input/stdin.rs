use serde_json::Value;
use std::io::{self, Read};

/// JSON or YAML piped on stdin, or `None` when stdin is a terminal or empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let payload = buffer.trim();
    if payload.is_empty() {
        tracing::debug!("stdin is empty");
        return Ok(None);
    }

    // JSON first; YAML is a superset, so it only reports its own error.
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(payload)
            .map_err(|e| format!("Failed to parse stdin as JSON or YAML: {e}"))?,
    };
    Ok(Some(value))
}
