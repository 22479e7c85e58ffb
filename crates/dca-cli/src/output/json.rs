use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout; decimals stay as exact strings.
pub fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    write_json(io::stdout().lock(), value)
}

pub(crate) fn write_json<W: Write>(mut out: W, value: &Value) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out).map_err(serde_json::Error::io)?;
    out.flush().map_err(serde_json::Error::io)
}
