pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load command input from `--input <file>`, falling back to piped stdin.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_input(path);
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err(format!("--input <file.json|file.yaml> or stdin required for {command}").into())
}
