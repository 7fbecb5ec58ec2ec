use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let contents = read_file(path)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(value)
}

/// Read a JSON file as a generic serde_json::Value.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = read_file(path)?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{path}': {e}"))?;
    Ok(value)
}

fn read_file(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("File not found: {path}").into());
    }
    if !p.is_file() {
        return Err(format!("Not a file: {path}").into());
    }
    Ok(fs::read_to_string(p).map_err(|e| format!("Failed to read '{path}': {e}"))?)
}

/// Read piped JSON from stdin, if any. Interactive sessions (TTY) and empty
/// pipes yield None so flag-based invocation still works.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin()
        .read_to_string(&mut piped)
        .map_err(|e| format!("Failed to read stdin: {e}"))?;

    let piped = piped.trim();
    if piped.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(piped)
        .map_err(|e| format!("Failed to parse piped stdin as JSON: {e}"))?;
    Ok(Some(value))
}
