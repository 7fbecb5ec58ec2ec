use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the result envelope as JSON on stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut handle, value) {
        eprintln!("Failed to render JSON output: {}", e);
        return;
    }
    let _ = handle.write_all(b"\n");
}
