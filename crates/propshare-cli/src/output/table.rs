use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::format_value;

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result render as one field/value table; array-of-
/// object fields (projection series, distribution records) each get their
/// own table below it.
pub fn print_table(value: &Value) {
    let envelope = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };

    let result = envelope.get("result").unwrap_or(value);
    match result {
        Value::Object(fields) => {
            print_scalar_fields(fields);
            for (key, val) in fields {
                if let Value::Array(rows) = val {
                    if rows.first().map(Value::is_object).unwrap_or(false) {
                        println!("\n{}:", key);
                        print_rows(rows);
                    }
                }
            }
        }
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", other),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_scalar_fields(fields: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        match val {
            Value::Array(rows) if rows.first().map(Value::is_object).unwrap_or(false) => {}
            // Nested objects (e.g. the batch header) flatten one level.
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    builder.push_record([
                        format!("{key}.{inner_key}").as_str(),
                        &format_value(inner_val),
                    ]);
                }
            }
            other => builder.push_record([key.as_str(), &format_value(other)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let headers: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => {
            for row in rows {
                println!("{}", format_value(row));
            }
            return;
        }
    };

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(record);
        }
    }
    println!("{}", Table::from(builder));
}
