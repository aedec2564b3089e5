use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Render output as tables: a field/value table for scalar results and one
/// row per period for payment plans.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_fields(map),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{value}"),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_fields(result);

    // Schedules attached to a result get their own table
    for (key, val) in result {
        if let Value::Array(rows) = val {
            if rows.iter().any(Value::is_object) {
                println!("\n{key}:");
                print_rows(rows);
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if matches!(val, Value::Array(rows) if rows.iter().any(Value::is_object)) {
            continue;
        }
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", format_cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(format_cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(format_cell)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other, "null"),
    }
}
