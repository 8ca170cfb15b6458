use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, result_of, ROW_SECTIONS};

/// Print a result as tables: scalar fields first, then one table per row
/// section (periods, payments, items), then warnings and methodology.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(map) => print_result(map),
        Value::Array(arr) => print_rows(arr),
        other => println!("{}", cell(other)),
    }

    if let Some(envelope) = value.as_object().filter(|m| m.contains_key("result")) {
        print_footer(envelope);
    }
}

fn print_result(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if ROW_SECTIONS.contains(&key.as_str()) || key == "warnings" {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));

    for section in ROW_SECTIONS {
        if let Some(Value::Array(rows)) = map.get(section) {
            if !rows.is_empty() {
                println!("\n{}:", title(section));
                print_rows(rows);
            }
        }
    }
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            println!("{}", cell(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
    if let Some(version) = envelope
        .get("metadata")
        .and_then(|m| m.get("rate_table_version"))
        .and_then(Value::as_str)
    {
        println!("Rate table: {}", version);
    }
}

fn title(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
