use serde_json::Value;

use super::{cell, result_of};

/// Fields that answer each command, most specific first.
const PRIORITY_KEYS: [&str; 6] = [
    "total_interest",
    "rate",
    "sheet_count",
    "final_amount",
    "interest",
    "version",
];

/// Print only the headline figure of a result.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    println!("{}", cell(val));
                    return;
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        Value::Array(arr) => println!("{}", arr.len()),
        other => println!("{}", cell(other)),
    }
}
