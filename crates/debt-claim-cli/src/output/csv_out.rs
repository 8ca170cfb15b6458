use serde_json::{Map, Value};
use std::io;

use super::{cell, result_of, ROW_SECTIONS};

/// Write a result as CSV to stdout.
///
/// Results carrying period (or item) rows are written as one row per
/// period; anything else becomes `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match result_of(value) {
        Value::Object(map) => match first_section(map) {
            Some(rows) => write_rows(&mut wtr, rows),
            None => write_pairs(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        other => wtr.write_record([cell(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn first_section(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_SECTIONS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_array))
        .find(|rows| !rows.is_empty())
}

fn write_pairs<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([cell(row)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}
