use serde_json::{Map, Value};
use std::io;

use super::{render_value, result_of};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Arrays of records (the cash-flow projection) become one row per record, a
/// sensitivity grid becomes one row per cell, and anything else is flattened
/// into `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_of(value) {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) if map.contains_key("cells") => {
            if let Some(Value::Array(rows)) = map.get("cells") {
                let cells: Vec<Value> = rows
                    .iter()
                    .filter_map(Value::as_array)
                    .flatten()
                    .cloned()
                    .collect();
                write_array_csv(&mut wtr, &cells);
            }
        }
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            write_fields(&mut wtr, "", map);
        }
        other => {
            let _ = wtr.write_record([render_value(other)]);
        }
    }

    let _ = wtr.flush();
}

/// Nested objects flatten to dotted field names; arrays are skipped.
fn write_fields(wtr: &mut StdoutWriter<'_>, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) if inner.len() > 1 => write_fields(wtr, &field, inner),
            Value::Array(_) => {}
            _ => {
                let _ = wtr.write_record([field.as_str(), &render_value(val)]);
            }
        }
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(render_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([render_value(item)]);
        }
    }
}
