use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::render_value;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_section(None, map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    match result {
        Value::Object(map) if is_sensitivity_grid(map) => print_sensitivity_grid(map),
        Value::Object(map) => print_section(None, map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", render_value(other)),
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars as a Field/Value table, then each nested object or array of rows
/// as its own titled table.
fn print_section(title: Option<&str>, map: &Map<String, Value>) {
    if let Some(title) = title {
        println!("\n{}", title);
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) if inner.len() > 1 => nested.push((key, val)),
            Value::Array(arr) if arr.iter().any(Value::is_object) => nested.push((key, val)),
            _ => builder.push_record([key.as_str(), &render_value(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in nested {
        match val {
            Value::Object(inner) if is_sensitivity_grid(inner) => {
                println!("\n{}", key);
                print_sensitivity_grid(inner);
            }
            Value::Object(inner) => print_section(Some(key), inner),
            Value::Array(arr) => {
                println!("\n{}", key);
                print_array_table(arr);
            }
            _ => {}
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(render_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", render_value(item));
        }
    }
}

fn is_sensitivity_grid(map: &Map<String, Value>) -> bool {
    map.contains_key("cells") && map.contains_key("row_values") && map.contains_key("col_values")
}

/// Exit cap rows by vacancy columns, each cell `IRR% / CoC%`. The base case
/// is marked with `*`.
fn print_sensitivity_grid(map: &Map<String, Value>) {
    let label = |key: &str| map.get(key).map(render_value).unwrap_or_default();
    let index = |key: &str| map.get(key).and_then(Value::as_u64).map(|i| i as usize);
    let base_row = index("base_row_index");
    let base_col = index("base_col_index");

    let cols: Vec<String> = match map.get("col_values") {
        Some(Value::Array(values)) => values.iter().map(render_value).collect(),
        _ => Vec::new(),
    };

    let mut builder = Builder::default();
    let mut header = vec![format!("{} \\ {}", label("row_label"), label("col_label"))];
    header.extend(cols);
    builder.push_record(header);

    if let Some(Value::Array(rows)) = map.get("cells") {
        for (r, row) in rows.iter().enumerate() {
            let Value::Array(cells) = row else { continue };
            let row_value = cells
                .first()
                .and_then(|c| c.get("row_param"))
                .map(render_value)
                .unwrap_or_default();
            let mut record = vec![row_value];
            for (c, cell) in cells.iter().enumerate() {
                let irr = cell.get("irr").map(render_value).unwrap_or_default();
                let coc = cell.get("coc").map(render_value).unwrap_or_default();
                let marker = if Some(r) == base_row && Some(c) == base_col { "*" } else { "" };
                record.push(format!("{}{} / {}", marker, round_display(&irr), round_display(&coc)));
            }
            builder.push_record(record);
        }
    }

    println!("{}", Table::from(builder));
    println!("Cells: IRR % / cash-on-cash %  (* = base case)");
}

/// Trim long decimal strings to two places for the grid.
fn round_display(s: &str) -> String {
    match s.parse::<rust_decimal::Decimal>() {
        Ok(d) => d.round_dp(2).to_string(),
        Err(_) => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detects_sensitivity_grid() {
        let grid = json!({"cells": [], "row_values": [], "col_values": []});
        assert!(is_sensitivity_grid(grid.as_object().unwrap()));
        let metrics = json!({"noi": "13176"});
        assert!(!is_sensitivity_grid(metrics.as_object().unwrap()));
    }

    #[test]
    fn test_round_display() {
        assert_eq!(round_display("9.61803398"), "9.62");
        assert_eq!(round_display("n/a"), "n/a");
    }
}
