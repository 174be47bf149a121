pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar-ish JSON value for human output. Single-key objects such as
/// a tagged DSCR (`{"finite": "1.31"}`) print their inner value.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) if map.len() == 1 => {
            map.values().next().map(render_value).unwrap_or_default()
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The `result` payload of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_tagged_dscr() {
        assert_eq!(render_value(&json!({"finite": "1.31"})), "1.31");
        assert_eq!(render_value(&json!("infinite")), "infinite");
    }

    #[test]
    fn test_render_null_is_blank() {
        assert_eq!(render_value(&Value::Null), "");
    }

    #[test]
    fn test_result_of_unwraps_envelope() {
        let env = json!({"result": {"irr": "9.6"}, "warnings": []});
        assert_eq!(result_of(&env), &json!({"irr": "9.6"}));
        let bare = json!({"purchase_price": "300000"});
        assert_eq!(result_of(&bare), &bare);
    }
}
