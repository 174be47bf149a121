use serde_json::Value;

use super::{render_value, result_of};

/// Headline metric, in order of preference.
const PRIORITY_KEYS: [&str; 7] = [
    "irr",
    "cash_on_cash",
    "monthly_payment",
    "equity_multiple",
    "dscr",
    "noi",
    "cap_rate",
];

/// Print just the headline number.
///
/// Looks for well-known metrics (descending into `core_metrics` for a full
/// analysis), then falls back to the first field of the result.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return render_value(result);
    };

    let nested = map.get("core_metrics").and_then(Value::as_object);
    for key in PRIORITY_KEYS {
        let found = map
            .get(key)
            .filter(|v| !v.is_null())
            .or_else(|| nested.and_then(|n| n.get(key)).filter(|v| !v.is_null()));
        if let Some(val) = found {
            return render_value(val);
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, render_value(val)),
        None => String::new(),
    }
}
