use serde_json::Value;

use super::scalar_text;

/// Headline figures, most specific first.
const PRIORITY_KEYS: [&str; 6] = [
    "effective_interest_rate",
    "irr",
    "npv",
    "payment",
    "apr",
    "monthly_irr",
];

/// Print just the key answer. A payment plan prints its cash-flow column, one
/// value per line, ready to pipe into `eir irr`.
pub fn print_minimal(value: &Value) {
    if let Value::Array(rows) = value {
        for row in rows {
            match row.get("cash_flow") {
                Some(cf) => println!("{}", scalar_text(cf, "null")),
                None => println!("{}", scalar_text(row, "null")),
            }
        }
        return;
    }

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        let headline = PRIORITY_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
        if let Some(val) = headline {
            println!("{}", scalar_text(val, "null"));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{key}: {}", scalar_text(val, "null"));
            return;
        }
    }

    println!("{}", scalar_text(result, "null"));
}
