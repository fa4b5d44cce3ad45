use serde_json::Value;

use super::plain;

/// Print just the solved value: the cent-rounded amount or the period count.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in ["value_rounded", "periods", "value"] {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    println!("{}", plain(val));
                    return;
                }
            }
        }
    }

    println!("{}", plain(result));
}
