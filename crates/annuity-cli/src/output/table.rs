use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{plain, result_rows};

/// Format an annuity result envelope as a table, followed by warnings and
/// the formula used.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", plain(value));
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    match envelope.get("result") {
        Some(Value::Object(result)) => {
            for (label, val) in result_rows(result) {
                builder.push_record([label.to_string(), val]);
            }
        }
        _ => {
            for (key, val) in envelope {
                builder.push_record([key.clone(), plain(val)]);
            }
        }
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nFormula: {}", meth);
    }
}
