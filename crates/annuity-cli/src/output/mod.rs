pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result fields in display order, with their table labels.
pub const RESULT_FIELDS: [(&str, &str); 7] = [
    ("timing", "Timing"),
    ("target", "Solved for"),
    ("known", "Known value"),
    ("value_rounded", "Result"),
    ("value", "Result (full precision)"),
    ("periods", "Periods"),
    ("raw_periods", "Periods (unrounded)"),
];

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

/// Render a scalar JSON value as plain text.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The `(label, value)` rows of a result object, in display order.
pub fn result_rows(result: &serde_json::Map<String, Value>) -> Vec<(&'static str, String)> {
    RESULT_FIELDS
        .iter()
        .filter_map(|(key, label)| result.get(*key).map(|v| (*label, plain(v))))
        .collect()
}
