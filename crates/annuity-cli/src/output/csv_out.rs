use serde_json::Value;
use std::io;

use super::{plain, RESULT_FIELDS};

/// Write the result as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["field", "value"]);

    match value.as_object() {
        Some(envelope) => {
            if let Some(Value::Object(result)) = envelope.get("result") {
                for (key, _) in RESULT_FIELDS {
                    if let Some(val) = result.get(key) {
                        let _ = wtr.write_record([key, plain(val).as_str()]);
                    }
                }
            }
            if let Some(Value::String(meth)) = envelope.get("methodology") {
                let _ = wtr.write_record(["methodology", meth.as_str()]);
            }
            if let Some(Value::Array(warnings)) = envelope.get("warnings") {
                for w in warnings.iter().filter_map(Value::as_str) {
                    let _ = wtr.write_record(["warning", w]);
                }
            }
        }
        None => {
            let _ = wtr.write_record(["value", plain(value).as_str()]);
        }
    }

    let _ = wtr.flush();
}
