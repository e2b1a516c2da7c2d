use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{result_of, row_cells, row_headers, scalar_text};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render_table(value));
}

fn render_table(value: &Value) -> String {
    let mut sections: Vec<String> = Vec::new();

    match result_of(value) {
        Value::Object(result) => {
            sections.push(field_table(result));
            // Nested row sets (the cash-flow schedule) get their own table
            for (key, val) in result {
                if let Value::Array(rows) = val {
                    if let Some(t) = rows_table(rows) {
                        sections.push(format!("{}:\n{}", key, t));
                    }
                }
            }
        }
        Value::Array(rows) => {
            sections.push(rows_table(rows).unwrap_or_else(|| "(empty)".to_string()));
        }
        other => sections.push(scalar_text(other)),
    }

    if let Some(envelope) = value.as_object() {
        sections.extend(envelope_notes(envelope));
    }

    sections.join("\n\n")
}

/// Field/value table of the scalar members of the result.
fn field_table(result: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in result.iter().filter(|(_, v)| !v.is_array()) {
        builder.push_record([key.clone(), scalar_text(val)]);
    }
    Table::from(builder).to_string()
}

fn rows_table(rows: &[Value]) -> Option<String> {
    let headers = row_headers(rows)?;
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        builder.push_record(row_cells(row, &headers));
    }
    Some(Table::from(builder).to_string())
}

/// Warnings and methodology from the computation envelope.
fn envelope_notes(envelope: &Map<String, Value>) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        let lines: Vec<String> = warnings
            .iter()
            .filter_map(Value::as_str)
            .map(|w| format!("  - {}", w))
            .collect();
        if !lines.is_empty() {
            notes.push(format!("Warnings:\n{}", lines.join("\n")));
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        notes.push(format!("Methodology: {}", meth));
    }

    notes
}
