pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The payload inside the computation envelope, or the value itself when it
/// carries no envelope.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Render a scalar for text output. Arrays and objects fall back to JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers taken from the first row of an array of objects, in the
/// order its fields were serialised.
pub(crate) fn row_headers(rows: &[Value]) -> Option<Vec<String>> {
    match rows.first() {
        Some(Value::Object(first)) => Some(first.keys().cloned().collect()),
        _ => None,
    }
}

/// Cells of one row in header order; missing keys become empty cells.
pub(crate) fn row_cells(row: &Value, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| row.get(h.as_str()).map(scalar_text).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_of_unwraps_envelope() {
        let v = json!({ "result": { "ytm": 0.05 }, "warnings": [] });
        assert_eq!(result_of(&v), &json!({ "ytm": 0.05 }));
        let bare = json!([1, 2]);
        assert_eq!(result_of(&bare), &bare);
    }

    #[test]
    fn test_row_cells_follow_headers() {
        let rows = vec![json!({ "period": 1, "paymentDate": "2025-01-15" })];
        let headers = row_headers(&rows).unwrap();
        let cells = row_cells(&rows[0], &headers);
        assert_eq!(headers.len(), cells.len());
        assert!(cells.contains(&"2025-01-15".to_string()));
        assert!(row_headers(&[json!(3)]).is_none());
    }
}
