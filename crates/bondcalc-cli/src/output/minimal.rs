use serde_json::Value;

use super::{result_of, scalar_text};

/// Keys printed by `--output minimal`, most important first.
const PRIORITY_KEYS: [&str; 3] = ["ytm", "currentYield", "totalInterest"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", render_minimal(value));
}

/// YTM for a valuation, current yield on its own, the final cumulative
/// interest for a bare schedule.
fn render_minimal(value: &Value) -> String {
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    return scalar_text(val);
                }
            }
            map.iter()
                .next()
                .map(|(key, val)| format!("{}: {}", key, scalar_text(val)))
                .unwrap_or_default()
        }
        Value::Array(rows) => rows
            .last()
            .and_then(|row| row.get("cumulativeInterest"))
            .map(scalar_text)
            .unwrap_or_else(|| rows.len().to_string()),
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valuation_prints_ytm() {
        let v = json!({ "result": { "currentYield": 0.052632, "ytm": 0.056617 } });
        assert_eq!(render_minimal(&v), "0.056617");
    }

    #[test]
    fn test_current_yield_only() {
        let v = json!({ "result": { "annualCoupon": 60.0, "currentYield": 0.061224 } });
        assert_eq!(render_minimal(&v), "0.061224");
    }

    #[test]
    fn test_schedule_prints_final_cumulative_interest() {
        let v = json!({ "result": [
            { "period": 1, "cumulativeInterest": 25.0 },
            { "period": 2, "cumulativeInterest": 50.0 }
        ]});
        assert_eq!(render_minimal(&v), "50.0");
    }
}
