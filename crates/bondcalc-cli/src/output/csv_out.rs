use serde_json::Value;
use std::io::{self, Write};

use super::{result_of, row_cells, row_headers, scalar_text};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// A schedule (bare or inside a valuation) becomes one row per period;
/// any other object becomes two-column `field,value` CSV.
fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);
    let result = result_of(value);

    match result {
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        Value::Object(map) => match map.get("cashFlowSchedule") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
            _ => {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &scalar_text(val)])?;
                }
            }
        },
        other => wtr.write_record([scalar_text(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(headers) = row_headers(rows) else {
        for row in rows {
            wtr.write_record([scalar_text(row)])?;
        }
        return Ok(());
    };

    wtr.write_record(&headers)?;
    for row in rows {
        wtr.write_record(row_cells(row, &headers))?;
    }
    Ok(())
}
