//! JSON and CSV file writers for exported rows

use crate::error::Result;
use crate::project::Row;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// JSON output shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Plain array of flat row objects
    #[default]
    Flat,
    /// Airtable create-records payload: `{"records": [{"fields": {…}}]}`
    ///
    /// Empty string values are dropped from each record.
    Airtable,
}

/// Write rows as pretty-printed JSON
pub fn write_json(path: &Path, rows: &[Row], style: JsonStyle) -> Result<()> {
    let payload = match style {
        JsonStyle::Flat => json!(rows),
        JsonStyle::Airtable => {
            let records: Vec<Value> = rows
                .iter()
                .map(|row| {
                    let fields: serde_json::Map<String, Value> = row
                        .iter()
                        .filter(|(_, v)| *v != &Value::String(String::new()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    json!({"fields": fields})
                })
                .collect();
            json!({"records": records})
        },
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &payload)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote JSON output");
    Ok(())
}

/// Write rows as CSV with a header from the first row's keys
///
/// Later rows missing a key emit an empty cell. No file is written for an
/// empty row set.
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(&headers)?;
    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|key| {
                row.get(key.as_str())
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV output");
    Ok(())
}
