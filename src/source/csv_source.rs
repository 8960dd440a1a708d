use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

use crate::models::SourceRecord;

/// Reads source records from a CSV export with a header row. Each row
/// becomes one record mapping header name to cell value.
pub struct CsvSource;

impl CsvSource {
    pub fn new() -> Self {
        CsvSource
    }

    pub fn load(&self, path: &str) -> Result<Vec<SourceRecord>> {
        let file =
            File::open(path).with_context(|| format!("Failed to open CSV source: {}", path))?;
        self.load_from_reader(file)
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Vec<SourceRecord>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV header row")?
            .clone();

        let mut records = Vec::new();
        let mut failed_count = 0;

        for (index, row) in csv_reader.records().enumerate() {
            match row {
                Ok(row) => {
                    let mut record = SourceRecord::new();
                    for (header, value) in headers.iter().zip(row.iter()) {
                        record.insert(header.to_string(), value.to_string());
                    }
                    records.push(record);
                }
                Err(e) => {
                    failed_count += 1;
                    warn!("Failed to read CSV row at index {}: {}", index, e);
                }
            }
        }

        info!(
            "CSV read summary: {} records, {} failed rows",
            records.len(),
            failed_count
        );
        Ok(records)
    }
}
