use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use tracing::{info, warn};

use crate::models::SourceRecord;

/// Reads source records from a file holding a JSON array of flat
/// objects. String values are copied verbatim; numbers are rendered to
/// strings (whole numbers without a trailing fraction); nested values
/// and nulls are not part of the flat record shape and are skipped.
pub struct JsonSource;

impl JsonSource {
    pub fn new() -> Self {
        JsonSource
    }

    pub fn load(&self, path: &str) -> Result<Vec<SourceRecord>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON source: {}", path))?;
        let items: Vec<Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON source: {}", path))?;
        Ok(self.records(&items))
    }

    pub fn records(&self, items: &[Value]) -> Vec<SourceRecord> {
        let mut records = Vec::new();
        let mut failed_count = 0;

        for (index, item) in items.iter().enumerate() {
            match self.record_from_object(item) {
                Some(record) => records.push(record),
                None => {
                    failed_count += 1;
                    warn!("Skipping non-object JSON item at index {}", index);
                }
            }
        }

        info!(
            "JSON read summary: {} records, {} skipped items",
            records.len(),
            failed_count
        );
        records
    }

    fn record_from_object(&self, item: &Value) -> Option<SourceRecord> {
        let object = item.as_object()?;
        let mut record = SourceRecord::new();

        for (field, value) in object {
            match value {
                Value::String(s) => {
                    record.insert(field.clone(), s.clone());
                }
                Value::Number(n) => {
                    let rendered = match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => (f as i64).to_string(),
                        Some(f) => f.to_string(),
                        None => n.to_string(),
                    };
                    record.insert(field.clone(), rendered);
                }
                _ => {}
            }
        }

        Some(record)
    }
}
