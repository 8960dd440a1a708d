pub mod csv_source;
pub mod json_source;

pub use csv_source::CsvSource;
pub use json_source::JsonSource;

use anyhow::Result;

use crate::config::{SourceEntry, SourceFormat};
use crate::models::SourceRecord;

/// Load all records for one configured source.
pub fn load_source(entry: &SourceEntry) -> Result<Vec<SourceRecord>> {
    match entry.format {
        SourceFormat::Csv => CsvSource::new().load(&entry.path),
        SourceFormat::Json => JsonSource::new().load(&entry.path),
    }
}
