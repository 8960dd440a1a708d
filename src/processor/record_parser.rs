use crate::models::SourceRecord;
use chrono::NaiveDate;
use regex::Regex;

/// Fields whose values carry comma-joined parallel lists.
pub const MULTI_VALUE_FIELDS: [&str; 5] = [
    "user_id",
    "user_name",
    "review_id",
    "review_title",
    "review_content",
];

/// Splits the multi-valued fields of a source record and parses the
/// decorated numeric fields the source data is known to carry.
pub struct RecordParser {
    number_regex: Regex,
}

impl RecordParser {
    pub fn new() -> Self {
        RecordParser {
            number_regex: Regex::new(r"(\d+(?:\.\d+)?)").expect("hardcoded regex"),
        }
    }

    /// Ordered sequence of trimmed, non-empty entries from a
    /// comma-joined field. An absent field yields an empty sequence.
    pub fn multi_values(&self, record: &SourceRecord, field: &str) -> Vec<String> {
        match record.get(field) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Single-valued field, trimmed; absent or empty collapses to None.
    pub fn single_value(&self, record: &SourceRecord, field: &str) -> Option<String> {
        record
            .get(field)
            .map(|raw| raw.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Trimmed float parse; absent, empty or unparseable yields None.
    pub fn safe_float(&self, record: &SourceRecord, field: &str) -> Option<f64> {
        self.single_value(record, field)?.parse::<f64>().ok()
    }

    /// Price fields may carry currency symbols and thousands
    /// separators: "₹1,099", "$45.50", "1099".
    pub fn clean_price(&self, record: &SourceRecord, field: &str) -> Option<f64> {
        let raw = self.single_value(record, field)?;
        let cleaned = raw
            .replace('$', "")
            .replace('₹', "")
            .replace('€', "")
            .replace('£', "")
            .replace(',', "");
        cleaned.trim().parse::<f64>().ok()
    }

    /// Discount fields arrive in various formats: "40% off", "25%",
    /// "30 percent off", or a plain number.
    pub fn clean_percentage(&self, record: &SourceRecord, field: &str) -> Option<f64> {
        let raw = self.single_value(record, field)?;
        let cleaned = raw
            .to_lowercase()
            .replace('%', "")
            .replace("percent", "")
            .replace("off", "")
            .replace("discount", "")
            .replace("sale", "");

        // Extract the first number found
        if let Some(captures) = self.number_regex.captures(&cleaned) {
            if let Some(number_match) = captures.get(1) {
                return number_match.as_str().parse::<f64>().ok();
            }
        }

        // Fallback: try to parse the whole cleaned string
        cleaned.trim().parse::<f64>().ok()
    }

    /// ISO date (YYYY-MM-DD); anything else is treated as absent.
    pub fn parse_date(&self, record: &SourceRecord, field: &str) -> Option<NaiveDate> {
        let raw = self.single_value(record, field)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
    }
}
