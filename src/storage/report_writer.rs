use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes analytics results as pretty-printed JSON under dated paths:
/// `<base>/<request>/<YYYY/MM/DD>/report.json`.
pub struct ReportWriter {
    base_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        ReportWriter {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_path(&self, request: &str) -> PathBuf {
        let date = Utc::now().format("%Y/%m/%d").to_string();
        self.base_dir.join(request).join(date).join("report.json")
    }

    pub fn write_report<T: Serialize>(&self, request: &str, payload: &T) -> Result<PathBuf> {
        let path = self.report_path(request);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(payload)
            .with_context(|| format!("Failed to serialize {} report", request))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        info!("Stored {} report at: {}", request, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_path_is_dated() {
        let writer = ReportWriter::new("reports");
        let path = writer.report_path("best-value-products");
        let rendered = path.to_string_lossy().replace('\\', "/");

        assert!(rendered.starts_with("reports/best-value-products/"));
        assert!(rendered.ends_with("/report.json"));
        // reports/<request>/YYYY/MM/DD/report.json
        assert_eq!(rendered.split('/').count(), 6);
    }

    #[test]
    fn test_write_report_round_trip() {
        let base = std::env::temp_dir().join(format!(
            "review-pipeline-report-test-{}",
            std::process::id()
        ));
        let writer = ReportWriter::new(&base);

        let payload = json!([{"bucket": "Electronics", "review_count": 3}]);
        let path = writer.write_report("top-rated-by-category", &payload).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, payload);

        fs::remove_dir_all(&base).unwrap();
    }
}
