use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::analytics::DEFAULT_TOP_K;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub analytics: AnalyticsSection,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    pub name: String,
    pub report_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSection {
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub path: String,
    pub format: SourceFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;
        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.name.trim().is_empty() {
            return Err(anyhow!("Pipeline name must not be empty"));
        }
        if self.pipeline.report_dir.trim().is_empty() {
            return Err(anyhow!("Report directory must not be empty"));
        }
        if self.sources.is_empty() {
            return Err(anyhow!("At least one source must be configured"));
        }
        for entry in &self.sources {
            if entry.name.trim().is_empty() || entry.path.trim().is_empty() {
                return Err(anyhow!("Source entries need both a name and a path"));
            }
        }
        if let Some(top_k) = self.analytics.top_k {
            if top_k == 0 {
                return Err(anyhow!("top_k must be at least 1"));
            }
        }
        Ok(())
    }

    pub fn top_k(&self) -> usize {
        self.analytics.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}
