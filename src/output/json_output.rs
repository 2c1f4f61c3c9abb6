//! JSON file output handler implementation
//!
//! This module provides an output handler that writes the crawl report as a
//! pretty-printed JSON document.

use crate::output::traits::{CrawlReport, OutputError, OutputHandler, OutputResult};
use std::path::{Path, PathBuf};

/// Writes the report to a JSON file
pub struct JsonOutputHandler {
    path: PathBuf,
}

impl JsonOutputHandler {
    /// Creates a new JSON output handler
    ///
    /// # Arguments
    ///
    /// * `path` - Report file; parent directories are created on write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutputHandler {
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&self.path, json).map_err(|e| {
            OutputError::Write(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::info!("Report written to {}", self.path.display());
        Ok(())
    }
}

/// Reads a report back from a JSON file
pub fn load_report(path: &Path) -> OutputResult<CrawlReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
