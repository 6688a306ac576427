use super::state::JobState;
use crate::client::Client;
use crate::config::{FailurePolicy, SplitterConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name of the JSON report written into the destination
pub const REPORT_FILE: &str = "split-report.json";

/// One output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRecord {
    pub file_name: String,
    /// Source path relative to the source directory
    pub source: String,
    pub transaction_id: String,
    pub control_number: u64,
    /// ST02 as found in the source
    pub original_control_number: String,
    pub client: Option<Client>,
}

/// A source file that was not split completely
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub source: String,
    pub reason: String,
    /// Units already written from this file before the failure
    pub units_written: usize,
}

/// What a job did, delivered with `on_finish` and kept in the outcome
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSummary {
    pub files_total: usize,
    pub files_processed: usize,
    pub units: Vec<UnitRecord>,
    pub skipped: Vec<SkippedFile>,
    pub archives: Vec<PathBuf>,
}

impl JobSummary {
    pub fn units_written(&self) -> usize {
        self.units.len()
    }
}

#[derive(Debug, Serialize)]
pub struct JobReport<'a> {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: JobState,
    pub source: &'a Path,
    pub destination: &'a Path,
    pub failure_policy: FailurePolicy,
    pub control_seed: u64,
    pub error: Option<&'a str>,
    pub summary: &'a JobSummary,
}

impl<'a> JobReport<'a> {
    pub fn new(
        config: &'a SplitterConfig,
        summary: &'a JobSummary,
        state: JobState,
        started_at: DateTime<Utc>,
        error: Option<&'a str>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            state,
            source: &config.source,
            destination: &config.destination,
            failure_policy: config.failure_policy,
            control_seed: config.control_seed,
            error,
            summary,
        }
    }

    /// Write the report as pretty JSON into `dir`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize job report")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(path)
    }
}
