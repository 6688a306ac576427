use super::observer::{JobObserver, ProgressControl};
use super::report::{JobReport, JobSummary, SkippedFile, UnitRecord};
use super::scan::{collect_sources, prescan, SourceFile};
use super::state::{JobState, SharedStatus};
use super::{FileError, JobError, JobOutcome};
use crate::client;
use crate::config::{FailurePolicy, SplitterConfig};
use crate::emitter::{ClientArchiver, FileEmitter};
use crate::envelope::{CompletedTransaction, EnvelopeTracker};
use crate::splitter::{split_transaction, ControlNumberSequence};
use crate::x12::{self, charset, Delimiters};
use chrono::Utc;
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

enum Flow {
    Completed,
    Cancelled,
}

/// Everything the worker thread owns while a job runs
pub(crate) struct Worker {
    config: SplitterConfig,
    status: Arc<SharedStatus>,
    observer: Box<dyn JobObserver>,
    sequence: ControlNumberSequence,
    archiver: Option<ClientArchiver>,
    summary: JobSummary,
    cancel_requested: bool,
}

impl Worker {
    pub fn new(
        config: SplitterConfig,
        status: Arc<SharedStatus>,
        observer: Box<dyn JobObserver>,
    ) -> Self {
        let sequence = ControlNumberSequence::starting_at(config.control_seed);
        Self {
            config,
            status,
            observer,
            sequence,
            archiver: None,
            summary: JobSummary::default(),
            cancel_requested: false,
        }
    }

    /// Run the whole job and deliver the terminal notification
    pub fn run(mut self) -> JobOutcome {
        let started_at = Utc::now();
        info!(
            "Splitting {} into {}",
            self.config.source.display(),
            self.config.destination.display()
        );
        self.observer.on_start();

        let mut result = self.execute();

        if let Some(archiver) = self.archiver.take() {
            match archiver.finish() {
                Ok(paths) => self.summary.archives = paths,
                Err(e) => {
                    if result.is_ok() {
                        result = Err(e.into());
                    }
                }
            }
        }

        let (state, message) = match &result {
            Ok(Flow::Completed) => (JobState::Finished, None),
            Ok(Flow::Cancelled) => (JobState::Cancelled, None),
            Err(e) => (JobState::Failed, Some(e.to_string())),
        };

        if self.config.write_report && self.config.destination.is_dir() {
            let report = JobReport::new(
                &self.config,
                &self.summary,
                state,
                started_at,
                message.as_deref(),
            );
            if let Err(e) = report.write_to(&self.config.destination) {
                warn!("Failed to write job report: {:#}", e);
            }
        }

        self.status.finish(state);
        let summary = std::mem::take(&mut self.summary);
        match message {
            None if state == JobState::Finished => {
                info!(
                    "Finished: {} units from {} files, {} skipped",
                    summary.units_written(),
                    summary.files_processed,
                    summary.skipped.len()
                );
                self.observer.on_finish(&summary);
                JobOutcome::Finished(summary)
            }
            None => {
                info!("Cancelled after {} units", summary.units_written());
                JobOutcome::Cancelled(summary)
            }
            Some(message) => {
                error!("Job failed: {}", message);
                self.observer.on_error(&message);
                JobOutcome::Failed { message, summary }
            }
        }
    }

    fn execute(&mut self) -> Result<Flow, JobError> {
        let destination = self.prepare_destination()?;
        if self.config.archive_by_client {
            self.archiver = Some(ClientArchiver::new(&self.config.destination));
        }

        let mut files = collect_sources(&self.config.source, Some(&destination))?;
        let total = prescan(&mut files);
        info!("Pre-scan: {} transaction sets in {} files", total, files.len());
        self.summary.files_total = files.len();
        self.status.set_total(total);
        self.report_progress();

        let emitter =
            FileEmitter::new(&self.config.destination).line_breaks(self.config.line_breaks);
        let mut boundary = 0;

        for file in &files {
            if self.cancel_requested {
                return Ok(Flow::Cancelled);
            }
            if let Flow::Cancelled = self.process_file(file, &emitter)? {
                return Ok(Flow::Cancelled);
            }
            boundary += file.transactions;
            self.status.advance_to(boundary);
            self.report_progress();
        }

        Ok(Flow::Completed)
    }

    /// Check the source and create the destination; returns the canonical
    /// destination path used to keep it out of the scan.
    fn prepare_destination(&self) -> Result<PathBuf, JobError> {
        let source = &self.config.source;
        let destination = &self.config.destination;

        if !source.is_dir() {
            return Err(JobError::SourceNotFound(source.clone()));
        }
        if destination.exists() && !destination.is_dir() {
            return Err(JobError::Destination {
                path: destination.clone(),
                reason: "not a directory".to_string(),
            });
        }
        fs::create_dir_all(destination).map_err(|e| JobError::Destination {
            path: destination.clone(),
            reason: e.to_string(),
        })?;

        let canonical = destination
            .canonicalize()
            .map_err(|e| JobError::Destination {
                path: destination.clone(),
                reason: e.to_string(),
            })?;
        if source.canonicalize().ok().as_ref() == Some(&canonical) {
            return Err(JobError::Destination {
                path: destination.clone(),
                reason: "same as the source directory".to_string(),
            });
        }
        Ok(canonical)
    }

    fn process_file(&mut self, file: &SourceFile, emitter: &FileEmitter) -> Result<Flow, JobError> {
        info!("Processing {} ({} transaction sets)", file.name, file.transactions);

        let bytes = match fs::read(&file.path) {
            Ok(bytes) => bytes,
            Err(e) => return self.reject(file, e.into(), 0),
        };
        let text = charset::decode(&bytes);
        let segments = match x12::read(&text) {
            Ok(segments) => segments,
            Err(e) => return self.reject(file, e.into(), 0),
        };
        let delimiters = segments.delimiters();

        let mut tracker = EnvelopeTracker::new();
        let mut written = 0;
        for item in segments {
            if self.cancel_requested {
                return Ok(Flow::Cancelled);
            }
            let segment = match item {
                Ok(segment) => segment,
                Err(e) => return self.reject(file, e.into(), written),
            };
            match tracker.feed(segment) {
                Ok(Some(completed)) => {
                    self.write_unit(file, delimiters, completed, emitter)?;
                    written += 1;
                    self.status.advance(1);
                    self.report_progress();
                }
                Ok(None) => {}
                Err(e) => return self.reject(file, e.into(), written),
            }
        }
        if let Err(e) = tracker.finish() {
            return self.reject(file, e.into(), written);
        }

        self.summary.files_processed += 1;
        Ok(Flow::Completed)
    }

    fn write_unit(
        &mut self,
        file: &SourceFile,
        delimiters: Delimiters,
        completed: CompletedTransaction,
        emitter: &FileEmitter,
    ) -> Result<(), JobError> {
        let original_control_number = completed.transaction.control_number().to_string();
        let client = client::detect(&completed.transaction);

        let unit = split_transaction(completed, delimiters, &mut self.sequence)?;
        let emitted = emitter.emit(&unit, &file.name)?;

        if let (Some(archiver), Some(client)) = (self.archiver.as_mut(), client.as_ref()) {
            let entry = format!("{}/{}", file.name, emitted.file_name);
            archiver.add(client, &entry, &emitted.bytes)?;
        }

        self.summary.units.push(UnitRecord {
            file_name: emitted.file_name,
            source: file.name.clone(),
            transaction_id: unit.transaction_id().to_string(),
            control_number: unit.control_number,
            original_control_number,
            client,
        });
        Ok(())
    }

    /// Apply the failure policy to a per-file error
    fn reject(&mut self, file: &SourceFile, error: FileError, written: usize) -> Result<Flow, JobError> {
        match self.config.failure_policy {
            FailurePolicy::Skip => {
                warn!(
                    "Skipping {} after {} units: {}",
                    file.name, written, error
                );
                self.summary.skipped.push(SkippedFile {
                    source: file.name.clone(),
                    reason: error.to_string(),
                    units_written: written,
                });
                Ok(Flow::Completed)
            }
            FailurePolicy::Abort => Err(JobError::Malformed {
                path: file.name.clone(),
                error,
            }),
        }
    }

    fn report_progress(&mut self) {
        let progress = self.status.progress();
        if self.observer.on_progress(progress) == ProgressControl::Cancel && !self.cancel_requested {
            info!(
                "Cancellation requested at {}/{}",
                progress.current, progress.maximum
            );
            self.cancel_requested = true;
        }
    }
}
