//! Background split job: walks the source directory on a worker thread and
//! reports progress to an observer.

mod error;
mod observer;
mod report;
mod runner;
mod scan;
mod state;


pub use error::{FileError, JobError};
pub use observer::{
    CancelHandle, Callbacks, ChannelObserver, JobEvent, JobObserver, NoopObserver,
    ProgressControl,
};
pub use report::{JobReport, JobSummary, SkippedFile, UnitRecord, REPORT_FILE};
pub use scan::{collect_sources, count_transactions, prescan, SourceFile};
pub use state::{JobState, Progress};

use crate::config::SplitterConfig;
use log::error;
use runner::Worker;
use state::SharedStatus;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "edi-split";

/// How a job ended
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Finished(JobSummary),
    Failed { message: String, summary: JobSummary },
    Cancelled(JobSummary),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Finished(_) => JobState::Finished,
            Self::Failed { .. } => JobState::Failed,
            Self::Cancelled(_) => JobState::Cancelled,
        }
    }

    pub fn summary(&self) -> &JobSummary {
        match self {
            Self::Finished(summary) | Self::Cancelled(summary) => summary,
            Self::Failed { summary, .. } => summary,
        }
    }
}

/// A split job that can be started once
pub struct SplitJob {
    config: SplitterConfig,
    status: Arc<SharedStatus>,
}

impl SplitJob {
    /// Job with default options for the given directories
    pub fn configure(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(SplitterConfig::new(source, destination))
    }

    pub fn new(config: SplitterConfig) -> Self {
        Self {
            config,
            status: Arc::new(SharedStatus::new()),
        }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn state(&self) -> JobState {
        self.status.state()
    }

    pub fn progress(&self) -> Progress {
        self.status.progress()
    }

    /// Spawn the worker thread. Fails if the job was started before or the
    /// configuration is invalid; everything else is reported to `observer`.
    pub fn start(&self, observer: impl JobObserver + 'static) -> Result<JobHandle, JobError> {
        self.config.validate()?;
        if !self.status.try_start() {
            return Err(JobError::AlreadyStarted);
        }

        let worker = Worker::new(
            self.config.clone(),
            Arc::clone(&self.status),
            Box::new(observer),
        );
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run());

        match spawned {
            Ok(thread) => Ok(JobHandle {
                thread,
                status: Arc::clone(&self.status),
            }),
            Err(e) => {
                self.status.finish(JobState::Failed);
                Err(JobError::Spawn(e))
            }
        }
    }

    /// Start and wait for the outcome
    pub fn run(&self, observer: impl JobObserver + 'static) -> Result<JobOutcome, JobError> {
        Ok(self.start(observer)?.join())
    }
}

/// Handle to a running job
pub struct JobHandle {
    thread: JoinHandle<JobOutcome>,
    status: Arc<SharedStatus>,
}

impl JobHandle {
    pub fn state(&self) -> JobState {
        self.status.state()
    }

    pub fn progress(&self) -> Progress {
        self.status.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the worker thread ends
    pub fn join(self) -> JobOutcome {
        match self.thread.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Worker thread panicked");
                self.status.finish(JobState::Failed);
                JobOutcome::Failed {
                    message: "worker thread panicked".to_string(),
                    summary: JobSummary::default(),
                }
            }
        }
    }
}
