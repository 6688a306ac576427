use super::report::JobSummary;
use super::state::Progress;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Answer of a progress notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressControl {
    Continue,
    /// Stop at the next checkpoint; the unit in flight is still completed
    Cancel,
}

/// Lifecycle notifications of a split job.
///
/// Every method is called from the worker thread, in this order: one
/// `on_start`, any number of `on_progress`, then one of `on_finish` or
/// `on_error`. A cancelled job ends without either.
pub trait JobObserver: Send {
    fn on_start(&mut self) {}

    /// Called after every split unit and after every file
    fn on_progress(&mut self, _progress: Progress) -> ProgressControl {
        ProgressControl::Continue
    }

    fn on_error(&mut self, _message: &str) {}

    fn on_finish(&mut self, _summary: &JobSummary) {}
}

/// Observer that ignores every notification
pub struct NoopObserver;

impl JobObserver for NoopObserver {}

type StartFn = Box<dyn FnMut() + Send>;
type ProgressFn = Box<dyn FnMut(Progress) -> ProgressControl + Send>;
type ErrorFn = Box<dyn FnMut(&str) + Send>;
type FinishFn = Box<dyn FnMut(&JobSummary) + Send>;

/// Observer assembled from closures, one per notification
#[derive(Default)]
pub struct Callbacks {
    start: Option<StartFn>,
    progress: Option<ProgressFn>,
    error: Option<ErrorFn>,
    finish: Option<FinishFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_progress(
        mut self,
        f: impl FnMut(Progress) -> ProgressControl + Send + 'static,
    ) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_finish(mut self, f: impl FnMut(&JobSummary) + Send + 'static) -> Self {
        self.finish = Some(Box::new(f));
        self
    }
}

impl JobObserver for Callbacks {
    fn on_start(&mut self) {
        if let Some(f) = self.start.as_mut() {
            f();
        }
    }

    fn on_progress(&mut self, progress: Progress) -> ProgressControl {
        match self.progress.as_mut() {
            Some(f) => f(progress),
            None => ProgressControl::Continue,
        }
    }

    fn on_error(&mut self, message: &str) {
        if let Some(f) = self.error.as_mut() {
            f(message);
        }
    }

    fn on_finish(&mut self, summary: &JobSummary) {
        if let Some(f) = self.finish.as_mut() {
            f(summary);
        }
    }
}

/// Notification forwarded by [`ChannelObserver`]
#[derive(Debug, Clone)]
pub enum JobEvent {
    Started,
    Progress(Progress),
    Failed(String),
    Finished(JobSummary),
}

/// Caller-side switch read by [`ChannelObserver`] on every progress report
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Forwards notifications over a flume channel so the caller can consume
/// them on its own thread.
pub struct ChannelObserver {
    sender: flume::Sender<JobEvent>,
    cancel: CancelHandle,
}

impl ChannelObserver {
    /// Create an observer, the receiving end and the cancel switch
    pub fn new() -> (Self, flume::Receiver<JobEvent>, CancelHandle) {
        let (sender, receiver) = flume::unbounded();
        let cancel = CancelHandle::default();
        let observer = Self {
            sender,
            cancel: cancel.clone(),
        };
        (observer, receiver, cancel)
    }
}

impl JobObserver for ChannelObserver {
    fn on_start(&mut self) {
        let _ = self.sender.send(JobEvent::Started);
    }

    fn on_progress(&mut self, progress: Progress) -> ProgressControl {
        let _ = self.sender.send(JobEvent::Progress(progress));
        if self.cancel.is_cancelled() {
            ProgressControl::Cancel
        } else {
            ProgressControl::Continue
        }
    }

    fn on_error(&mut self, message: &str) {
        let _ = self.sender.send(JobEvent::Failed(message.to_string()));
    }

    fn on_finish(&mut self, summary: &JobSummary) {
        let _ = self.sender.send(JobEvent::Finished(summary.clone()));
    }
}
