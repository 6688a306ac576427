// Public API exports
pub mod client;
pub mod config;
pub mod emitter;
pub mod envelope;
pub mod job;
pub mod splitter;
pub mod x12;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use client::Client;
pub use config::{ConfigError, FailurePolicy, SplitterConfig};

pub use x12::{Delimiters, ParseError, Segment, Segments};

pub use envelope::{CompletedTransaction, EnvelopeError, EnvelopeTracker, TransactionSet};

pub use splitter::{split_transaction, ControlNumberSequence, SplitError, SplitUnit};

pub use emitter::{ClientArchiver, EmitError, EmittedFile, FileEmitter};

pub use job::{
    Callbacks, CancelHandle, ChannelObserver, JobError, JobEvent, JobObserver, JobOutcome,
    JobState, JobSummary, NoopObserver, Progress, ProgressControl, SplitJob,
};
