use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of a split job; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum JobState {
    Idle = 0,
    Running = 1,
    Finished = 2,
    Failed = 3,
    Cancelled = 4,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Finished,
            3 => Self::Failed,
            _ => Self::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Cancelled)
    }
}

/// Progress as shown to the caller; `current` never exceeds `maximum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub current: u64,
    pub maximum: u64,
}

/// State and progress shared between the caller and the worker thread
#[derive(Debug)]
pub(crate) struct SharedStatus {
    state: AtomicU8,
    total: AtomicU64,
    completed: AtomicU64,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(JobState::Idle as u8),
            total: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Idle -> Running; false if the job was already started
    pub fn try_start(&self) -> bool {
        self.state
            .compare_exchange(
                JobState::Idle as u8,
                JobState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Running -> terminal; ignored once a terminal state is reached
    pub fn finish(&self, terminal: JobState) {
        debug_assert!(terminal.is_terminal());
        let _ = self.state.compare_exchange(
            JobState::Running as u8,
            terminal as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Release);
    }

    pub fn advance(&self, units: u64) {
        self.completed.fetch_add(units, Ordering::AcqRel);
    }

    /// Raise the completed counter to at least `boundary`
    pub fn advance_to(&self, boundary: u64) {
        self.completed.fetch_max(boundary, Ordering::AcqRel);
    }

    pub fn progress(&self) -> Progress {
        let maximum = self.total.load(Ordering::Acquire);
        let current = self.completed.load(Ordering::Acquire).min(maximum);
        Progress { current, maximum }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_one_way() {
        let status = SharedStatus::new();
        assert_eq!(status.state(), JobState::Idle);

        assert!(status.try_start());
        assert!(!status.try_start());
        assert_eq!(status.state(), JobState::Running);

        status.finish(JobState::Cancelled);
        status.finish(JobState::Finished);
        assert_eq!(status.state(), JobState::Cancelled);
        assert!(!status.try_start());
    }

    #[test]
    fn test_progress_is_capped() {
        let status = SharedStatus::new();
        status.set_total(2);
        status.advance(3);
        assert_eq!(status.progress(), Progress { current: 2, maximum: 2 });
    }

    #[test]
    fn test_advance_to_never_goes_back() {
        let status = SharedStatus::new();
        status.set_total(10);
        status.advance(4);
        status.advance_to(3);
        assert_eq!(status.progress().current, 4);
        status.advance_to(7);
        assert_eq!(status.progress().current, 7);
    }
}
