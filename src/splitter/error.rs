use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("Control numbers exhausted after {last} (max {max})")]
    ControlNumbersExhausted { last: u64, max: u64 },
}
