use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Unexpected {tag} at segment {position} (expected {expected})")]
    UnexpectedSegment {
        tag: String,
        position: usize,
        expected: String,
    },

    #[error("{tag} control number mismatch at segment {position}: expected {expected}, found {actual}")]
    ControlNumberMismatch {
        tag: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("{tag} count mismatch at segment {position}: expected {expected}, found {actual}")]
    CountMismatch {
        tag: String,
        position: usize,
        expected: usize,
        actual: String,
    },

    #[error("{tag}{index:02} is missing at segment {position}")]
    MissingElement {
        tag: String,
        index: usize,
        position: usize,
    },

    #[error("End of input with {level} {control_number} still open")]
    Unterminated {
        level: String,
        control_number: String,
    },
}
