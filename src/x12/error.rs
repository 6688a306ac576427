use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed interchange header: {0}")]
    MalformedHeader(String),

    #[error("Tokenization failed at segment {position}: {reason}")]
    Tokenization { position: usize, reason: String },
}
