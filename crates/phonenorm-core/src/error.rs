use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid country identifier: {0:?}")]
    InvalidCountryId(String),
    #[error("invalid dialing code: {0:?}")]
    InvalidDialingCode(String),
    #[error("invalid required length: {0}")]
    InvalidLength(usize),
    #[error("invalid validation pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("duplicate country identifier: {0}")]
    DuplicateCountry(String),
}
