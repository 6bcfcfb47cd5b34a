use thiserror::Error;

use crate::types::LoanStatus;

/// coarse classification of a [`LoanError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// value does not match the declared type of the field
    Type,
    /// value has the right type but lies outside its bounds or allowed set
    Range,
    /// operation is not allowed once the loan is fully prepaid
    TerminalState,
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid type for {field}: expected {expected}, found {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("missing required field: {field}")]
    MissingField {
        field: String,
    },

    #[error("{field} out of range: {message}")]
    OutOfRange {
        field: String,
        message: String,
    },

    #[error("invalid date for {field}: {value}")]
    InvalidDate {
        field: String,
        value: String,
    },

    #[error("unknown payment frequency: {code}")]
    UnknownFrequency {
        code: String,
    },

    #[error("additional payment period {period} outside schedule of {periods} periods")]
    PeriodOutOfRange {
        period: u32,
        periods: u32,
    },

    #[error("{message} (status {status:?})")]
    TerminalState {
        status: LoanStatus,
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl LoanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoanError::InvalidType { .. }
            | LoanError::MissingField { .. }
            | LoanError::Serialization { .. } => ErrorKind::Type,
            LoanError::OutOfRange { .. }
            | LoanError::InvalidDate { .. }
            | LoanError::UnknownFrequency { .. }
            | LoanError::PeriodOutOfRange { .. } => ErrorKind::Range,
            LoanError::TerminalState { .. } => ErrorKind::TerminalState,
        }
    }

    pub fn is_terminal_state(&self) -> bool {
        self.kind() == ErrorKind::TerminalState
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
