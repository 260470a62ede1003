//! Shared error type for `dp_core` (relation construction and the option system).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("dataset has no columns")]
    EmptyDataset,

    #[error("column index {index} out of range (relation has {num_columns} columns)")]
    ColumnIndexOutOfRange { index: usize, num_columns: usize },

    #[error("row {row} has {found} values, expected {expected}")]
    RowArityMismatch { row: usize, found: usize, expected: usize },

    #[error("cannot parse {value:?} in column {column} as {expected}")]
    ParseValue { column: usize, value: String, expected: &'static str },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("option not yet available: {0}")]
    OptionUnavailable(String),

    #[error("invalid value for option {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
