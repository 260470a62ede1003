//! dp_io — dataset ingestion: reads a CSV file into `dp_core::Relation`.
//!
//! - No inline parsing here beyond the single `csv` module: one source of
//!   truth for "what counts as a row".
//! - Unified error type (`IoError`) with `From` conversions, used across the
//!   crate.

#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Core(#[from] dp_core::CoreError),
}

pub type IoResult<T> = Result<T, IoError>;

pub mod csv_source;

pub mod prelude {
    pub use crate::csv_source::{load_csv_file, load_csv_reader, CsvOptions};
    pub use crate::{IoError, IoResult};
}
