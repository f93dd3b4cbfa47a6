//! Error types for corpus parsing and store queries

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a corpus blob
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("corpus text is empty")]
    EmptyInput,
}

/// Errors raised by store queries
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ordinal {index} out of range (store holds {size} entries)")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("store holds no entries")]
    EmptyCorpus,
}

/// Errors raised by the file-backed fortune library
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("fortunes directory not readable: {path}")]
    DirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid file name pattern")]
    InvalidPattern(#[from] regex::Error),

    #[error("no fortunes in files matching the filter")]
    NoMatchingFortunes,

    #[error(transparent)]
    Store(#[from] StoreError),
}
