//! fortunedb - in-memory indexed fortune corpus store
//!
//! Parses delimited "fortune" corpus files into immutable records with
//! derived display metrics, and serves ordinal lookup, uniform random
//! selection, and range/equality queries over those metrics.
//!
//! # Corpus format
//!
//! ```text
//! A fortune may span
//! several lines.
//! %%
//! The %% delimiter sits at the start of a line.
//! %%
//! Consecutive delimiters yield zero-length fortunes.
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fortunedb::{FortuneStore, Metric, MetricQuery};
//!
//! let store = FortuneStore::from_blob("first\n%%\nsecond\n")?;
//! let fortune = store.random()?;
//! let short = store.query_by_metric(Metric::Height, MetricQuery::AtMost(3))?;
//! ```
//!
//! The store is built once and immutable afterwards; any number of threads
//! may read it concurrently. [`FortuneLibrary`] layers a directory of corpus
//! files on top, with filename filtering and pooled random draws.

pub mod cli;
pub mod config;
mod corpus;
mod error;
mod library;
mod store;

pub use corpus::{Fortune, parse};
pub use error::{LibraryError, ParseError, StoreError};
pub use library::{FileFilter, FortuneLibrary};
pub use store::{FortuneStore, Metric, MetricQuery};

/// Delimiter token recognized at the start of a line
pub const DELIMITER: &str = "%%";
