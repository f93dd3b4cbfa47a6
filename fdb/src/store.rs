//! Indexed fortune store: ordinal access, uniform random draws, metric queries

use rand::Rng;
use tracing::debug;

use crate::corpus::{Fortune, parse};
use crate::error::{ParseError, StoreError};

/// A derived metric a store keeps a secondary ordering for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Total character count
    Length,
    /// Character count of the longest line
    Width,
    /// Line count
    Height,
}

impl Metric {
    /// The metric's value for a fortune.
    pub fn value_of(self, fortune: &Fortune) -> usize {
        match self {
            Self::Length => fortune.length(),
            Self::Width => fortune.width(),
            Self::Height => fortune.height(),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length => write!(f, "length"),
            Self::Width => write!(f, "width"),
            Self::Height => write!(f, "height"),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "length" => Ok(Self::Length),
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            other => Err(format!("unknown metric '{other}' (expected length, width, or height)")),
        }
    }
}

/// A range or equality predicate over a metric. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricQuery {
    Equals(usize),
    AtMost(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl MetricQuery {
    fn bounds(self) -> (usize, usize) {
        match self {
            Self::Equals(v) => (v, v),
            Self::AtMost(v) => (0, v),
            Self::AtLeast(v) => (v, usize::MAX),
            Self::Between(lo, hi) => (lo, hi),
        }
    }
}

/// An immutable corpus of fortunes with one primary and three secondary
/// orderings.
///
/// Fortunes are held once, in insertion order; the secondary orderings are
/// position arrays sorted by `(metric value, insertion position)` into the
/// same storage. Built once, then read-only: any number of threads may query
/// a shared store without coordination.
pub struct FortuneStore {
    fortunes: Vec<Fortune>,
    by_length: Vec<usize>,
    by_width: Vec<usize>,
    by_height: Vec<usize>,
}

impl FortuneStore {
    /// Build a store over parsed fortunes, constructing the secondary
    /// orderings.
    pub fn new(fortunes: Vec<Fortune>) -> Self {
        let by_length = sorted_positions(&fortunes, Metric::Length);
        let by_width = sorted_positions(&fortunes, Metric::Width);
        let by_height = sorted_positions(&fortunes, Metric::Height);
        debug!(fortunes = fortunes.len(), "built fortune store");
        Self {
            fortunes,
            by_length,
            by_width,
            by_height,
        }
    }

    /// Parse a corpus blob and build a store over it. All-or-nothing: a
    /// parse failure leaves no store behind.
    pub fn from_blob(raw: &str) -> Result<Self, ParseError> {
        Ok(Self::new(parse(raw)?))
    }

    /// The fortune at insertion position `index`.
    pub fn get(&self, index: usize) -> Result<&Fortune, StoreError> {
        self.fortunes.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            size: self.fortunes.len(),
        })
    }

    /// A uniformly random fortune, drawn from the process-wide thread-local
    /// generator. The generator is OS-seeded once per thread and never
    /// reseeded per call, so draws are not reproducible across runs; use
    /// [`FortuneStore::random_with`] with a seeded generator when they must
    /// be.
    pub fn random(&self) -> Result<&Fortune, StoreError> {
        self.random_with(&mut rand::rng())
    }

    /// A uniformly random fortune drawn from a caller-supplied generator.
    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Fortune, StoreError> {
        if self.fortunes.is_empty() {
            return Err(StoreError::EmptyCorpus);
        }
        Ok(&self.fortunes[rng.random_range(0..self.fortunes.len())])
    }

    /// Number of fortunes, zero-length ones included.
    pub fn len(&self) -> usize {
        self.fortunes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fortunes.is_empty()
    }

    /// Fortunes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Fortune> {
        self.fortunes.iter()
    }

    /// Fortunes satisfying `query` against `metric`, ascending by metric
    /// value with ties in insertion order. Bound location is O(log n) on the
    /// secondary ordering.
    pub fn query_by_metric(&self, metric: Metric, query: MetricQuery) -> Result<Vec<&Fortune>, StoreError> {
        if self.fortunes.is_empty() {
            return Err(StoreError::EmptyCorpus);
        }

        let (lo, hi) = query.bounds();
        if lo > hi {
            return Ok(Vec::new());
        }

        let ordering = self.ordering_for(metric);
        let start = ordering.partition_point(|&pos| metric.value_of(&self.fortunes[pos]) < lo);
        let end = ordering.partition_point(|&pos| metric.value_of(&self.fortunes[pos]) <= hi);
        Ok(ordering[start..end].iter().map(|&pos| &self.fortunes[pos]).collect())
    }

    fn ordering_for(&self, metric: Metric) -> &[usize] {
        match metric {
            Metric::Length => &self.by_length,
            Metric::Width => &self.by_width,
            Metric::Height => &self.by_height,
        }
    }
}

/// Positions sorted by metric value; the stable sort keeps ties in insertion
/// order.
fn sorted_positions(fortunes: &[Fortune], metric: Metric) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..fortunes.len()).collect();
    positions.sort_by_key(|&pos| metric.value_of(&fortunes[pos]));
    positions
}
