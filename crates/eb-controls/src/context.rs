//! Debounce markers carried between evaluations.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Name of one debounced condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(String);

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Marker {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marks read from the previous evaluation and written for the next one.
///
/// A mark that is not written again during an evaluation is dropped by
/// [`Context::flip`], which resets the debounce of its condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    past: BTreeMap<Marker, DateTime<Utc>>,
    new: BTreeMap<Marker, DateTime<Utc>>,
}

impl Context {
    /// Context whose previous evaluation left `marks`.
    pub fn with_marks(marks: impl IntoIterator<Item = (Marker, DateTime<Utc>)>) -> Self {
        Self {
            past: marks.into_iter().collect(),
            new: BTreeMap::new(),
        }
    }

    pub fn previous(&self, marker: &Marker) -> Option<DateTime<Utc>> {
        self.past.get(marker).copied()
    }

    /// Keep `marker` for the next evaluation. The first write wins.
    pub fn next(&mut self, marker: &Marker, at: DateTime<Utc>) {
        self.new.entry(marker.clone()).or_insert(at);
    }

    pub fn flip(self) -> Context {
        Context {
            past: self.new,
            new: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.new.is_empty()
    }
}
