//! Per-test line boundaries: `[ RUN ]` through the terminating status line.

use crate::models::LineRange;
use crate::patterns::{started_test, terminated_test};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Test name -> half-open line range.
pub struct TestBoundaries(BTreeMap<String, LineRange>);

impl TestBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, range: LineRange) {
        self.0.insert(name.into(), range);
    }

    pub fn get(&self, name: &str) -> Option<LineRange> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LineRange)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Derive boundaries from gtest markers in the corpus.
    ///
    /// A test opens at its `RUN` line and closes one past the first matching
    /// status line. A test that never reports a status runs until its next
    /// `RUN` or the end of the corpus.
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut out = TestBoundaries::new();
        let mut open: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if let Some(name) = started_test(line) {
                if let Some(prev) = open.insert(name.to_string(), idx) {
                    out.insert(name, LineRange::new(prev, idx));
                }
            } else if let Some(name) = terminated_test(line) {
                if let Some(start) = open.remove(name) {
                    out.insert(name, LineRange::new(start, idx + 1));
                }
            }
        }
        for (name, start) in open {
            log::debug!("test {name} never reported a status; extending to end of log");
            out.insert(name, LineRange::new(start, lines.len()));
        }
        out
    }

    /// Entries of `other` replace scanned entries of the same name.
    pub fn overlay(mut self, other: &TestBoundaries) -> Self {
        for (name, range) in other.iter() {
            self.insert(name, range);
        }
        self
    }
}
