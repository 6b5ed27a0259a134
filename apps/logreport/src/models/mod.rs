//! Shared data models: classified issues on the way in, reports on the way out.

pub mod issue;

pub use issue::{Event, EventData, Issue, IssueType, LineRange, Occurrence};

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// A rendered diagnostic report with its counters.
pub struct Report {
    pub text: String,
    pub errors: usize,
    pub warnings: usize,
    /// Items that produced a block.
    pub reported: usize,
    /// Items dropped as repeats of an already reported multi-test signature.
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Report for one input bundle, as collected by a batch run.
pub struct BundleReport {
    pub bundle: String,
    pub log: String,
    pub report: Report,
}

#[derive(Debug, Default, Serialize)]
/// Aggregated totals used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub bundles: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
/// Batch results container.
pub struct BatchResult {
    pub reports: Vec<BundleReport>,
    /// Bundles that could not be loaded, as `(path, message)`.
    pub failures: Vec<(String, String)>,
    pub summary: Summary,
}
