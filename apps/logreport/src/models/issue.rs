//! Classified log findings as handed over by the analyzer.
//!
//! Field names follow the bundle JSON produced by the classifier: an issue
//! carries its matched events, every occurrence that collapsed into it, an
//! optional clustering signature, and the `[start, end)` window to display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Primary classification of an issue or event.
pub enum IssueType {
    Error,
    Warning,
    Crash,
    NinjaError,
    GtestFail,
    GtestFailureLine,
    CheckFailure,
    IncompleteTest,
    GroupedCluster,
}

impl IssueType {
    /// Event types that turn a grouped cluster into an error.
    pub fn is_error_class(self) -> bool {
        matches!(
            self,
            IssueType::Error
                | IssueType::Crash
                | IssueType::NinjaError
                | IssueType::GtestFail
                | IssueType::GtestFailureLine
                | IssueType::CheckFailure
        )
    }

    /// Primary types whose occurrences add to the error counter.
    pub fn counts_as_error(self) -> bool {
        self.is_error_class()
            || matches!(self, IssueType::GroupedCluster | IssueType::IncompleteTest)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::Error => "error",
            IssueType::Warning => "warning",
            IssueType::Crash => "crash",
            IssueType::NinjaError => "ninja_error",
            IssueType::GtestFail => "gtest_fail",
            IssueType::GtestFailureLine => "gtest_failure_line",
            IssueType::CheckFailure => "check_failure",
            IssueType::IncompleteTest => "incomplete_test",
            IssueType::GroupedCluster => "grouped_cluster",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
/// Half-open `[start, end)` range of 0-indexed corpus lines.
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }

    /// Intersection with `outer`, collapsed to an empty range at
    /// `outer.start` when the two do not overlap.
    pub fn clip_to(&self, outer: LineRange) -> LineRange {
        let start = self.start.max(outer.start);
        let end = self.end.min(outer.end);
        if start > end {
            LineRange::new(start.min(outer.end), start.min(outer.end))
        } else {
            LineRange::new(start, end)
        }
    }

    /// Clamp both ends into `[0, len]` keeping `start <= end`.
    pub fn clamp(&self, len: usize) -> LineRange {
        let end = self.end.min(len);
        LineRange::new(self.start.min(end), end)
    }
}

impl From<(usize, usize)> for LineRange {
    fn from((start, end): (usize, usize)) -> Self {
        LineRange::new(start, end)
    }
}

impl From<LineRange> for (usize, usize) {
    fn from(r: LineRange) -> Self {
        (r.start, r.end)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Event payload. Known keys are typed; anything else is kept verbatim.
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crash_events: Vec<Event>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One matched log line.
pub struct Event {
    pub line_num: usize,
    pub issue_type: IssueType,
    #[serde(default)]
    pub data: EventData,
}

impl Event {
    pub fn new(line_num: usize, issue_type: IssueType) -> Self {
        Self {
            line_num,
            issue_type,
            data: EventData::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// One line that collapsed into an issue, possibly from another test.
pub struct Occurrence {
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub line_content: String,
}

impl Occurrence {
    pub fn new(test_name: Option<&str>, line_content: &str) -> Self {
        Self {
            test_name: test_name.map(str::to_string),
            line_content: line_content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A classified and possibly clustered finding.
pub struct Issue {
    pub issue_type: IssueType,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub test_name: Option<String>,
    #[serde(default)]
    pub context: Option<LineRange>,
    #[serde(default)]
    pub extra_context_tests: Option<Vec<Occurrence>>,
}

impl Issue {
    pub fn new(issue_type: IssueType, events: Vec<Event>) -> Self {
        Self {
            issue_type,
            events,
            occurrences: Vec::new(),
            signature: None,
            test_name: None,
            context: None,
            extra_context_tests: None,
        }
    }

    pub fn first_event(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Ordering key: context start, else the first event's line.
    pub fn sort_key(&self) -> usize {
        match self.context {
            Some(ctx) => ctx.start,
            None => self.first_event().map_or(0, |e| e.line_num),
        }
    }

    /// Occurrence total used for counters and headers; never below 1.
    pub fn total_occurrences(&self) -> usize {
        self.occurrences.len().max(1)
    }

    /// `error` or `warning` for grouped clusters, the issue type otherwise.
    pub fn primary_type(&self) -> IssueType {
        if self.issue_type != IssueType::GroupedCluster {
            return self.issue_type;
        }
        if self.events.iter().any(|e| e.issue_type.is_error_class()) {
            IssueType::Error
        } else {
            IssueType::Warning
        }
    }

    /// Clusters containing a gtest failure keep per-test rendering.
    pub fn is_gtest_single(&self) -> bool {
        self.issue_type == IssueType::GroupedCluster
            && self
                .events
                .iter()
                .any(|e| e.issue_type == IssueType::GtestFail)
    }

    /// Number of distinct occurrence test names, an absent name counting
    /// as one value of its own.
    pub fn distinct_occurrence_tests(&self) -> usize {
        let mut names: Vec<Option<&str>> = self
            .occurrences
            .iter()
            .map(|o| o.test_name.as_deref())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    pub fn is_multi_test(&self) -> bool {
        !self.is_gtest_single() && self.distinct_occurrence_tests() >= 2
    }

    /// Line content of the first occurrence, the reference for exact matches.
    pub fn primary_line(&self) -> &str {
        self.occurrences
            .first()
            .map_or("", |o| o.line_content.as_str())
    }

    /// Window spanned by the events, used when no context was supplied.
    pub fn event_span(&self) -> LineRange {
        let lo = self.events.iter().map(|e| e.line_num).min().unwrap_or(0);
        let hi = self.events.iter().map(|e| e.line_num + 1).max().unwrap_or(lo);
        LineRange::new(lo, hi)
    }
}
