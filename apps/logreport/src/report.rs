//! Diagnostic report generation over classified log issues.
//!
//! One pass over the issues sorted by position. Every reported issue yields
//! a contiguous block:
//! - a `--- TITLE ... ---` header,
//! - the enclosing test's `[ RUN ]` line when the window starts later,
//! - the log window with highlighted lines and skip markers,
//! - cross-test notes for issues seen in other failures,
//! - the test's final status line when the test finished.
//!
//! Issues spanning several tests are rendered once per signature; later
//! issues with the same signature are dropped. Clipped windows are computed
//! per call and never written back, so generating twice yields the same text.

use crate::analyzer::{format_log_line, line_num_width, LogAnalyzer};
use crate::boundaries::TestBoundaries;
use crate::models::{Issue, IssueType, LineRange, Occurrence, Report};
use crate::occurrence::{format_occurrence_detail, OccurrenceCounts};
use crate::patterns::is_terminating_status;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const THIS_TEST_NOTE: &str = "Also occurred in combination with other failures in this test";
pub const THESE_TESTS_NOTE: &str =
    "Also occurred in combination with other failures in these tests: ";
pub const OCCURRED_IN_PREFIX: &str = "Occurred in these tests: ";

/// Per-issue facts derived once before rendering.
struct ItemView<'i> {
    item: &'i Issue,
    primary: IssueType,
    multi_test: bool,
    /// Display window after clipping to the test boundaries.
    context: LineRange,
    /// Enclosing test and its boundaries, when both are known.
    test: Option<(&'i str, LineRange)>,
    finished: bool,
    will_print_run_line: bool,
}

impl ItemView<'_> {
    /// Test name for display, falling back to the first event's.
    fn display_test_name(&self) -> Option<&str> {
        self.item.test_name.as_deref().or_else(|| {
            self.item
                .first_event()
                .and_then(|e| e.data.test_name.as_deref())
        })
    }
}

/// Renders issues against a borrowed analyzer and test boundaries.
pub struct ReportGenerator<'a, A: LogAnalyzer + ?Sized> {
    analyzer: &'a A,
    boundaries: &'a TestBoundaries,
}

impl<'a, A: LogAnalyzer + ?Sized> ReportGenerator<'a, A> {
    pub fn new(analyzer: &'a A, boundaries: &'a TestBoundaries) -> Self {
        Self {
            analyzer,
            boundaries,
        }
    }

    /// Build the full report for `items`.
    pub fn generate(&self, items: &[Issue]) -> Report {
        let width = line_num_width(self.analyzer.lines().len());

        let mut order: Vec<&Issue> = items.iter().collect();
        order.sort_by_key(|item| item.sort_key());

        let incomplete_tests: HashSet<&str> = items
            .iter()
            .filter(|item| item.issue_type == IssueType::IncompleteTest)
            .filter_map(|item| {
                item.test_name.as_deref().or_else(|| {
                    item.first_event()
                        .and_then(|e| e.data.test_name.as_deref())
                })
            })
            .collect();

        let mut seen_signatures: HashSet<String> = HashSet::new();
        let mut report = Report::default();
        let mut results: Vec<String> = Vec::new();

        for item in order {
            let multi_test = item.is_multi_test();
            if multi_test {
                if let Some(sig) = item.signature.as_deref() {
                    if seen_signatures.contains(sig) {
                        log::debug!("skipping repeat of multi-test signature {sig}");
                        report.skipped += 1;
                        continue;
                    }
                }
            }

            let primary = item.primary_type();
            let total = item.total_occurrences();
            if primary.counts_as_error() {
                report.errors += total;
            } else if primary == IssueType::Warning {
                report.warnings += total;
            }

            let view = self.view(item, primary, multi_test);

            if item.issue_type == IssueType::Crash && !multi_test {
                if let Some(name) = view.display_test_name() {
                    if incomplete_tests.contains(name) {
                        log::debug!("crash in {name} is covered by its incomplete-test block");
                        continue;
                    }
                }
            }

            let mut block = vec![self.header(&view)];
            if view.will_print_run_line {
                self.add_run_line(&mut block, &view, width);
            }
            self.add_body(&mut block, &view, width, &mut seen_signatures);
            add_extra_context(&mut block, item);
            if view.finished && !multi_test {
                self.add_final_status(&mut block, &view, width);
            }

            if !results.is_empty() {
                results.push(String::new());
            }
            results.extend(block);
            report.reported += 1;
        }

        report.text = results.join("\n");
        report
    }

    fn view<'i>(&self, item: &'i Issue, primary: IssueType, multi_test: bool) -> ItemView<'i> {
        let len = self.analyzer.lines().len();
        let raw = item
            .context
            .unwrap_or_else(|| item.event_span())
            .clamp(len);
        let test = item
            .test_name
            .as_deref()
            .and_then(|name| self.boundaries.get(name).map(|range| (name, range)));
        let context = match test {
            Some((_, range)) => raw.clip_to(range),
            None => raw,
        };
        let finished = test.is_some_and(|(_, range)| self.is_finished(range));
        let will_print_run_line = finished || (test.is_some() && item.context.is_some());
        ItemView {
            item,
            primary,
            multi_test,
            context,
            test,
            finished,
            will_print_run_line,
        }
    }

    /// The test's last line is an OK, FAILED, or SKIPPED status.
    fn is_finished(&self, test: LineRange) -> bool {
        let lines = self.analyzer.lines();
        test.end > 0 && test.end <= lines.len() && is_terminating_status(&lines[test.end - 1])
    }

    fn header(&self, view: &ItemView<'_>) -> String {
        let item = view.item;
        let counts = OccurrenceCounts::against(&item.occurrences, item.primary_line());
        let occurrence_info = format_occurrence_detail(
            item.total_occurrences(),
            counts.exact,
            counts.similar,
            true,
        );

        if view.multi_test {
            let title = if item.events.iter().any(|e| e.issue_type == IssueType::Crash) {
                "CRASH"
            } else if !item.events.iter().any(|e| e.issue_type.is_error_class()) {
                "WARNING"
            } else {
                "ISSUE"
            };
            return format!(
                "--- {}{} across {} tests ---",
                title,
                occurrence_info,
                item.distinct_occurrence_tests()
            );
        }

        match item.issue_type {
            IssueType::IncompleteTest => {
                let crashes = item.first_event().map_or(0, |e| e.data.crash_events.len());
                if crashes > 0 {
                    let occurred = if crashes > 1 {
                        format!(" (occurred {} times)", crashes)
                    } else {
                        String::new()
                    };
                    format!("--- CRASH{} ---", occurred)
                } else {
                    format!(
                        "--- ERROR: Test '{}' did not complete ---",
                        view.display_test_name().unwrap_or("unknown")
                    )
                }
            }
            IssueType::Crash => {
                let event = item.first_event();
                let signal = event
                    .and_then(|e| e.data.signal.as_deref())
                    .unwrap_or("unknown signal");
                let during = event
                    .and_then(|e| e.data.test_name.as_deref())
                    .map(|name| format!(" during test '{}'", name))
                    .unwrap_or_default();
                format!("--- CRASH DETECTED: {}{} ---", signal, during)
            }
            _ => {
                let title = if view.primary == IssueType::Warning {
                    "WARNING"
                } else {
                    "ERROR"
                };
                let scope = match view.display_test_name() {
                    Some(name) if !view.will_print_run_line => {
                        format!(" during test '{}'", name)
                    }
                    _ => String::new(),
                };
                format!("--- {}{}{} ---", title, occurrence_info, scope)
            }
        }
    }

    fn add_run_line(&self, out: &mut Vec<String>, view: &ItemView<'_>, width: usize) {
        let Some((_, test)) = view.test else {
            return;
        };
        if view.context.start <= test.start {
            return;
        }
        let lines = self.analyzer.lines();
        out.push(format_log_line(test.start, &lines[test.start], false, width));
        self.analyzer
            .add_skipped_lines_message(out, view.context.start - (test.start + 1), width);
    }

    fn add_body(
        &self,
        out: &mut Vec<String>,
        view: &ItemView<'_>,
        width: usize,
        seen_signatures: &mut HashSet<String>,
    ) {
        let item = view.item;
        let ctx = view.context;

        if view.multi_test {
            self.add_multi_test_body(out, view, width);
            if let Some(sig) = item.signature.as_ref() {
                seen_signatures.insert(sig.clone());
            }
            return;
        }

        match item.issue_type {
            IssueType::IncompleteTest => {
                let crash_events = item
                    .first_event()
                    .map(|e| e.data.crash_events.as_slice())
                    .unwrap_or_default();
                if crash_events.is_empty() {
                    self.analyzer.add_log_lines_with_skipping(
                        out,
                        ctx.start,
                        ctx.end,
                        &BTreeSet::new(),
                        None,
                        width,
                    );
                    return;
                }
                let traces = self
                    .analyzer
                    .extract_and_filter_stack_traces(ctx.start, ctx.end);
                let mut highlights: BTreeSet<usize> = crash_events
                    .iter()
                    .map(|e| e.line_num)
                    .filter(|&l| ctx.contains(l))
                    .collect();
                let lines = self.analyzer.lines();
                for idx in ctx.start..ctx.end {
                    let line = lines[idx].as_str();
                    if traces.iter().flatten().any(|t| line.contains(t.as_str())) {
                        highlights.insert(idx);
                    }
                }
                self.analyzer.add_log_lines_with_skipping(
                    out,
                    ctx.start,
                    ctx.end,
                    &highlights,
                    Some(traces.as_slice()),
                    width,
                );
            }
            IssueType::Crash => {
                let highlights: BTreeSet<usize> = item
                    .first_event()
                    .map(|e| e.line_num)
                    .filter(|&l| ctx.contains(l))
                    .into_iter()
                    .collect();
                self.analyzer
                    .add_log_lines_with_skipping(out, ctx.start, ctx.end, &highlights, None, width);
            }
            _ => {
                let highlights: BTreeSet<usize> = item
                    .events
                    .iter()
                    .map(|e| e.line_num)
                    .filter(|&l| ctx.contains(l))
                    .collect();
                self.analyzer
                    .add_log_lines_with_skipping(out, ctx.start, ctx.end, &highlights, None, width);
            }
        }
    }

    /// Window of the first event's test, then the per-test listing.
    fn add_multi_test_body(&self, out: &mut Vec<String>, view: &ItemView<'_>, width: usize) {
        let item = view.item;
        let len = self.analyzer.lines().len();
        let range = item
            .first_event()
            .and_then(|e| e.data.test_name.as_deref())
            .and_then(|name| self.boundaries.get(name))
            .map_or(view.context, |r| r.clamp(len));
        let highlights: BTreeSet<usize> = item
            .events
            .iter()
            .map(|e| e.line_num)
            .filter(|&l| range.contains(l))
            .collect();
        self.analyzer
            .add_log_lines_with_skipping(out, range.start, range.end, &highlights, None, width);

        let mut per_test: BTreeMap<&str, Vec<&Occurrence>> = BTreeMap::new();
        for o in &item.occurrences {
            if let Some(name) = o.test_name.as_deref() {
                per_test.entry(name).or_default().push(o);
            }
        }
        let primary_line = item.primary_line();
        let listing: Vec<String> = per_test
            .into_iter()
            .map(|(name, occurrences)| {
                let counts = OccurrenceCounts::against(occurrences, primary_line);
                format!("{}{}", name, counts.detail(false))
            })
            .collect();
        out.push(String::new());
        out.push(format!("{}{}", OCCURRED_IN_PREFIX, listing.join(", ")));
    }

    /// Close a finished test with its status line.
    fn add_final_status(&self, out: &mut Vec<String>, view: &ItemView<'_>, width: usize) {
        let Some((_, test)) = view.test else {
            return;
        };
        let final_index = test.end - 1;
        if final_index < view.context.end {
            return;
        }
        self.analyzer
            .add_skipped_lines_message(out, final_index - view.context.end, width);
        let lines = self.analyzer.lines();
        out.push(format_log_line(final_index, &lines[final_index], false, width));
    }
}

/// Note on other failures sharing this issue's signature.
fn add_extra_context(out: &mut Vec<String>, item: &Issue) {
    let Some(extra) = item.extra_context_tests.as_ref() else {
        return;
    };
    if extra.is_empty() {
        return;
    }
    let named: Vec<&Occurrence> = extra.iter().filter(|o| o.test_name.is_some()).collect();
    let names: BTreeSet<&str> = named
        .iter()
        .filter_map(|o| o.test_name.as_deref())
        .collect();

    out.push(String::new());
    let current = item.test_name.as_deref();
    if names.len() == 1 && current.is_some_and(|c| names.contains(c)) {
        let counts = OccurrenceCounts::against(named.iter().copied(), item.primary_line());
        out.push(format!("{}{}.", THIS_TEST_NOTE, counts.detail(false)));
    } else {
        out.push(THESE_TESTS_NOTE.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::LogCorpus;
    use crate::models::Event;

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    fn error_item(context: (usize, usize), events: &[usize], contents: &[&str]) -> Issue {
        let mut item = Issue::new(
            IssueType::Error,
            events.iter().map(|&l| Event::new(l, IssueType::Error)).collect(),
        );
        item.context = Some(context.into());
        item.occurrences = contents.iter().map(|c| Occurrence::new(None, c)).collect();
        item
    }

    fn render(lines: Vec<String>, items: &[Issue]) -> Report {
        let corpus = LogCorpus::new(lines);
        let boundaries = TestBoundaries::scan(corpus.lines());
        ReportGenerator::new(&corpus, &boundaries).generate(items)
    }

    fn event_in(line: usize, ty: IssueType, test: &str) -> Event {
        let mut e = Event::new(line, ty);
        e.data.test_name = Some(test.to_string());
        e
    }

    #[test]
    fn test_single_exact_repeat() {
        let item = error_item((2, 5), &[2, 4], &["boom", "boom", "boom"]);
        let report = render(numbered(10), &[item]);
        assert_eq!(
            report.text,
            "--- ERROR (3 times exact) ---\n\
             >  3: line 2\n   4: line 3\n>  5: line 4"
        );
        assert_eq!(report.errors, 3);
        assert_eq!(report.warnings, 0);
    }

    #[test]
    fn test_similar_repeats_hide_reference_line() {
        let item = error_item((2, 5), &[2, 4], &["boom", "boom 1", "boom 2"]);
        let report = render(numbered(10), &[item]);
        assert!(report.text.starts_with("--- ERROR (3 times; 2 similar) ---\n"));
    }

    #[test]
    fn test_single_occurrence_has_no_suffix() {
        let item = error_item((0, 1), &[0], &["boom"]);
        let report = render(numbered(3), &[item]);
        assert!(report.text.starts_with("--- ERROR ---\n"));
    }

    fn cluster_corpus() -> Vec<String> {
        [
            "[ RUN      ] A.T",
            "boom",
            "[  FAILED  ] A.T",
            "[ RUN      ] B.T",
            "boom",
            "[  FAILED  ] B.T",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn cluster_item(context: (usize, usize)) -> Issue {
        let mut item = Issue::new(
            IssueType::GroupedCluster,
            vec![
                event_in(1, IssueType::Error, "A.T"),
                event_in(4, IssueType::Error, "B.T"),
            ],
        );
        item.signature = Some("sig".into());
        item.context = Some(context.into());
        item.occurrences = vec![
            Occurrence::new(Some("B.T"), "boom"),
            Occurrence::new(Some("A.T"), "boom x"),
            Occurrence::new(Some("A.T"), "boom"),
            Occurrence::new(Some("B.T"), "boom"),
        ];
        item
    }

    #[test]
    fn test_multi_test_cluster_reported_once() {
        let report = render(cluster_corpus(), &[cluster_item((1, 2)), cluster_item((4, 5))]);
        assert_eq!(
            report.text,
            "--- ISSUE (4 times; 3 exact, 1 similar) across 2 tests ---\n\
             \x20 1: [ RUN      ] A.T\n\
             > 2: boom\n\
             \x20 3: [  FAILED  ] A.T\n\
             \n\
             Occurred in these tests: A.T (2 times; 1 exact, 1 similar), B.T (2 times exact)"
        );
        assert_eq!(report.errors, 4);
        assert_eq!(report.reported, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_cluster_without_signature_is_not_deduplicated() {
        let mut a = cluster_item((1, 2));
        let mut b = cluster_item((4, 5));
        a.signature = None;
        b.signature = None;
        let report = render(cluster_corpus(), &[a, b]);
        assert_eq!(report.reported, 2);
        assert_eq!(report.errors, 8);
    }

    #[test]
    fn test_multi_test_titles() {
        let mut crash = cluster_item((1, 2));
        crash.events[1].issue_type = IssueType::Crash;
        assert!(render(cluster_corpus(), &[crash])
            .text
            .starts_with("--- CRASH (4 times"));

        let mut warn = cluster_item((1, 2));
        for e in warn.events.iter_mut() {
            e.issue_type = IssueType::Warning;
        }
        let report = render(cluster_corpus(), &[warn]);
        assert!(report.text.starts_with("--- WARNING (4 times"));
        assert_eq!(report.warnings, 4);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_multi_test_cluster_gets_run_line() {
        let mut item = cluster_item((2, 3));
        item.test_name = Some("A.T".into());
        let report = render(cluster_corpus(), &[item]);
        let got: Vec<&str> = report.text.lines().collect();
        assert_eq!(
            got,
            vec![
                "--- ISSUE (4 times; 3 exact, 1 similar) across 2 tests ---",
                "  1: [ RUN      ] A.T",
                "  ... (1 lines skipped) ...",
                "  1: [ RUN      ] A.T",
                "> 2: boom",
                "  3: [  FAILED  ] A.T",
                "",
                "Occurred in these tests: A.T (2 times; 1 exact, 1 similar), B.T (2 times exact)",
            ]
        );
    }

    #[test]
    fn test_gtest_failure_cluster_stays_single_test() {
        let mut item = cluster_item((1, 2));
        item.events[0].issue_type = IssueType::GtestFail;
        item.test_name = Some("A.T".into());
        let report = render(cluster_corpus(), &[item.clone(), item]);
        // Both render: dedup only applies to multi-test clusters.
        assert_eq!(report.reported, 2);
        assert!(report.text.starts_with("--- ERROR (4 times; 3 exact, 1 similar) ---"));
        assert!(!report.text.contains(OCCURRED_IN_PREFIX));
    }

    fn bracketed_corpus() -> Vec<String> {
        let mut lines = numbered(10);
        lines[0] = "[ RUN      ] T".into();
        lines[9] = "[  FAILED  ] T".into();
        lines
    }

    #[test]
    fn test_finished_test_is_bracketed() {
        let mut item = error_item((3, 6), &[4], &["line 4"]);
        item.test_name = Some("T".into());
        let report = render(bracketed_corpus(), &[item]);
        let got: Vec<&str> = report.text.lines().collect();
        assert_eq!(
            got,
            vec![
                "--- ERROR ---",
                "   1: [ RUN      ] T",
                "  ... (2 lines skipped) ...",
                "   4: line 3",
                ">  5: line 4",
                "   6: line 5",
                "  ... (3 lines skipped) ...",
                "  10: [  FAILED  ] T",
            ]
        );
    }

    #[test]
    fn test_context_is_clipped_to_test() {
        let mut lines = bracketed_corpus();
        lines.push("after".into());
        lines.push("more".into());
        let mut item = error_item((7, 12), &[8], &["line 8"]);
        item.test_name = Some("T".into());
        let report = render(lines, &[item]);
        assert!(!report.text.contains("after"));
        assert!(report.text.ends_with("  10: [  FAILED  ] T"));
    }

    #[test]
    fn test_unfinished_test_shows_run_line_only() {
        let mut lines = numbered(8);
        lines[0] = "[ RUN      ] T".into();
        let mut item = error_item((4, 6), &[5], &["x"]);
        item.test_name = Some("T".into());
        let report = render(lines, &[item]);
        let got: Vec<&str> = report.text.lines().collect();
        assert_eq!(got[0], "--- ERROR ---");
        assert_eq!(got[1], "  1: [ RUN      ] T");
        assert_eq!(got[2], "  ... (3 lines skipped) ...");
        assert_eq!(got.last().copied(), Some("> 6: line 5"));
    }

    #[test]
    fn test_unknown_test_is_named_in_header() {
        let mut item = error_item((1, 2), &[1], &["x"]);
        item.test_name = Some("Ghost.Test".into());
        let report = render(numbered(4), &[item]);
        assert!(report
            .text
            .starts_with("--- ERROR during test 'Ghost.Test' ---\n> 2: line 1"));
    }

    fn crash_corpus() -> Vec<String> {
        [
            "[ RUN      ] C.T",
            "starting",
            "Received signal 11 SEGV",
            "#0 0x1 base::debug::StackTrace()",
            "#1 0x2 app::Decode() d.cc:5",
            "#2 0x3 app::Main() m.cc:9",
            "Received signal 6 ABRT",
            "tail",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn incomplete_item() -> Issue {
        let mut first = event_in(0, IssueType::IncompleteTest, "C.T");
        first.data.crash_events = vec![Event::new(2, IssueType::Crash), Event::new(6, IssueType::Crash)];
        let mut item = Issue::new(IssueType::IncompleteTest, vec![first]);
        item.test_name = Some("C.T".into());
        item.context = Some(LineRange::new(1, 8));
        item.occurrences = vec![Occurrence::new(Some("C.T"), "[ RUN      ] C.T")];
        item
    }

    #[test]
    fn test_incomplete_test_with_crash_events() {
        let report = render(crash_corpus(), &[incomplete_item()]);
        let got: Vec<&str> = report.text.lines().collect();
        assert_eq!(got[0], "--- CRASH (occurred 2 times) ---");
        assert_eq!(got[1], "  1: [ RUN      ] C.T");
        assert!(got.contains(&"> 3: Received signal 11 SEGV"));
        assert!(got.contains(&"> 5: #1 0x2 app::Decode() d.cc:5"));
        assert!(got.contains(&"> 6: #2 0x3 app::Main() m.cc:9"));
        assert!(got.contains(&"> 7: Received signal 6 ABRT"));
        assert!(!got.iter().any(|l| l.starts_with("> 4:")));
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn test_prose_starting_with_at_is_not_a_frame() {
        let lines: Vec<String> = [
            "[ RUN      ] C.T",
            "Received signal 11 SEGV",
            "#0 0x2 app::Decode() d.cc:5",
            "ok",
            "at least one device was busy",
            "tail",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut first = event_in(0, IssueType::IncompleteTest, "C.T");
        first.data.crash_events = vec![Event::new(1, IssueType::Crash)];
        let mut item = Issue::new(IssueType::IncompleteTest, vec![first]);
        item.test_name = Some("C.T".into());
        item.context = Some(LineRange::new(1, 6));

        let corpus = LogCorpus::new(lines);
        assert_eq!(
            corpus.extract_and_filter_stack_traces(1, 6),
            vec![vec!["app::Decode() d.cc:5".to_string()]]
        );
        let boundaries = TestBoundaries::scan(corpus.lines());
        let report = ReportGenerator::new(&corpus, &boundaries).generate(&[item]);
        let got: Vec<&str> = report.text.lines().collect();
        assert!(got.contains(&"> 3: #0 0x2 app::Decode() d.cc:5"));
        assert!(got.contains(&"  5: at least one device was busy"));
        assert!(!got.contains(&"> 5: at least one device was busy"));
    }

    #[test]
    fn test_incomplete_test_without_crash() {
        let mut item = incomplete_item();
        item.events[0].data.crash_events.clear();
        let report = render(crash_corpus(), &[item]);
        assert!(report
            .text
            .starts_with("--- ERROR: Test 'C.T' did not complete ---\n"));
        assert!(!report.text.contains("> "));
    }

    fn crash_item(test: &str) -> Issue {
        let mut event = event_in(2, IssueType::Crash, test);
        event.data.signal = Some("SIGSEGV".into());
        let mut item = Issue::new(IssueType::Crash, vec![event]);
        item.context = Some(LineRange::new(2, 3));
        item
    }

    #[test]
    fn test_crash_header_names_test() {
        let report = render(crash_corpus(), &[crash_item("Other.T")]);
        assert_eq!(
            report.text,
            "--- CRASH DETECTED: SIGSEGV during test 'Other.T' ---\n> 3: Received signal 11 SEGV"
        );
    }

    #[test]
    fn test_crash_header_uses_event_test_name_only() {
        let mut item = crash_item("C.T");
        item.events[0].data.test_name = None;
        item.test_name = Some("C.T".into());
        let report = render(crash_corpus(), &[item]);
        assert!(report.text.starts_with("--- CRASH DETECTED: SIGSEGV ---\n"));
    }

    #[test]
    fn test_crash_shadowed_by_incomplete_test() {
        let report = render(crash_corpus(), &[crash_item("C.T"), incomplete_item()]);
        assert!(!report.text.contains("CRASH DETECTED"));
        assert!(report.text.starts_with("--- CRASH (occurred 2 times) ---"));
        assert_eq!(report.reported, 1);
        assert_eq!(report.errors, 2);
    }

    #[test]
    fn test_extra_context_in_same_test() {
        let mut item = error_item((3, 6), &[4], &["line 4"]);
        item.test_name = Some("T".into());
        item.extra_context_tests = Some(vec![
            Occurrence::new(Some("T"), "line 4"),
            Occurrence::new(Some("T"), "line 4"),
            Occurrence::new(None, "ignored"),
        ]);
        let report = render(bracketed_corpus(), &[item]);
        let got: Vec<&str> = report.text.lines().collect();
        let at = got
            .iter()
            .position(|l| l.starts_with(THIS_TEST_NOTE))
            .unwrap_or(0);
        assert_eq!(
            got[at],
            "Also occurred in combination with other failures in this test (2 times exact)."
        );
        assert_eq!(got[at - 1], "");
        // The status line still closes the block.
        assert_eq!(got.last().copied(), Some("  10: [  FAILED  ] T"));
    }

    #[test]
    fn test_extra_context_across_tests_keeps_bare_sentence() {
        let mut item = error_item((3, 6), &[4], &["line 4"]);
        item.test_name = Some("T".into());
        item.extra_context_tests = Some(vec![
            Occurrence::new(Some("T"), "line 4"),
            Occurrence::new(Some("U"), "line 4"),
        ]);
        let report = render(bracketed_corpus(), &[item]);
        assert!(report
            .text
            .contains("\nAlso occurred in combination with other failures in these tests: \n"));
    }

    #[test]
    fn test_items_sorted_by_position() {
        let late = error_item((7, 8), &[7], &["late"]);
        let mut early = error_item((0, 0), &[1], &["early"]);
        early.context = None;
        let report = render(numbered(10), &[late, early]);
        let first = report.text.find(">  2: line 1").unwrap_or(usize::MAX);
        let second = report.text.find(">  8: line 7").unwrap_or(0);
        assert!(first < second);
        assert_eq!(report.text.matches("--- ERROR ---").count(), 2);
    }

    #[test]
    fn test_generation_is_repeatable() {
        let mut item = error_item((3, 6), &[4], &["line 4"]);
        item.test_name = Some("T".into());
        let items = vec![item, cluster_item((1, 2))];
        let corpus = LogCorpus::new(bracketed_corpus());
        let boundaries = TestBoundaries::scan(corpus.lines());
        let generator = ReportGenerator::new(&corpus, &boundaries);
        assert_eq!(generator.generate(&items), generator.generate(&items));
    }

    #[test]
    fn test_out_of_range_input_does_not_panic() {
        let mut item = error_item((8, 50), &[40, 9], &[]);
        item.test_name = Some("T".into());
        let report = render(numbered(10), &[item, Issue::new(IssueType::Warning, vec![])]);
        assert!(report.text.contains("> 10: line 9"));
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
    }

    #[test]
    fn test_line_numbers_stay_in_corpus() {
        let report = render(
            bracketed_corpus(),
            &[error_item((0, 10), &[0, 9], &["a", "b"]), cluster_item((1, 2))],
        );
        for line in report.text.lines() {
            let trimmed = line.trim_start_matches(['>', ' ']);
            if let Some((num, _)) = trimmed.split_once(": ") {
                if let Ok(n) = num.parse::<usize>() {
                    assert!((1..=10).contains(&n), "line number {n} out of range");
                }
            }
        }
    }
}
