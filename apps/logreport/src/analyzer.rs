//! Log corpus access and line emission used by the report generator.
//!
//! The generator only talks to the [`LogAnalyzer`] trait. [`LogCorpus`] is
//! the in-memory implementation: it renders numbered lines, marks the
//! highlighted ones, and folds long uninteresting stretches into
//! `... (N lines skipped) ...` markers.
//!
//! Rendered line layout:
//! - `"> "` or `"  "` marker (highlighted or not),
//! - 1-based line number right-aligned to the corpus width,
//! - `": "` and the stripped line text.

use crate::patterns::frame_text;
use std::collections::BTreeSet;

/// Width of the highlight marker column in front of line numbers.
pub const MARKER_WIDTH: usize = 2;

/// One extracted stack trace: the symbol/location text of each kept frame.
pub type StackTrace = Vec<String>;

/// Operations the report generator needs from the log owner.
pub trait LogAnalyzer {
    /// The full corpus, 0-indexed.
    fn lines(&self) -> &[String];

    /// Emit `[start, end)` with highlighting and skip markers.
    ///
    /// When `filtered_traces` is given, stack-frame lines that carry none of
    /// the kept frame texts are folded away like other uninteresting lines.
    fn add_log_lines_with_skipping(
        &self,
        out: &mut Vec<String>,
        start: usize,
        end: usize,
        highlights: &BTreeSet<usize>,
        filtered_traces: Option<&[StackTrace]>,
        max_line_num_width: usize,
    );

    /// Push one skip marker for `skipped` lines; nothing when zero.
    ///
    /// The marker starts at the line-number column, which sits right after
    /// the fixed-width highlight marker, so its indent does not depend on
    /// `max_line_num_width`.
    fn add_skipped_lines_message(
        &self,
        out: &mut Vec<String>,
        skipped: usize,
        max_line_num_width: usize,
    );

    /// Stack traces found in `[start, end)` with noise frames removed.
    fn extract_and_filter_stack_traces(&self, start: usize, end: usize) -> Vec<StackTrace>;
}

/// Render one corpus line (0-indexed `line_num`) in report layout.
pub fn format_log_line(line_num: usize, text: &str, highlighted: bool, width: usize) -> String {
    let marker = if highlighted { "> " } else { "  " };
    format!("{}{:>width$}: {}", marker, line_num + 1, text.trim(), width = width)
}

/// Skip marker aligned to the line-number column.
pub fn format_skipped_lines(skipped: usize) -> String {
    format!("{}... ({} lines skipped) ...", " ".repeat(MARKER_WIDTH), skipped)
}

/// Decimal width of the largest line number.
pub fn line_num_width(len: usize) -> usize {
    len.max(1).to_string().len()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Knobs for line emission and trace filtering.
pub struct EmitSettings {
    /// Lines kept on each side of a highlighted line.
    pub context_radius: usize,
    /// Shortest run of uninteresting lines folded into a marker.
    pub min_skip: usize,
    /// Lines kept at the top of a window without highlights.
    pub plain_head: usize,
    /// Lines kept at the bottom of a window without highlights.
    pub plain_tail: usize,
    /// Frames containing any of these substrings are dropped from traces.
    pub trace_noise: Vec<String>,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            context_radius: 2,
            min_skip: 2,
            plain_head: 20,
            plain_tail: 20,
            trace_noise: default_trace_noise(),
        }
    }
}

pub fn default_trace_noise() -> Vec<String> {
    [
        "base::debug::",
        "base::internal::",
        "__libc_start",
        "libc.so",
        "_start",
        "<unknown>",
        "???",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Default)]
/// An immutable log held in memory.
pub struct LogCorpus {
    lines: Vec<String>,
    settings: EmitSettings,
}

impl LogCorpus {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            settings: EmitSettings::default(),
        }
    }

    /// Split raw log text on `\n`; trailing whitespace, `\r` included, is
    /// preserved.
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        Self::new(lines)
    }

    pub fn with_settings(mut self, settings: EmitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EmitSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn is_noise(&self, frame: &str) -> bool {
        self.settings
            .trace_noise
            .iter()
            .any(|n| !n.is_empty() && frame.contains(n.as_str()))
    }

    /// Whether line `idx` of `[start, end)` survives folding.
    fn is_kept(
        &self,
        idx: usize,
        start: usize,
        end: usize,
        highlights: &BTreeSet<usize>,
        has_highlights: bool,
        filtered_traces: Option<&[StackTrace]>,
    ) -> bool {
        if highlights.contains(&idx) {
            return true;
        }
        if let Some(traces) = filtered_traces {
            if frame_text(&self.lines[idx]).is_some() {
                let line = self.lines[idx].as_str();
                let wanted = traces
                    .iter()
                    .flatten()
                    .any(|frame| line.contains(frame.as_str()));
                if !wanted {
                    return false;
                }
            }
        }
        if !has_highlights {
            return idx < start + self.settings.plain_head
                || idx + self.settings.plain_tail >= end;
        }
        let lo = idx.saturating_sub(self.settings.context_radius).max(start);
        let hi = (idx + self.settings.context_radius).min(end - 1);
        highlights.range(lo..=hi).next().is_some()
    }

    /// Print a short run of folded lines, or replace a long one with a marker.
    fn flush_pending(
        &self,
        out: &mut Vec<String>,
        pending: &mut Vec<usize>,
        min_skip: usize,
        width: usize,
    ) {
        if pending.len() >= min_skip {
            self.add_skipped_lines_message(out, pending.len(), width);
        } else {
            for &i in pending.iter() {
                out.push(format_log_line(i, &self.lines[i], false, width));
            }
        }
        pending.clear();
    }
}

impl LogAnalyzer for LogCorpus {
    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn add_log_lines_with_skipping(
        &self,
        out: &mut Vec<String>,
        start: usize,
        end: usize,
        highlights: &BTreeSet<usize>,
        filtered_traces: Option<&[StackTrace]>,
        max_line_num_width: usize,
    ) {
        let end = end.min(self.lines.len());
        if start >= end {
            return;
        }
        let has_highlights = highlights.range(start..end).next().is_some();
        let min_skip = self.settings.min_skip.max(1);
        let mut pending: Vec<usize> = Vec::new();

        for idx in start..end {
            if self.is_kept(idx, start, end, highlights, has_highlights, filtered_traces) {
                self.flush_pending(out, &mut pending, min_skip, max_line_num_width);
                out.push(format_log_line(
                    idx,
                    &self.lines[idx],
                    highlights.contains(&idx),
                    max_line_num_width,
                ));
            } else {
                pending.push(idx);
            }
        }
        self.flush_pending(out, &mut pending, min_skip, max_line_num_width);
    }

    fn add_skipped_lines_message(
        &self,
        out: &mut Vec<String>,
        skipped: usize,
        _max_line_num_width: usize,
    ) {
        if skipped > 0 {
            out.push(format_skipped_lines(skipped));
        }
    }

    fn extract_and_filter_stack_traces(&self, start: usize, end: usize) -> Vec<StackTrace> {
        let end = end.min(self.lines.len());
        let mut traces: Vec<StackTrace> = Vec::new();
        let mut current: StackTrace = Vec::new();
        let mut in_trace = false;
        for line in self.lines.get(start..end).unwrap_or_default() {
            match frame_text(line) {
                Some(frame) => {
                    in_trace = true;
                    if !self.is_noise(frame) {
                        current.push(frame.to_string());
                    }
                }
                None if in_trace => {
                    in_trace = false;
                    if !current.is_empty() {
                        traces.push(std::mem::take(&mut current));
                    }
                }
                None => {}
            }
        }
        if !current.is_empty() {
            traces.push(current);
        }
        traces
    }
}
