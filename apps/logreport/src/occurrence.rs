//! Occurrence accounting: how often a line recurred, split into exact
//! repeats of a reference line and merely similar ones.

use crate::models::Occurrence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceCounts {
    pub total: usize,
    pub exact: usize,
    pub similar: usize,
}

impl OccurrenceCounts {
    /// Count `occurrences` against `primary_line`.
    pub fn against<'a, I>(occurrences: I, primary_line: &str) -> Self
    where
        I: IntoIterator<Item = &'a Occurrence>,
    {
        let mut total = 0;
        let mut exact = 0;
        for o in occurrences {
            total += 1;
            if o.line_content == primary_line {
                exact += 1;
            }
        }
        Self {
            total,
            exact,
            similar: total - exact,
        }
    }

    pub fn detail(&self, is_main_header: bool) -> String {
        format_occurrence_detail(self.total, self.exact, self.similar, is_main_header)
    }
}

/// Parenthetical suffix such as `" (3 times; 1 exact, 2 similar)"`.
///
/// Empty for a single occurrence. In the main header the first occurrence is
/// the reference line itself, so a lone exact match is not reported.
pub fn format_occurrence_detail(
    total: usize,
    exact: usize,
    similar: usize,
    is_main_header: bool,
) -> String {
    if total <= 1 {
        String::new()
    } else if is_main_header && exact == 1 && similar > 0 {
        format!(" ({} times; {} similar)", total, similar)
    } else if similar == 0 {
        format!(" ({} times exact)", total)
    } else if exact == 0 {
        format!(" ({} times similar)", total)
    } else {
        format!(" ({} times; {} exact, {} similar)", total, exact, similar)
    }
}
