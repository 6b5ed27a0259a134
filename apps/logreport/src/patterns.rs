//! Line matchers for gtest status lines and stack frames.
//!
//! The status matchers are used to decide whether a test ran to completion;
//! the frame matcher drives stack-trace extraction in the analyzer.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(src: &str) -> Regex {
    Regex::new(src).expect("built-in pattern")
}

/// `[ RUN      ] Suite.Test`
pub static GTEST_RUN_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"\[\s*RUN\s*\]\s+(?P<name>[^\s(]+)"));

/// `[       OK ] Suite.Test (12 ms)`
pub static GTEST_OK_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"\[\s*OK\s*\]\s+(?P<name>[^\s(]+)"));

/// `[  FAILED  ] Suite.Test (12 ms)`
pub static GTEST_FAILED_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"\[\s*FAILED\s*\]\s+(?P<name>[^\s(]+)"));

/// `[  SKIPPED ] Suite.Test (0 ms)`
pub static GTEST_SKIPPED_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"\[\s*SKIPPED\s*\]\s+(?P<name>[^\s(]+)"));

/// Symbolized frames: `#3 0x55d1c2 in Foo::Bar() foo.cc:12` or
/// `    at Foo.bar (foo.js:1:2)`.
///
/// `at` frames must end in a `file:line[:col]` location, optionally in
/// parentheses, so prose such as `at least one ...` is not a frame.
pub static STACK_FRAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"^\s*(?:#\d+\s+(?:0x[0-9a-fA-F]+\s+)?(?:in\s+)?(?P<frame>\S.*?)",
        r"|at\s+(?P<located>\S.*?(?:\([^()]*:\d+(?::\d+)?\)|:\d+(?::\d+)?)))\s*$",
    ))
});

/// True when `line` is a gtest OK, FAILED, or SKIPPED status line.
pub fn is_terminating_status(line: &str) -> bool {
    GTEST_OK_PATTERN.is_match(line)
        || GTEST_FAILED_PATTERN.is_match(line)
        || GTEST_SKIPPED_PATTERN.is_match(line)
}

/// Test name closed by a terminating status line, if any.
pub fn terminated_test(line: &str) -> Option<&str> {
    [&*GTEST_OK_PATTERN, &*GTEST_FAILED_PATTERN, &*GTEST_SKIPPED_PATTERN]
        .iter()
        .find_map(|re| re.captures(line))
        .and_then(|c| c.name("name"))
        .map(|m| m.as_str())
}

/// Test name opened by a `[ RUN ]` line, if any.
pub fn started_test(line: &str) -> Option<&str> {
    GTEST_RUN_PATTERN
        .captures(line)
        .and_then(|c| c.name("name"))
        .map(|m| m.as_str())
}

/// Symbol/location text of a stack frame line.
pub fn frame_text(line: &str) -> Option<&str> {
    STACK_FRAME_PATTERN
        .captures(line)
        .and_then(|c| c.name("frame").or_else(|| c.name("located")))
        .map(|m| m.as_str())
}
