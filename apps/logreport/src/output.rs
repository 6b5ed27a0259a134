//! Output rendering for report and boundaries commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-bundle reports and a top-level summary.

use crate::boundaries::TestBoundaries;
use crate::models::BatchResult;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors("human") {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors("human") {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// Colorize one report line by its role.
fn paint_line(line: &str) -> String {
    if line.starts_with("--- CRASH") || line.starts_with("--- ERROR") {
        line.red().bold().to_string()
    } else if line.starts_with("--- WARNING") {
        line.yellow().bold().to_string()
    } else if line.starts_with("--- ISSUE") {
        line.magenta().bold().to_string()
    } else if line.starts_with("> ") {
        line.bold().to_string()
    } else if line.trim_start().starts_with("... (") {
        line.bright_black().to_string()
    } else {
        line.to_string()
    }
}

/// Print batch results in the requested format.
pub fn print_batch(res: &BatchResult, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_batch_json(res)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for r in &res.reports {
                let title = format!("═══ {} ({}) ═══", r.bundle, r.log);
                if color {
                    println!("{}", title.cyan().bold());
                } else {
                    println!("{}", title);
                }
                if r.report.text.is_empty() {
                    println!("no issues");
                }
                for line in r.report.text.lines() {
                    if color {
                        println!("{}", paint_line(line));
                    } else {
                        println!("{}", line);
                    }
                }
                println!();
            }
            for (path, message) in &res.failures {
                eprintln!("{} {}: {}", error_prefix(), path, message);
            }
            let summary = format!(
                "— Summary — errors={} warnings={} bundles={} failed={}",
                res.summary.errors, res.summary.warnings, res.summary.bundles, res.summary.failed
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print scanned test boundaries, 1-based and inclusive for humans.
pub fn print_boundaries(boundaries: &TestBoundaries, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_boundaries_json(boundaries)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for (name, range) in boundaries.iter() {
                let span = format!("{}-{}", range.start + 1, range.end);
                if color {
                    println!("{} {}", span.bright_black(), name.bold());
                } else {
                    println!("{} {}", span, name);
                }
            }
        }
    }
}

/// Compose batch JSON object (pure) for testing/snapshot purposes.
pub fn compose_batch_json(res: &BatchResult) -> JsonVal {
    let items: Vec<_> = res
        .reports
        .iter()
        .map(|r| {
            json!({
                "bundle": r.bundle,
                "log": r.log,
                "errors": r.report.errors,
                "warnings": r.report.warnings,
                "reported": r.report.reported,
                "skipped": r.report.skipped,
                "report": r.report.text,
            })
        })
        .collect();
    let failures: Vec<_> = res
        .failures
        .iter()
        .map(|(path, message)| json!({"bundle": path, "error": message}))
        .collect();
    json!({"results": items, "failures": failures, "summary": res.summary})
}

/// Compose boundaries JSON object (pure); ranges stay 0-based half-open.
pub fn compose_boundaries_json(boundaries: &TestBoundaries) -> JsonVal {
    let tests: Vec<_> = boundaries
        .iter()
        .map(|(name, range)| json!({"test": name, "start": range.start, "end": range.end}))
        .collect();
    json!({"tests": tests, "total": boundaries.len()})
}
