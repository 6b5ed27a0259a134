//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "logreport",
    version,
    about = "Diagnostic reports for classified build and test logs",
    long_about = "logreport — render bounded, human-readable diagnostic reports from classified log issues.\n\nConfiguration precedence: CLI > logreport.toml > defaults.",
    after_help = "Examples:\n  logreport report out/unit_tests.issues.json\n  logreport report 'out/**/*.issues.json' --output json\n  logreport boundaries out/unit_tests.log",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Debug logging on stderr")]
    pub verbose: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Only log errors")]
    pub quiet: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current logreport version.")]
    Version,
    /// Render reports for issue bundles
    #[command(
        about = "Render diagnostic reports",
        long_about = "Render one report per issue bundle. Bundles are JSON files naming a log, its classified issues, and optional test boundaries.",
        after_help = "Examples:\n  logreport report run.issues.json\n  logreport report 'out/*.json' --check"
    )]
    Report {
        #[arg(required = true, help = "Bundle paths or glob patterns, relative to the repo root")]
        patterns: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Lines kept around each highlighted line")]
        context_radius: Option<usize>,
        #[arg(long, help = "Shortest run of lines folded into a skip marker")]
        min_skip: Option<usize>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any report counted errors")]
        check: bool,
    },
    /// Print test boundaries found in a log
    #[command(
        about = "Show test boundaries",
        long_about = "Scan a gtest log for RUN/OK/FAILED/SKIPPED markers and print each test's line range."
    )]
    Boundaries {
        #[arg(help = "Path to the log file")]
        log: String,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
