//! logreport core library.
//!
//! This crate turns classified log issues (errors, crashes, warnings, test
//! failures) into a bounded, human-readable diagnostic report.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Issue data model and report/batch output structs.
//! - `analyzer`: Log line emission with skipping and stack trace filtering.
//! - `boundaries`: Per-test line ranges scanned from gtest markers.
//! - `occurrence`: Occurrence counting and the detail line for headers.
//! - `report`: `ReportGenerator`, the per-item report assembly.
//! - `bundle`: Issue bundle loading and parallel batch runs.
//! - `output`: Human/JSON printers for report and boundaries.
//! - `patterns`: Compiled gtest and stack frame patterns.
//! - `error`: Crate error type.
pub mod analyzer;
pub mod boundaries;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod occurrence;
pub mod output;
pub mod patterns;
pub mod report;

pub use analyzer::{EmitSettings, LogAnalyzer, LogCorpus};
pub use boundaries::TestBoundaries;
pub use error::{Error, Result};
pub use models::{Issue, IssueType, Report};
pub use report::ReportGenerator;
