//! Issue bundle loading and batch report runs.
//!
//! A bundle is a JSON file naming the log it was classified from, the issues
//! found in it, and optionally the per-test boundaries:
//!
//! ```json
//! { "log": "unit_tests.log", "issues": [...], "test_boundaries": {"A.B": [0, 12]} }
//! ```
//!
//! The log path is resolved against the bundle's directory. Boundaries that
//! are not supplied are scanned from the log.

use crate::analyzer::{EmitSettings, LogAnalyzer, LogCorpus};
use crate::boundaries::TestBoundaries;
use crate::error::{Error, Result};
use crate::models::{BatchResult, BundleReport, Issue, Summary};
use crate::report::ReportGenerator;
use glob::glob;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
/// On-disk bundle shape.
pub struct BundleFile {
    pub log: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub test_boundaries: Option<TestBoundaries>,
}

/// A bundle with its log read into memory and boundaries resolved.
pub struct LoadedBundle {
    pub path: PathBuf,
    pub log_path: PathBuf,
    pub corpus: LogCorpus,
    pub issues: Vec<Issue>,
    pub boundaries: TestBoundaries,
}

impl LoadedBundle {
    pub fn generate(&self) -> crate::models::Report {
        ReportGenerator::new(&self.corpus, &self.boundaries).generate(&self.issues)
    }
}

/// Read a bundle file and the log it points to.
pub fn load_bundle(path: &Path, settings: &EmitSettings) -> Result<LoadedBundle> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let file: BundleFile = serde_json::from_str(&raw).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let log_path = base.join(&file.log);
    let text = fs::read_to_string(&log_path).map_err(|e| Error::io(&log_path, e))?;
    let corpus = LogCorpus::from_text(&text).with_settings(settings.clone());

    let scanned = TestBoundaries::scan(corpus.lines());
    let boundaries = match file.test_boundaries.as_ref() {
        Some(given) => scanned.overlay(given),
        None => scanned,
    };
    log::debug!(
        "loaded {} issues and {} tests from {}",
        file.issues.len(),
        boundaries.len(),
        path.display()
    );

    Ok(LoadedBundle {
        path: path.to_path_buf(),
        log_path,
        corpus,
        issues: file.issues,
        boundaries,
    })
}

/// Expand glob patterns (plain paths pass through) into sorted bundle paths.
pub fn expand_patterns(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut targets: Vec<PathBuf> = Vec::new();
    for pat in patterns {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = glob(&pattern).map_err(|source| Error::Pattern {
            pattern: pat.clone(),
            source,
        })?;
        let before = targets.len();
        for entry in entries {
            match entry {
                Ok(p) if p.is_file() => targets.push(p),
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable path: {e}"),
            }
        }
        if targets.len() == before {
            return Err(Error::NoMatch(pat.clone()));
        }
    }
    targets.sort();
    targets.dedup();
    Ok(targets)
}

type Outcome = std::result::Result<BundleReport, (String, String)>;

/// Render every bundle matched by `patterns`.
///
/// Bundles are processed in parallel; results keep path order. A bundle
/// that fails to load is recorded in `failures` and does not stop the run.
pub fn run_batch(root: &Path, patterns: &[String], settings: &EmitSettings) -> Result<BatchResult> {
    let targets = expand_patterns(root, patterns)?;
    log::info!("rendering {} bundle(s)", targets.len());

    let outcomes: Vec<Outcome> = targets
        .par_iter()
        .map(|path| -> Outcome {
            let bundle = load_bundle(path, settings)
                .map_err(|e| (display_path(root, path), e.to_string()))?;
            Ok(BundleReport {
                bundle: display_path(root, &bundle.path),
                log: display_path(root, &bundle.log_path),
                report: bundle.generate(),
            })
        })
        .collect();

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(r) => reports.push(r),
            Err(f) => {
                log::warn!("{}: {}", f.0, f.1);
                failures.push(f);
            }
        }
    }
    let summary = Summary {
        errors: reports.iter().map(|r| r.report.errors).sum(),
        warnings: reports.iter().map(|r| r.report.warnings).sum(),
        bundles: reports.len(),
        failed: failures.len(),
    };
    Ok(BatchResult {
        reports,
        failures,
        summary,
    })
}

/// Path relative to `root` when possible, for stable output.
pub fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .filter(|p| !p.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
