//! Configuration discovery and effective settings resolution.
//!
//! logreport reads `logreport.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `output`: `human`
//! - `emit.context_radius`: 2
//! - `emit.min_skip`: 2
//! - `emit.plain_head|plain_tail`: 20
//! - `traces.noise`: common libc/base::debug frames
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::analyzer::EmitSettings;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["logreport.toml", "logreport.yaml", "logreport.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Line emission section under `[emit]`.
pub struct EmitCfg {
    pub context_radius: Option<usize>,
    pub min_skip: Option<usize>,
    pub plain_head: Option<usize>,
    pub plain_tail: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Stack trace filtering under `[traces]`.
pub struct TracesCfg {
    /// Replaces the built-in noise list when set.
    pub noise: Option<Vec<String>>,
    /// Appended to the effective noise list.
    #[serde(default)]
    pub extra_noise: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `logreport.toml|yaml`.
pub struct LogreportConfig {
    pub output: Option<String>,
    pub emit: Option<EmitCfg>,
    pub traces: Option<TracesCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: String,
    pub emit: EmitSettings,
}

#[derive(Debug, Default, Clone, Copy)]
/// Values passed on the command line; `None` defers to config/defaults.
pub struct CliOverrides<'a> {
    pub repo_root: Option<&'a str>,
    pub output: Option<&'a str>,
    pub context_radius: Option<usize>,
    pub min_skip: Option<usize>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `logreport.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|name| cur.join(name).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `LogreportConfig` from the first config file present under `root`.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, LogreportConfig)>> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<LogreportConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<LogreportConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(Error::Config { path, message }),
        };
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: CliOverrides<'_>) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config_path, cfg) = match load_config(&repo_root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, LogreportConfig::default()),
    };

    let output = cli
        .output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let defaults = EmitSettings::default();
    let emit_cfg = cfg.emit.unwrap_or_default();
    let traces_cfg = cfg.traces.unwrap_or_default();
    let mut trace_noise = traces_cfg.noise.unwrap_or(defaults.trace_noise);
    trace_noise.extend(traces_cfg.extra_noise);

    let emit = EmitSettings {
        context_radius: cli
            .context_radius
            .or(emit_cfg.context_radius)
            .unwrap_or(defaults.context_radius),
        min_skip: cli
            .min_skip
            .or(emit_cfg.min_skip)
            .unwrap_or(defaults.min_skip),
        plain_head: emit_cfg.plain_head.unwrap_or(defaults.plain_head),
        plain_tail: emit_cfg.plain_tail.unwrap_or(defaults.plain_tail),
        trace_noise,
    };

    Ok(Effective {
        repo_root,
        config_path,
        output,
        emit,
    })
}
