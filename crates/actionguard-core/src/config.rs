//! Scan configuration loaded from `.actionguard.yml`.
//!
//! The core engine always returns the full finding set; everything here is
//! applied by the caller after the rules have run.
//!
//! ```yaml
//! # Minimum severity to report (critical, high, medium, low)
//! severity: high
//!
//! # Rules to ignore (by rule id)
//! ignore_rules:
//!   - unpinned-action
//!   - manual-trigger
//!
//! # Workflow files to exclude (glob patterns)
//! exclude:
//!   - "**/test-*.yml"
//!   - ".github/workflows/legacy.yml"
//! ```

use crate::rules::{Finding, Severity};
use anyhow::{Context, Result};
use glob::Pattern;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILENAME: &str = ".actionguard.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Minimum severity a finding needs to be reported.
    pub severity: Severity,
    /// Rule ids whose findings are dropped entirely.
    pub ignore_rules: Vec<String>,
    /// Glob patterns for workflow files to skip during discovery.
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            severity: Severity::Low,
            ignore_rules: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no file is found.
    ///
    /// Search order: an explicit path, then `.actionguard.yml` next to the
    /// scan path (walking up through its parents), then the current
    /// directory.
    pub fn load(config_path: Option<&Path>, scan_path: Option<&Path>) -> Result<Config> {
        let Some(path) = find_config_file(config_path, scan_path) else {
            debug!("no config file found, using defaults");
            return Ok(Config::default());
        };

        debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Drop findings below the severity threshold or from ignored rules.
    pub fn filter(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|f| f.severity >= self.severity)
            .filter(|f| !self.ignore_rules.iter().any(|r| *r == f.rule_id))
            .collect()
    }

    /// Whether a workflow file matches one of the exclude globs.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            match Pattern::new(pattern) {
                Ok(p) => {
                    p.matches_path(path)
                        || path
                            .file_name()
                            .map(|n| p.matches(&n.to_string_lossy()))
                            .unwrap_or(false)
                }
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "skipping invalid exclude pattern");
                    false
                }
            }
        })
    }
}

fn find_config_file(config_path: Option<&Path>, scan_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "config file not found");
        return None;
    }

    if let Some(scan) = scan_path {
        let mut dir = if scan.is_file() {
            scan.parent().map(Path::to_path_buf)
        } else {
            Some(scan.to_path_buf())
        };
        while let Some(d) = dir {
            let candidate = d.join(DEFAULT_CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = d.parent().map(Path::to_path_buf);
        }
    }

    let cwd_candidate = PathBuf::from(DEFAULT_CONFIG_FILENAME);
    if cwd_candidate.is_file() {
        return Some(cwd_candidate);
    }

    None
}
