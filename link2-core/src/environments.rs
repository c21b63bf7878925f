//! Environment enumeration from an environment-manager report.
//!
//! The report is the JSON printed by `conda info --json` (or anything with the
//! same three fields). Every candidate prefix is classified as the root
//! environment, a named environment living directly inside one of the
//! permitted environments directories, or discarded.
//!
//! Failure to obtain or parse the report is soft: [`enumerate`] logs a warning
//! and yields no environments.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};
use crate::types::{EnvKey, Environment};

/// The subset of the environment-manager report that discovery consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReport {
    /// Every known environment prefix.
    pub envs: Vec<PathBuf>,
    /// Directories under which named environments are allowed to live.
    pub envs_dirs: Vec<PathBuf>,
    pub root_prefix: PathBuf,
}

/// Where the report comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Run a command and parse its stdout.
    Command(Vec<String>),
    /// Read a previously captured report from disk.
    File(PathBuf),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Obtain the report and classify its prefixes. Never fails; see module docs.
pub fn enumerate(source: &ReportSource) -> Vec<Environment> {
    match read_report(source) {
        Ok(report) => classify(&report),
        Err(err) => {
            tracing::warn!(error = %err, "environment report unavailable; no environments indexed");
            Vec::new()
        }
    }
}

/// Obtain and parse the report, surfacing the failure reason.
pub fn read_report(source: &ReportSource) -> Result<EnvironmentReport, CoreError> {
    match source {
        ReportSource::Command(argv) => {
            let stdout = run_report_command(argv)?;
            parse_report(&stdout, &argv.join(" "))
        }
        ReportSource::File(path) => {
            let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
            parse_report(&contents, &path.display().to_string())
        }
    }
}

/// Parse report JSON. `origin` only labels the error.
pub fn parse_report(json: &str, origin: &str) -> Result<EnvironmentReport, CoreError> {
    serde_json::from_str(json).map_err(|source| CoreError::Report {
        origin: origin.to_string(),
        source,
    })
}

/// Classify every prefix in `report.envs`, preserving report order.
///
/// A key seen twice (two environments directories holding the same basename)
/// keeps its first prefix so that `(kind, environment, name)` stays unique.
pub fn classify(report: &EnvironmentReport) -> Vec<Environment> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for prefix in &report.envs {
        let Some(key) = classify_prefix(prefix, report) else {
            tracing::debug!(prefix = %prefix.display(), "skipping prefix outside known envs dirs");
            continue;
        };
        if !seen.insert(key.clone()) {
            tracing::warn!(
                env = %key,
                prefix = %prefix.display(),
                "duplicate environment key; keeping first prefix",
            );
            continue;
        }
        result.push(Environment {
            key,
            prefix: prefix.clone(),
        });
    }
    result
}

/// Key for one prefix, or `None` when it is not a standard environment location.
pub fn classify_prefix(prefix: &Path, report: &EnvironmentReport) -> Option<EnvKey> {
    if prefix == report.root_prefix {
        return Some(EnvKey::base());
    }

    let parent = prefix.parent()?;
    if report.envs_dirs.iter().any(|dir| path_equal(dir, parent)) {
        let name = prefix.file_name()?.to_string_lossy().into_owned();
        return Some(EnvKey::from(name));
    }
    None
}

/// Compare two paths by their lexically normalized absolute forms.
///
/// Case is folded on Windows, whose filesystems are case-insensitive.
pub fn path_equal(a: &Path, b: &Path) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if cfg!(windows) {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn run_report_command(argv: &[String]) -> Result<String, CoreError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(CoreError::ReportCommand {
            command: String::new(),
            message: "empty command".to_string(),
        });
    };

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| CoreError::ReportCommand {
            command: argv.join(" "),
            message: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(CoreError::ReportCommand {
            command: argv.join(" "),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Absolute form with `.` and `..` resolved lexically (no symlink resolution).
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
