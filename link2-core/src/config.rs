//! Optional YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.link2/
//!   config.yaml   (optional — every field has a default)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// SIGINT. Delivered by the supervisor when a launched instance is stopped.
pub const DEFAULT_STOP_SIGNAL: i32 = 2;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Product directory under `share/` holding node specification files.
    pub product: String,
    /// Command whose stdout is the environment-manager JSON report.
    pub report_command: Vec<String>,
    pub tools: ToolPatterns,
    pub launch: LaunchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product: "link2".to_string(),
            report_command: vec!["conda".into(), "info".into(), "--json".into()],
            tools: ToolPatterns::default(),
            launch: LaunchConfig::default(),
        }
    }
}

/// Filename filters that classify a `bin/` entry as a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPatterns {
    pub allowed_prefixes: Vec<String>,
    pub disallowed_suffixes: Vec<String>,
    pub exceptions: Vec<String>,
}

impl Default for ToolPatterns {
    fn default() -> Self {
        Self {
            allowed_prefixes: vec!["link2-".into(), "ld-node-".into()],
            disallowed_suffixes: vec!["-test".into(), ".sig".into()],
            exceptions: vec!["link2-license-tool".into()],
        }
    }
}

/// How launch requests are assembled for the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Wrapper that activates `<prefix>` and execs the remaining arguments.
    pub wrapper: PathBuf,
    pub stop_signal: i32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            wrapper: PathBuf::from("run_in.sh"),
            stop_signal: DEFAULT_STOP_SIGNAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.link2/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".link2").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load `<home>/.link2/config.yaml`, falling back to defaults when absent.
pub fn load_at(home: &Path) -> Result<Config, CoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_file(&path)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, CoreError> {
    load_at(&home()?)
}

/// Load an explicit config file. Missing files are an error here.
pub fn load_file(path: &Path) -> Result<Config, CoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    // An empty file deserializes to `null`, which is not a mapping.
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| CoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
