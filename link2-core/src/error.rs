//! Error types for link2-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration loading and report reading.
///
/// Discovery itself never returns these to callers: a failing report or a
/// malformed spec file is logged and skipped. They exist for the places where
/// the caller asked for a specific file and deserves to know why it failed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on config load, with the offending path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON parse error on an environment report.
    #[error("failed to parse environment report from {origin}: {source}")]
    Report {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The environment-manager command could not be run or exited non-zero.
    #[error("environment report command `{command}` failed: {message}")]
    ReportCommand { command: String, message: String },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.link2/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
