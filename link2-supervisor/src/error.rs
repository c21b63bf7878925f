use std::path::PathBuf;

use link2_core::EntryKind;
use thiserror::Error;

/// Failure talking to the external supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("supervisor is not running (socket missing: {socket})")]
    NotRunning { socket: PathBuf },

    #[error("supervisor protocol error: {0}")]
    Protocol(String),

    /// The supervisor answered but refused the request.
    #[error("supervisor rejected request: {0}")]
    Rejected(String),
}

/// Structural problems with a request, found before any lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("invalid number of arguments: a subcommand is required")]
    MissingSubcommand,

    #[error("unknown command {0}")]
    UnknownSubcommand(String),

    #[error("the {subcommand} command takes {expected} arguments (usage: {usage}), got {got}")]
    WrongArity {
        subcommand: &'static str,
        expected: usize,
        got: usize,
        usage: &'static str,
    },
}

/// A well-formed request named something the registry does not hold.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{env} is not a valid environment")]
    UnknownEnvironment { env: String },

    #[error("{name} is not a valid {kind} in env {env}")]
    NotFound {
        kind: EntryKind,
        name: String,
        env: String,
    },
}

/// Everything a subcommand can fail with, surfaced verbatim to its caller.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SupervisorError {
    SupervisorError::Io {
        path: path.into(),
        source,
    }
}
