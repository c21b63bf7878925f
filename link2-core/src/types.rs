//! Domain types for the link2 registry.
//!
//! All path fields use `PathBuf`; never `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Key of the root environment of an installation.
pub const BASE_ENV: &str = "base";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Logical key of an environment: `"base"` or the basename of a named prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvKey(pub String);

impl EnvKey {
    pub fn base() -> Self {
        Self(BASE_ENV.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How an entry was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Declared by a specification file under `share/<product>/static_assets`.
    Node,
    /// Matched by filename pattern in `bin/`.
    Tool,
}

impl EntryKind {
    pub fn from_is_node(is_node: bool) -> Self {
        if is_node {
            EntryKind::Node
        } else {
            EntryKind::Tool
        }
    }

    pub fn is_node(self) -> bool {
        matches!(self, EntryKind::Node)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Node => write!(f, "node"),
            EntryKind::Tool => write!(f, "tool"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A classified environment: its logical key and filesystem prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub key: EnvKey,
    pub prefix: PathBuf,
}

impl Environment {
    pub fn new(key: impl Into<EnvKey>, prefix: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
        }
    }

    /// `<prefix>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// `<prefix>/share/<product>/static_assets`
    pub fn spec_dir(&self, product: &str) -> PathBuf {
        self.prefix.join("share").join(product).join("static_assets")
    }
}

/// One indexed node or tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    /// Root of the owning environment.
    pub prefix: PathBuf,
    pub environment: EnvKey,
    /// Node: last `/` segment of the declared `$id`. Tool: the filename.
    pub name: String,
    /// Existed on disk when the registry was built; not re-checked later.
    pub executable: PathBuf,
}

impl Entry {
    pub fn is_node(&self) -> bool {
        self.kind.is_node()
    }

    /// Structural match used by registry lookup.
    pub fn matches(&self, kind: EntryKind, name: &str, environment: &str) -> bool {
        self.kind == kind && self.name == name && self.environment.as_str() == environment
    }
}
