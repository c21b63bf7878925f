//! link2 core library: discovery of nodes and tools across environments.
//!
//! - [`environments`] — environment-manager report → `(key, prefix)` pairs
//! - [`nodes`] — nodes declared by spec files under `share/<product>/static_assets`
//! - [`tools`] — tools matched by filename in `bin/`
//! - [`registry`] — the merged, immutable [`Registry`]
//! - [`config`] — optional `~/.link2/config.yaml`

pub mod config;
pub mod environments;
pub mod error;
pub mod nodes;
pub mod registry;
pub mod tools;
pub mod types;

pub use config::{Config, LaunchConfig, ToolPatterns};
pub use environments::{EnvironmentReport, ReportSource};
pub use error::CoreError;
pub use registry::{NameIndex, Registry};
pub use types::{EnvKey, Entry, EntryKind, Environment};
