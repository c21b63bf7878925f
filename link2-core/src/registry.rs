//! The merged, immutable node/tool registry.
//!
//! # Build
//!
//! ```text
//! for (key, prefix) in environments:        (enumeration order)
//!     nodes  <- nodes::scan(prefix)         (all kept)
//!     tools  <- tools::scan(prefix)         (kept unless a node of this
//!                                            environment has the same executable)
//! ```
//!
//! The registry is built once and never mutated; it exposes no mutators and
//! can be shared across threads without locking. Entries are not refreshed if
//! the environments change afterwards.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::environments::{self, ReportSource};
use crate::types::{EnvKey, Entry, EntryKind, Environment};
use crate::{nodes, tools};

/// Name → environments containing an entry of that name, in enumeration order.
pub type NameIndex = BTreeMap<String, Vec<EnvKey>>;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    environments: Vec<Environment>,
    entries: Vec<Entry>,
}

impl Registry {
    /// Scan every environment and merge the results.
    pub fn build(environments: Vec<Environment>, config: &Config) -> Self {
        let mut entries = Vec::new();

        for env in &environments {
            let node_entries = nodes::scan(env, &config.product);
            let tool_entries = tools::scan(env, &config.tools);

            let (kept, shadowed): (Vec<_>, Vec<_>) = tool_entries.into_iter().partition(|tool| {
                !node_entries
                    .iter()
                    .any(|node| node.executable == tool.executable)
            });
            for tool in &shadowed {
                tracing::debug!(env = %env.key, tool = %tool.name, "tool shadowed by node with same executable");
            }

            tracing::debug!(
                env = %env.key,
                prefix = %env.prefix.display(),
                nodes = node_entries.len(),
                tools = kept.len(),
                "indexed environment",
            );
            entries.extend(node_entries);
            entries.extend(kept);
        }

        tracing::info!(
            environments = environments.len(),
            entries = entries.len(),
            "registry built"
        );
        Self {
            environments,
            entries,
        }
    }

    /// Enumerate environments from the configured report command, then build.
    pub fn discover(config: &Config) -> Self {
        Self::discover_from(&ReportSource::Command(config.report_command.clone()), config)
    }

    /// Enumerate environments from `source`, then build.
    pub fn discover_from(source: &ReportSource, config: &Config) -> Self {
        Self::build(environments::enumerate(source), config)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Group entries of one kind by name.
    pub fn list_by_name(&self, is_node: bool) -> NameIndex {
        let kind = EntryKind::from_is_node(is_node);
        let mut index = NameIndex::new();
        for entry in self.entries.iter().filter(|e| e.kind == kind) {
            index
                .entry(entry.name.clone())
                .or_default()
                .push(entry.environment.clone());
        }
        index
    }

    /// First entry matching `(is_node, name, environment)`. Absence is normal.
    pub fn find(&self, is_node: bool, name: &str, environment: &str) -> Option<&Entry> {
        let kind = EntryKind::from_is_node(is_node);
        self.entries
            .iter()
            .find(|e| e.matches(kind, name, environment))
    }

    pub fn has_environment(&self, key: &str) -> bool {
        self.environments.iter().any(|e| e.key.as_str() == key)
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
