//! Tool discovery by filename pattern in `<prefix>/bin`.

use std::fs;
use std::io::ErrorKind;

use crate::config::ToolPatterns;
use crate::nodes::absolute;
use crate::types::{Entry, EntryKind, Environment};

impl ToolPatterns {
    /// Whether `filename` names a tool.
    ///
    /// Must start with an allowed prefix; exceptions and disallowed suffixes
    /// then remove it. Case-sensitive, filename only.
    pub fn matches(&self, filename: &str) -> bool {
        self.allowed_prefixes.iter().any(|p| filename.starts_with(p.as_str()))
            && !self.exceptions.iter().any(|e| filename == e)
            && !self
                .disallowed_suffixes
                .iter()
                .any(|s| filename.ends_with(s.as_str()))
    }
}

/// Scan the direct entries of `<prefix>/bin`, sorted by filename.
pub fn scan(env: &Environment, patterns: &ToolPatterns) -> Vec<Entry> {
    let bin_dir = env.bin_dir();
    let entries = match fs::read_dir(&bin_dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(dir = %bin_dir.display(), error = %err, "cannot list bin directory");
            }
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|name| patterns.matches(name))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| Entry {
            kind: EntryKind::Tool,
            prefix: env.prefix.clone(),
            environment: env.key.clone(),
            executable: absolute(&bin_dir.join(&name)),
            name,
        })
        .collect()
}
