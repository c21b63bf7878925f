//! Node discovery from specification files.
//!
//! Every `*.json` below `<prefix>/share/<product>/static_assets` may declare a
//! node through its `$id` field. The last `/` segment of the identifier is the
//! node name, and the node is indexed only when `<prefix>/bin/<name>` exists.
//!
//! A spec file that cannot be read, parsed, or resolved is skipped on its own;
//! it never aborts the scan of its siblings.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::types::{Entry, EntryKind, Environment};

/// Field holding the node identifier inside a spec file.
pub const ID_FIELD: &str = "$id";

/// Why a single spec file did not produce a node.
#[derive(Debug)]
enum Skip {
    Read(std::io::Error),
    Parse(serde_json::Error),
    MissingId,
    EmptyName,
    NoExecutable(PathBuf),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::Read(err) => write!(f, "unreadable: {err}"),
            Skip::Parse(err) => write!(f, "invalid JSON: {err}"),
            Skip::MissingId => write!(f, "no string `{ID_FIELD}` field"),
            Skip::EmptyName => write!(f, "`{ID_FIELD}` ends with '/'"),
            Skip::NoExecutable(path) => write!(f, "no executable at {}", path.display()),
        }
    }
}

/// Scan one environment for declared nodes.
///
/// Files are visited in sorted path order; when two files declare the same
/// node name, the first one wins.
pub fn scan(env: &Environment, product: &str) -> Vec<Entry> {
    let spec_dir = env.spec_dir(product);
    let bin_dir = env.bin_dir();

    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    for spec in collect_spec_files(&spec_dir) {
        match resolve(&spec, &bin_dir) {
            Ok((name, executable)) => {
                if !seen.insert(name.clone()) {
                    tracing::debug!(
                        env = %env.key,
                        node = %name,
                        spec = %spec.display(),
                        "node already declared by an earlier spec file",
                    );
                    continue;
                }
                nodes.push(Entry {
                    kind: EntryKind::Node,
                    prefix: env.prefix.clone(),
                    environment: env.key.clone(),
                    name,
                    executable,
                });
            }
            Err(skip) => {
                tracing::debug!(env = %env.key, spec = %spec.display(), reason = %skip, "skipping spec file");
            }
        }
    }
    nodes
}

/// Node name declared by a spec document: last `/` segment of `$id`.
pub fn node_name(spec: &Value) -> Option<&str> {
    let id = spec.get(ID_FIELD)?.as_str()?;
    id.rsplit('/').next()
}

fn resolve(spec: &Path, bin_dir: &Path) -> Result<(String, PathBuf), Skip> {
    let contents = fs::read_to_string(spec).map_err(Skip::Read)?;
    let json: Value = serde_json::from_str(&contents).map_err(Skip::Parse)?;
    let name = node_name(&json).ok_or(Skip::MissingId)?;
    if name.is_empty() {
        return Err(Skip::EmptyName);
    }

    let candidate = absolute(&bin_dir.join(name));
    if !candidate.is_file() {
        return Err(Skip::NoExecutable(candidate));
    }
    Ok((name.to_string(), candidate))
}

/// Every `*.json` file under `root`, recursively, sorted. Missing or
/// unreadable directories contribute nothing.
fn collect_spec_files(root: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![root.to_path_buf()];
    let mut files = Vec::new();
    let mut cursor = 0;
    while cursor < dirs.len() {
        let current = dirs[cursor].clone();
        cursor += 1;
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    tracing::debug!(dir = %current.display(), error = %err, "cannot read spec directory");
                }
                continue;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let Ok(ty) = entry.file_type() else { continue };
            if ty.is_dir() {
                dirs.push(path);
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_name_is_last_id_segment() {
        let spec = json!({ "$id": "https://example.org/nodes/mynode" });
        assert_eq!(node_name(&spec), Some("mynode"));
    }

    #[test]
    fn node_name_without_slash_is_whole_id() {
        assert_eq!(node_name(&json!({ "$id": "solo" })), Some("solo"));
    }

    #[test]
    fn node_name_requires_string_id() {
        assert_eq!(node_name(&json!({ "id": "x/y" })), None);
        assert_eq!(node_name(&json!({ "$id": 42 })), None);
        assert_eq!(node_name(&json!(["$id"])), None);
    }

    #[test]
    fn trailing_slash_yields_empty_name() {
        assert_eq!(node_name(&json!({ "$id": "a/b/" })), Some(""));
    }
}
