//! Launch requests and the seam to the external supervisor.
//!
//! A launch request names a watcher, carries the full command line, and fixes
//! the option set: the supervisor neither respawns nor autostarts the instance,
//! copies the caller's environment, and stops it with the configured signal.

use serde::{Deserialize, Serialize};

use link2_core::{Entry, LaunchConfig};

use crate::error::SupervisorError;

/// Options attached to every watcher created on behalf of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherOptions {
    pub respawn: bool,
    pub autostart: bool,
    pub copy_env: bool,
    pub stop_signal: i32,
}

impl WatcherOptions {
    pub fn delegated(stop_signal: i32) -> Self {
        Self {
            respawn: false,
            autostart: false,
            copy_env: true,
            stop_signal,
        }
    }
}

/// One "create a supervised process" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Watcher (instance) name.
    pub name: String,
    pub command: String,
    pub options: WatcherOptions,
}

/// Trailing arguments of the launch command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchArgs {
    /// Nodes receive `--instance-file <path>`.
    InstanceFile(String),
    /// Tools receive the caller's argument string verbatim.
    Raw(String),
}

impl LaunchRequest {
    /// `<wrapper> <prefix> <executable> <args…>`
    pub fn for_entry(
        instance_name: &str,
        entry: &Entry,
        args: &LaunchArgs,
        launch: &LaunchConfig,
    ) -> Self {
        let mut command = format!(
            "{} {} {}",
            launch.wrapper.display(),
            entry.prefix.display(),
            entry.executable.display(),
        );
        match args {
            LaunchArgs::InstanceFile(file) => {
                command.push_str(" --instance-file ");
                command.push_str(file);
            }
            LaunchArgs::Raw(raw) if !raw.is_empty() => {
                command.push(' ');
                command.push_str(raw);
            }
            LaunchArgs::Raw(_) => {}
        }

        Self {
            name: instance_name.to_string(),
            command,
            options: WatcherOptions::delegated(launch.stop_signal),
        }
    }
}

/// The external process supervisor.
///
/// Implementations only forward the request; lifecycle policy belongs to the
/// supervisor. The returned string is its acknowledgment.
pub trait Supervisor {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError>;
}

impl<S: Supervisor + ?Sized> Supervisor for &S {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        (**self).add_watcher(request)
    }
}

impl<S: Supervisor + ?Sized> Supervisor for Box<S> {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        (**self).add_watcher(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link2_core::{EnvKey, EntryKind};
    use std::path::PathBuf;

    fn entry(kind: EntryKind, name: &str) -> Entry {
        Entry {
            kind,
            prefix: PathBuf::from("/env/base"),
            environment: EnvKey::base(),
            name: name.to_string(),
            executable: PathBuf::from(format!("/env/base/bin/{name}")),
        }
    }

    #[test]
    fn node_command_carries_instance_file() {
        let request = LaunchRequest::for_entry(
            "demo",
            &entry(EntryKind::Node, "mynode"),
            &LaunchArgs::InstanceFile("/tmp/inst.json".into()),
            &LaunchConfig::default(),
        );
        assert_eq!(request.name, "demo");
        assert_eq!(
            request.command,
            "run_in.sh /env/base /env/base/bin/mynode --instance-file /tmp/inst.json"
        );
        assert_eq!(request.options, WatcherOptions::delegated(2));
    }

    #[test]
    fn tool_command_appends_raw_args_verbatim() {
        let request = LaunchRequest::for_entry(
            "t",
            &entry(EntryKind::Tool, "link2-sample"),
            &LaunchArgs::Raw("--rate 10  --verbose".into()),
            &LaunchConfig::default(),
        );
        assert_eq!(
            request.command,
            "run_in.sh /env/base /env/base/bin/link2-sample --rate 10  --verbose"
        );
    }

    #[test]
    fn tool_command_without_args_has_no_trailing_space() {
        let request = LaunchRequest::for_entry(
            "t",
            &entry(EntryKind::Tool, "link2-sample"),
            &LaunchArgs::Raw(String::new()),
            &LaunchConfig::default(),
        );
        assert!(request.command.ends_with("bin/link2-sample"));
    }

    #[test]
    fn options_never_respawn_or_autostart() {
        let options = WatcherOptions::delegated(15);
        assert!(!options.respawn);
        assert!(!options.autostart);
        assert!(options.copy_env);
        assert_eq!(options.stop_signal, 15);
    }
}
