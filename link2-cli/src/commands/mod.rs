pub mod add;
pub mod list;

use std::path::Path;

use anyhow::{Context, Result};

use link2_core::{config, Registry, ReportSource};
use link2_supervisor::{CommandHandler, LaunchRequest, Supervisor, SupervisorError};

/// Registry built once for this invocation plus the handler serving it.
pub struct Session {
    pub handler: CommandHandler<Box<dyn Supervisor>>,
}

impl Session {
    pub fn open(
        config_file: Option<&Path>,
        report: Option<&Path>,
        supervisor_socket: Option<&Path>,
    ) -> Result<Self> {
        let config = match config_file {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load().context("failed to load ~/.link2/config.yaml")?,
        };

        let source = match report {
            Some(path) => ReportSource::File(path.to_path_buf()),
            None => ReportSource::Command(config.report_command.clone()),
        };
        tracing::debug!(source = ?source, product = %config.product, "discovering registry");
        let registry = Registry::discover_from(&source, &config);

        let supervisor = supervisor_for(supervisor_socket)?;
        Ok(Self {
            handler: CommandHandler::new(registry, supervisor, config.launch),
        })
    }

    pub fn registry(&self) -> &Registry {
        self.handler.registry()
    }
}

#[cfg(unix)]
fn supervisor_for(socket: Option<&Path>) -> Result<Box<dyn Supervisor>> {
    Ok(match socket {
        Some(path) => Box::new(link2_supervisor::SocketSupervisor::new(path)),
        None => Box::new(StdoutSupervisor),
    })
}

#[cfg(not(unix))]
fn supervisor_for(socket: Option<&Path>) -> Result<Box<dyn Supervisor>> {
    match socket {
        Some(_) => anyhow::bail!("--supervisor-socket requires Unix domain sockets"),
        None => Ok(Box::new(StdoutSupervisor)),
    }
}

/// Prints each launch request as JSON for an external supervisor to pick up.
struct StdoutSupervisor;

impl Supervisor for StdoutSupervisor {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        println!("{}", serde_json::to_string_pretty(request)?);
        Ok("ok".to_string())
    }
}
