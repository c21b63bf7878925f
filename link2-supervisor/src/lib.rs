//! Subcommand handling and launch delegation to an external supervisor.

mod error;
pub mod handler;
pub mod launch;
#[cfg(unix)]
pub mod socket;

pub use error::{ArgumentError, CommandError, LookupError, SupervisorError};
pub use handler::{Command, CommandHandler, CommandRequest, CommandResponse, CommandResult};
pub use launch::{LaunchArgs, LaunchRequest, Supervisor, WatcherOptions};
#[cfg(unix)]
pub use socket::SocketSupervisor;
