//! link2: index nodes and tools across environments and launch them under a supervisor.
//!
//! # Usage
//!
//! ```text
//! link2 [--config <file>] [--report <file>] [--supervisor-socket <path>] <command>
//! link2 environments [--json]
//! link2 list-nodes [--json]
//! link2 list-tools [--json]
//! link2 add-node <instance> <node> <env> <instance-file>
//! link2 add-tool <instance> <tool> <env> [-- args...]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    add::{AddNodeArgs, AddToolArgs},
    list::ListArgs,
    Session,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "link2",
    version,
    about = "Discover nodes and tools across environments and launch them under a supervisor",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ~/.link2/config.yaml, optional).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read the environment report from a file instead of running the report command.
    #[arg(long, global = true, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Forward launch requests to the supervisor listening on this Unix socket.
    /// Without it, launch requests are printed as JSON.
    #[arg(long, global = true, value_name = "PATH")]
    supervisor_socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the classified environments and their prefixes.
    Environments(ListArgs),

    /// List nodes declared by spec files, with the environments providing them.
    ListNodes(ListArgs),

    /// List tools matched by filename, with the environments providing them.
    ListTools(ListArgs),

    /// Launch a node instance under the supervisor.
    AddNode(AddNodeArgs),

    /// Launch a tool instance under the supervisor.
    AddTool(AddToolArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let session = Session::open(
        cli.config.as_deref(),
        cli.report.as_deref(),
        cli.supervisor_socket.as_deref(),
    )?;

    match cli.command {
        Commands::Environments(args) => commands::list::environments(&session, &args),
        Commands::ListNodes(args) => commands::list::entries(&session, &args, true),
        Commands::ListTools(args) => commands::list::entries(&session, &args, false),
        Commands::AddNode(args) => args.run(&session),
        Commands::AddTool(args) => args.run(&session),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
