//! `link2 add-node` and `link2 add-tool`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use link2_supervisor::{handler, CommandRequest, CommandResult};

use super::Session;

#[derive(Args, Debug)]
pub struct AddNodeArgs {
    /// Name of the supervised instance.
    pub instance: String,

    /// Node name as listed by `link2 list-nodes`.
    pub node: String,

    /// Environment providing the node.
    pub env: String,

    /// Instance file passed to the node as `--instance-file`.
    pub instance_file: String,
}

#[derive(Args, Debug)]
pub struct AddToolArgs {
    /// Name of the supervised instance.
    pub instance: String,

    /// Tool name as listed by `link2 list-tools`.
    pub tool: String,

    /// Environment providing the tool.
    pub env: String,

    /// Arguments appended to the tool command line. They are re-joined with
    /// single spaces and not quoted, so `"a b" c` reaches the tool as `a b c`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl AddNodeArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let request = CommandRequest::new(
            handler::ADD_NODE,
            [self.instance.clone(), self.node.clone(), self.env.clone(), self.instance_file],
        );
        delegate(session, &request, &self.instance, &self.node, &self.env)
    }
}

impl AddToolArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let request = CommandRequest::new(
            handler::ADD_TOOL,
            [self.instance.clone(), self.tool.clone(), self.env.clone(), self.args.join(" ")],
        );
        delegate(session, &request, &self.instance, &self.tool, &self.env)
    }
}

fn delegate(
    session: &Session,
    request: &CommandRequest,
    instance: &str,
    name: &str,
    env: &str,
) -> Result<()> {
    let response = session
        .handler
        .handle(request)
        .with_context(|| format!("failed to launch '{instance}'"))?;

    let ack = match response.result {
        CommandResult::Ack(ack) => ack,
        CommandResult::Listing(_) => String::new(),
    };
    eprintln!(
        "{} '{}' ({} in {}): {}",
        "✓ delegated".green(),
        instance,
        name,
        env,
        ack
    );
    Ok(())
}
