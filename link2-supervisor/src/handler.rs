//! Subcommand validation and dispatch against an immutable [`Registry`].
//!
//! ```text
//! list-nodes
//! list-tools
//! add-node <instance-name> <node-name> <env-name> <instance-file>
//! add-tool <instance-name> <tool-name> <env-name> <args>
//! ```
//!
//! [`Command::validate`] runs first and is pure; nothing touches the registry
//! or the supervisor until a request has passed it.

use serde::{Deserialize, Serialize};

use link2_core::{EntryKind, LaunchConfig, NameIndex, Registry};

use crate::error::{ArgumentError, CommandError, LookupError};
use crate::launch::{LaunchArgs, LaunchRequest, Supervisor};

pub const LIST_NODES: &str = "list-nodes";
pub const LIST_TOOLS: &str = "list-tools";
pub const ADD_NODE: &str = "add-node";
pub const ADD_TOOL: &str = "add-tool";

const ADD_NODE_USAGE: &str = "add-node <instance-name> <node-name> <env-name> <instance-file>";
const ADD_TOOL_USAGE: &str = "add-tool <instance-name> <tool-name> <env-name> <args>";

/// Unvalidated request: subcommand name plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub subcommand: String,
    #[serde(rename = "subcommand-args", default)]
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new<I, S>(subcommand: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subcommand: subcommand.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Map console input (`["add-node", "demo", …]`) onto a request.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ArgumentError> {
        let (subcommand, rest) = args.split_first().ok_or(ArgumentError::MissingSubcommand)?;
        Ok(Self::new(
            subcommand.as_ref(),
            rest.iter().map(|a| a.as_ref().to_string()),
        ))
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListNodes,
    ListTools,
    AddNode {
        instance: String,
        node: String,
        env: String,
        instance_file: String,
    },
    AddTool {
        instance: String,
        tool: String,
        env: String,
        args: String,
    },
}

impl Command {
    /// Check the subcommand name and its arity. Performs no lookups.
    pub fn validate(request: &CommandRequest) -> Result<Self, ArgumentError> {
        let args = &request.args;
        match request.subcommand.as_str() {
            LIST_NODES if !args.is_empty() => Err(no_args(LIST_NODES, args)),
            LIST_TOOLS if !args.is_empty() => Err(no_args(LIST_TOOLS, args)),
            LIST_NODES => Ok(Command::ListNodes),
            LIST_TOOLS => Ok(Command::ListTools),
            ADD_NODE => {
                let [instance, node, env, instance_file] = four(ADD_NODE, ADD_NODE_USAGE, args)?;
                Ok(Command::AddNode {
                    instance,
                    node,
                    env,
                    instance_file,
                })
            }
            ADD_TOOL => {
                let [instance, tool, env, args] = four(ADD_TOOL, ADD_TOOL_USAGE, args)?;
                Ok(Command::AddTool {
                    instance,
                    tool,
                    env,
                    args,
                })
            }
            other => Err(ArgumentError::UnknownSubcommand(other.to_string())),
        }
    }

    pub fn subcommand(&self) -> &'static str {
        match self {
            Command::ListNodes => LIST_NODES,
            Command::ListTools => LIST_TOOLS,
            Command::AddNode { .. } => ADD_NODE,
            Command::AddTool { .. } => ADD_TOOL,
        }
    }
}

fn no_args(subcommand: &'static str, args: &[String]) -> ArgumentError {
    ArgumentError::WrongArity {
        subcommand,
        expected: 0,
        got: args.len(),
        usage: subcommand,
    }
}

fn four(
    subcommand: &'static str,
    usage: &'static str,
    args: &[String],
) -> Result<[String; 4], ArgumentError> {
    <[String; 4]>::try_from(args.to_vec()).map_err(|_| ArgumentError::WrongArity {
        subcommand,
        expected: 4,
        got: args.len(),
        usage,
    })
}

/// `result` of a response: a name listing or an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandResult {
    Listing(NameIndex),
    Ack(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub subcommand: String,
    pub result: CommandResult,
}

/// Serves subcommands from one registry, delegating launches to `S`.
///
/// Holds no mutable state; `&self` methods may be called concurrently when
/// `S` allows it.
#[derive(Debug)]
pub struct CommandHandler<S> {
    registry: Registry,
    supervisor: S,
    launch: LaunchConfig,
}

impl<S: Supervisor> CommandHandler<S> {
    pub fn new(registry: Registry, supervisor: S, launch: LaunchConfig) -> Self {
        Self {
            registry,
            supervisor,
            launch,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate, then execute.
    pub fn handle(&self, request: &CommandRequest) -> Result<CommandResponse, CommandError> {
        let command = Command::validate(request)?;
        self.execute(command)
    }

    pub fn execute(&self, command: Command) -> Result<CommandResponse, CommandError> {
        let subcommand = command.subcommand().to_string();
        let result = match command {
            Command::ListNodes => CommandResult::Listing(self.registry.list_by_name(true)),
            Command::ListTools => CommandResult::Listing(self.registry.list_by_name(false)),
            Command::AddNode {
                instance,
                node,
                env,
                instance_file,
            } => CommandResult::Ack(self.launch(
                EntryKind::Node,
                &instance,
                &node,
                &env,
                LaunchArgs::InstanceFile(instance_file),
            )?),
            Command::AddTool {
                instance,
                tool,
                env,
                args,
            } => CommandResult::Ack(self.launch(
                EntryKind::Tool,
                &instance,
                &tool,
                &env,
                LaunchArgs::Raw(args),
            )?),
        };
        Ok(CommandResponse { subcommand, result })
    }

    fn launch(
        &self,
        kind: EntryKind,
        instance: &str,
        name: &str,
        env: &str,
        args: LaunchArgs,
    ) -> Result<String, CommandError> {
        let entry = self
            .registry
            .find(kind.is_node(), name, env)
            .ok_or_else(|| self.lookup_error(kind, name, env))?;

        let request = LaunchRequest::for_entry(instance, entry, &args, &self.launch);
        tracing::info!(
            instance = %request.name,
            kind = %kind,
            name = %entry.name,
            env = %entry.environment,
            command = %request.command,
            "delegating launch to supervisor",
        );
        self.supervisor.add_watcher(&request)?;
        Ok("ok".to_string())
    }

    fn lookup_error(&self, kind: EntryKind, name: &str, env: &str) -> LookupError {
        if self.registry.has_environment(env) {
            LookupError::NotFound {
                kind,
                name: name.to_string(),
                env: env.to_string(),
            }
        } else {
            LookupError::UnknownEnvironment {
                env: env.to_string(),
            }
        }
    }
}
