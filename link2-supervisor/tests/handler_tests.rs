//! CommandHandler behaviour against a real registry and a recording supervisor.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use link2_core::{Config, EnvKey, Environment, LaunchConfig, Registry};
use link2_supervisor::{
    ArgumentError, CommandError, CommandHandler, CommandRequest, CommandResult, LaunchRequest,
    LookupError, Supervisor, SupervisorError, WatcherOptions,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSupervisor {
    requests: Mutex<Vec<LaunchRequest>>,
}

impl RecordingSupervisor {
    fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Supervisor for RecordingSupervisor {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        self.requests.lock().expect("lock").push(request.clone());
        Ok("ok".to_string())
    }
}

struct RefusingSupervisor;

impl Supervisor for RefusingSupervisor {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        Err(SupervisorError::Rejected(format!("watcher {} already exists", request.name)))
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, b"#!/bin/sh\n").expect("write");
}

/// `base` holds node `mynode`; `foo` holds tool `link2-sample`.
fn fixture() -> (TempDir, PathBuf, PathBuf, Registry) {
    let dir = TempDir::new().expect("tempdir");
    let base = dir.path().join("env/base");
    let foo = dir.path().join("env/named/foo");

    let spec = base.join("share/link2/static_assets/x.json");
    fs::create_dir_all(spec.parent().expect("parent")).expect("mkdir");
    fs::write(&spec, r#"{"$id": "https://example.org/nodes/mynode"}"#).expect("spec");
    touch(&base.join("bin/mynode"));
    touch(&foo.join("bin/link2-sample"));

    let registry = Registry::build(
        vec![Environment::new("base", &base), Environment::new("foo", &foo)],
        &Config::default(),
    );
    (dir, base, foo, registry)
}

fn request(argv: &[&str]) -> CommandRequest {
    CommandRequest::from_args(argv).expect("request")
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_nodes_returns_name_to_environments() {
    let (_dir, _base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    let response = handler.handle(&request(&["list-nodes"])).expect("list-nodes");
    assert_eq!(response.subcommand, "list-nodes");
    let CommandResult::Listing(listing) = response.result else {
        panic!("expected listing");
    };
    assert_eq!(listing.len(), 1);
    assert_eq!(listing.get("mynode"), Some(&vec![EnvKey::from("base")]));
    assert!(supervisor.requests().is_empty());
}

#[test]
fn list_tools_response_serializes_to_protocol_shape() {
    let (_dir, _base, _foo, registry) = fixture();
    let handler = CommandHandler::new(registry, RecordingSupervisor::default(), LaunchConfig::default());

    let response = handler.handle(&request(&["list-tools"])).expect("list-tools");
    let json = serde_json::to_value(&response).expect("encode");
    assert_eq!(
        json,
        serde_json::json!({
            "subcommand": "list-tools",
            "result": { "link2-sample": ["foo"] }
        })
    );
}

// ---------------------------------------------------------------------------
// Launch delegation
// ---------------------------------------------------------------------------

#[test]
fn add_node_delegates_exactly_one_request() {
    let (_dir, base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let launch = LaunchConfig {
        wrapper: PathBuf::from("/opt/link2/run_in.sh"),
        ..LaunchConfig::default()
    };
    let handler = CommandHandler::new(registry, &supervisor, launch);

    let response = handler
        .handle(&request(&["add-node", "demo", "mynode", "base", "/tmp/inst.json"]))
        .expect("add-node");
    assert_eq!(response.subcommand, "add-node");
    assert_eq!(response.result, CommandResult::Ack("ok".to_string()));

    let requests = supervisor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "demo");
    assert_eq!(
        requests[0].command,
        format!(
            "/opt/link2/run_in.sh {} {} --instance-file /tmp/inst.json",
            base.display(),
            base.join("bin/mynode").display()
        )
    );
    assert_eq!(requests[0].options, WatcherOptions::delegated(2));
}

#[test]
fn add_tool_passes_raw_arguments() {
    let (_dir, _base, foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    handler
        .handle(&request(&["add-tool", "sampler", "link2-sample", "foo", "--hz 30 -v"]))
        .expect("add-tool");

    let requests = supervisor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "sampler");
    assert!(requests[0]
        .command
        .starts_with(&format!("run_in.sh {} ", foo.display())));
    assert!(requests[0].command.ends_with("/bin/link2-sample --hz 30 -v"));
}

#[test]
fn missing_node_is_a_lookup_error_without_delegation() {
    let (_dir, _base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    let err = handler
        .handle(&request(&["add-node", "demo", "missingnode", "base", "/tmp/inst.json"]))
        .unwrap_err();
    match err {
        CommandError::Lookup(LookupError::NotFound { name, env, .. }) => {
            assert_eq!(name, "missingnode");
            assert_eq!(env, "base");
        }
        other => panic!("expected lookup error, got {other}"),
    }
    assert!(supervisor.requests().is_empty());
}

#[test]
fn unknown_environment_is_reported_as_such() {
    let (_dir, _base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    let err = handler
        .handle(&request(&["add-tool", "t", "link2-sample", "bar", ""]))
        .unwrap_err();
    assert!(
        matches!(err, CommandError::Lookup(LookupError::UnknownEnvironment { ref env }) if env == "bar"),
        "got: {err}"
    );
    assert!(supervisor.requests().is_empty());
}

#[test]
fn tool_is_not_launchable_as_node() {
    let (_dir, _base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    let err = handler
        .handle(&request(&["add-node", "x", "link2-sample", "foo", "/tmp/i.json"]))
        .unwrap_err();
    assert!(matches!(err, CommandError::Lookup(LookupError::NotFound { .. })), "got: {err}");
    assert!(supervisor.requests().is_empty());
}

#[test]
fn supervisor_failure_is_surfaced() {
    let (_dir, _base, _foo, registry) = fixture();
    let handler = CommandHandler::new(registry, RefusingSupervisor, LaunchConfig::default());

    let err = handler
        .handle(&request(&["add-node", "demo", "mynode", "base", "/tmp/inst.json"]))
        .unwrap_err();
    assert!(matches!(err, CommandError::Supervisor(SupervisorError::Rejected(_))), "got: {err}");
    assert!(err.to_string().contains("watcher demo already exists"));
}

// ---------------------------------------------------------------------------
// Validation precedes execution
// ---------------------------------------------------------------------------

#[test]
fn add_node_with_three_arguments_never_reaches_the_supervisor() {
    let (_dir, _base, _foo, registry) = fixture();
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(registry, &supervisor, LaunchConfig::default());

    let err = handler
        .handle(&request(&["add-node", "demo", "mynode", "base"]))
        .unwrap_err();
    assert!(
        matches!(err, CommandError::Argument(ArgumentError::WrongArity { expected: 4, got: 3, .. })),
        "got: {err}"
    );
    assert!(supervisor.requests().is_empty());
}

#[test]
fn unknown_subcommand_is_an_argument_error_even_on_empty_registry() {
    let supervisor = RecordingSupervisor::default();
    let handler = CommandHandler::new(Registry::default(), &supervisor, LaunchConfig::default());

    let err = handler.handle(&request(&["restart", "demo"])).unwrap_err();
    assert!(matches!(err, CommandError::Argument(ArgumentError::UnknownSubcommand(_))), "got: {err}");
    assert_eq!(err.to_string(), "unknown command restart");
    assert!(supervisor.requests().is_empty());
}

#[test]
fn handler_is_shareable_across_threads() {
    let (_dir, _base, _foo, registry) = fixture();
    let handler = CommandHandler::new(registry, RecordingSupervisor::default(), LaunchConfig::default());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let response = handler.handle(&request(&["list-nodes"])).expect("list");
                assert!(matches!(response.result, CommandResult::Listing(ref l) if l.contains_key("mynode")));
            });
        }
    });
}
