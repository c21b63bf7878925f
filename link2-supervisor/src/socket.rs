//! Launch delegation to a supervisor listening on a Unix socket.
//!
//! Each launch opens one connection and exchanges one JSON line each way:
//!
//! ```text
//! -> {"cmd":"add-watcher","name":"demo","command":"run_in.sh ...","options":{...}}
//! <- {"ok":true,"data":"ok"}  |  {"ok":false,"error":"watcher demo exists"}
//! ```

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{io_err, SupervisorError};
use crate::launch::{LaunchRequest, Supervisor};

pub const ADD_WATCHER: &str = "add-watcher";

#[derive(Serialize)]
struct AddWatcher<'a> {
    cmd: &'static str,
    #[serde(flatten)]
    launch: &'a LaunchRequest,
}

#[derive(Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
}

impl Reply {
    fn into_ack(self) -> Result<String, SupervisorError> {
        if !self.ok {
            let reason = self.error.unwrap_or_else(|| "no reason given".to_string());
            return Err(SupervisorError::Rejected(reason));
        }
        Ok(match self.data {
            Value::Null => "ok".to_string(),
            Value::String(ack) => ack,
            other => other.to_string(),
        })
    }
}

/// Forwards launch requests to a supervisor listening on a Unix socket.
///
/// One connection per request; no retries and no timeout of its own.
#[derive(Debug, Clone)]
pub struct SocketSupervisor {
    socket: PathBuf,
}

impl SocketSupervisor {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    fn connect(&self) -> Result<UnixStream, SupervisorError> {
        UnixStream::connect(&self.socket).map_err(|err| match err.kind() {
            ErrorKind::NotFound | ErrorKind::ConnectionRefused => SupervisorError::NotRunning {
                socket: self.socket.clone(),
            },
            _ => io_err(&self.socket, err),
        })
    }
}

impl Supervisor for SocketSupervisor {
    fn add_watcher(&self, request: &LaunchRequest) -> Result<String, SupervisorError> {
        let stream = self.connect()?;

        let mut line = serde_json::to_vec(&AddWatcher {
            cmd: ADD_WATCHER,
            launch: request,
        })?;
        line.push(b'\n');
        let mut writer = &stream;
        writer
            .write_all(&line)
            .and_then(|()| stream.shutdown(Shutdown::Write))
            .map_err(|e| io_err(&self.socket, e))?;

        let mut reply = String::new();
        BufReader::new(&stream)
            .read_line(&mut reply)
            .map_err(|e| io_err(&self.socket, e))?;
        if reply.trim().is_empty() {
            return Err(SupervisorError::Protocol(format!(
                "no reply to {ADD_WATCHER} for '{}'",
                request.name
            )));
        }

        let reply: Reply = serde_json::from_str(&reply)?;
        reply.into_ack()
    }
}
