//! Hook-side companion IPC: dial, spawn on demand, poll, one
//! request/response per connection.
//!
//! Deliberately synchronous — the hook client is a short-lived process doing
//! one blocking exchange, and deadlines are plain socket timeouts.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::path;
use crate::protocol::{EvalRequest, EvalResponse};

/// Deadline for establishing a connection to the daemon.
const DIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline for one request/response cycle, matching the daemon side.
const CYCLE_TIMEOUT: Duration = Duration::from_secs(35);

/// How long to poll for the socket after spawning the daemon.
const SPAWN_POLL_ATTEMPTS: u32 = 10;
const SPAWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connect to daemon: {0}")]
    Connect(std::io::Error),
    #[error("failed to start daemon: {0}")]
    Spawn(std::io::Error),
    #[error("daemon not available after retries: {0}")]
    Unavailable(Box<ClientError>),
    #[error("encode request: {0}")]
    Encode(serde_json::Error),
    #[error("decode response: {0}")]
    Decode(serde_json::Error),
    #[error("socket I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Query the companion daemon, starting it first if nothing is listening.
pub fn query_companion(request: &EvalRequest) -> Result<EvalResponse, ClientError> {
    let socket = path::socket_path();

    match send_request(&socket, request) {
        Ok(response) => return Ok(response),
        Err(_) => {
            spawn_daemon_process().map_err(ClientError::Spawn)?;
        }
    }

    let mut last_err = None;
    for _ in 0..SPAWN_POLL_ATTEMPTS {
        std::thread::sleep(SPAWN_POLL_INTERVAL);
        match send_request(&socket, request) {
            Ok(response) => return Ok(response),
            Err(e) => last_err = Some(e),
        }
    }

    Err(ClientError::Unavailable(Box::new(
        last_err.unwrap_or_else(|| {
            ClientError::Connect(std::io::Error::other("no connection attempt succeeded"))
        }),
    )))
}

/// One request, one reply, over a fresh connection.
pub fn send_request(socket: &Path, request: &EvalRequest) -> Result<EvalResponse, ClientError> {
    let stream = connect_with_timeout(socket, DIAL_TIMEOUT).map_err(ClientError::Connect)?;
    stream.set_read_timeout(Some(CYCLE_TIMEOUT))?;
    stream.set_write_timeout(Some(CYCLE_TIMEOUT))?;

    let mut payload = serde_json::to_string(request).map_err(ClientError::Encode)?;
    payload.push('\n');
    (&stream).write_all(payload.as_bytes())?;

    let mut reader = BufReader::new(&stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    serde_json::from_str(&line).map_err(ClientError::Decode)
}

/// Connect with a dial deadline. A blocking `connect` has no timeout of its
/// own, and a wedged daemon (listening but not accepting) would stall it
/// past every documented bound, so the connect runs on a helper thread and
/// the wait is capped here. An abandoned connect holds nothing but the
/// thread and the socket.
fn connect_with_timeout(socket: &Path, deadline: Duration) -> std::io::Result<UnixStream> {
    let socket = socket.to_path_buf();
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(UnixStream::connect(&socket));
    });

    match rx.recv_timeout(deadline) {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out dialing daemon socket",
        )),
    }
}

/// Start the daemon as a detached background process, reusing this binary.
pub fn spawn_daemon_process() -> std::io::Result<()> {
    let exe = std::env::current_exe()?;
    Command::new(exe)
        .arg("daemon")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
