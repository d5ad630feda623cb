//! Daemon control commands: status, stop, restart.
//!
//! All state lives in the pidfile and the socket; these commands only read
//! and signal, they never share memory with the daemon.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::path;

const STOP_POLL_ATTEMPTS: u32 = 20;
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Print daemon status. Returns the process exit code: 0 when a live daemon
/// answers on the socket, 1 otherwise.
pub fn status() -> i32 {
    let pid_path = path::pid_path();
    let socket_path = path::socket_path();

    let Some(pid) = read_pid_file(&pid_path) else {
        println!("not running");
        return 1;
    };

    if !process_alive(pid) {
        println!("not running (stale PID {pid})");
        let _ = std::fs::remove_file(&pid_path);
        let _ = std::fs::remove_file(&socket_path);
        return 1;
    }

    if UnixStream::connect(&socket_path).is_err() {
        println!("process {pid} alive but socket not responding");
        return 1;
    }

    println!("running (PID {pid})");
    0
}

/// Signal the daemon to stop and wait briefly for its socket to disappear.
pub fn stop() {
    let pid_path = path::pid_path();
    let socket_path = path::socket_path();

    let Some(pid) = read_pid_file(&pid_path) else {
        println!("not running");
        return;
    };

    if kill(Pid::from_raw(pid), Signal::SIGTERM).is_err() {
        println!("could not signal {pid}, cleaning up");
        let _ = std::fs::remove_file(&pid_path);
        let _ = std::fs::remove_file(&socket_path);
        return;
    }

    for _ in 0..STOP_POLL_ATTEMPTS {
        std::thread::sleep(STOP_POLL_INTERVAL);
        if !socket_path.exists() {
            println!("stopped (PID {pid})");
            return;
        }
    }

    println!("sent SIGTERM to {pid} but socket still exists");
}

/// Stop any running daemon, then start a fresh one and wait for its socket.
/// Returns the process exit code.
pub fn restart() -> i32 {
    stop();
    std::thread::sleep(Duration::from_millis(200));

    if let Err(e) = super::client::spawn_daemon_process() {
        eprintln!("failed to start: {e}");
        return 1;
    }

    let socket_path = path::socket_path();
    for _ in 0..STOP_POLL_ATTEMPTS {
        std::thread::sleep(STOP_POLL_INTERVAL);
        if UnixStream::connect(&socket_path).is_ok() {
            println!("restarted");
            return 0;
        }
    }

    println!("started but not yet accepting connections");
    0
}

fn read_pid_file(path: &Path) -> Option<i32> {
    let contents = std::fs::read_to_string(path).ok()?;
    contents.trim().parse().ok()
}

/// Signal 0 probes for existence without delivering anything.
fn process_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}
