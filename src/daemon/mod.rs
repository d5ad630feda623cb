//! Long-lived companion service.
//!
//! One instance per user, listening on a local stream socket. Connections
//! are handled sequentially: the model call dominates the cost and the host
//! only ever has one pending tool call, so there is nothing to parallelize.
//! The daemon shuts itself down after an idle period or on a termination
//! signal, removing its socket and pidfile.

pub mod client;
pub mod control;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{timeout, Instant};
use tracing::{info, warn};

use crate::evaluator::Evaluator;
use crate::path;
use crate::protocol::{EvalRequest, EvalResponse};

/// How long the daemon waits without a connection before exiting.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Deadline for one whole request/response cycle, slightly larger than the
/// evaluator deadline so a slow model still gets its reply written.
const CONNECTION_DEADLINE: Duration = Duration::from_secs(35);

/// Deadline for a single evaluator call.
const EVALUATOR_DEADLINE: Duration = Duration::from_secs(30);

/// Dial timeout when probing for an already-running instance.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon already running at {0}")]
    AlreadyRunning(PathBuf),
    #[error("listen on {path}: {source}")]
    Listen {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("install signal handler: {0}")]
    Signal(std::io::Error),
}

/// Daemon configuration. Path overrides exist for tests; empty means the
/// per-user defaults under the config directory.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub idle_timeout: Duration,
    pub socket_path: Option<PathBuf>,
    pub pid_path: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            socket_path: None,
            pid_path: None,
        }
    }
}

impl DaemonConfig {
    fn socket(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(path::socket_path)
    }

    fn pid(&self) -> PathBuf {
        self.pid_path.clone().unwrap_or_else(path::pid_path)
    }
}

/// The companion service: a socket listener wrapping one evaluator.
pub struct Daemon<E: Evaluator> {
    evaluator: E,
    config: DaemonConfig,
    shutting_down: AtomicBool,
}

impl<E: Evaluator> Daemon<E> {
    pub fn new(evaluator: E, config: DaemonConfig) -> Self {
        Daemon {
            evaluator,
            config,
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Bind the socket and serve until a termination signal or idle expiry.
    ///
    /// Fails fast when another instance is already answering on the socket.
    pub async fn run(&self) -> Result<(), DaemonError> {
        let socket_path = self.config.socket();
        let pid_path = self.config.pid();

        if let Some(parent) = socket_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        // A live listener means another instance owns this socket; a stale
        // file from an unclean exit is removed and replaced.
        if let Ok(Ok(_)) = timeout(PROBE_TIMEOUT, UnixStream::connect(&socket_path)).await {
            return Err(DaemonError::AlreadyRunning(socket_path));
        }
        let _ = std::fs::remove_file(&socket_path);

        let listener = UnixListener::bind(&socket_path).map_err(|source| DaemonError::Listen {
            path: socket_path.clone(),
            source,
        })?;

        let _ = std::fs::write(&pid_path, std::process::id().to_string());

        let mut sigterm = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(DaemonError::Signal)?;

        let idle_timeout = self.config.idle_timeout;
        let mut idle_deadline = Instant::now() + idle_timeout;

        info!(socket = %socket_path.display(), "daemon listening");

        loop {
            tokio::select! {
                result = listener.accept() => match result {
                    Ok((stream, _)) => {
                        idle_deadline = Instant::now() + idle_timeout;
                        self.handle_connection(stream).await;
                    }
                    Err(e) => {
                        if self.shutting_down.load(Ordering::SeqCst) {
                            break;
                        }
                        warn!("accept error: {e}");
                    }
                },
                _ = tokio::time::sleep_until(idle_deadline) => {
                    info!("idle timeout reached, shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT");
                    break;
                }
            }
        }

        drop(listener);
        self.shutdown();
        Ok(())
    }

    /// Serve one connection under the cycle deadline. The connection always
    /// gets a reply unless the deadline itself expires.
    async fn handle_connection(&self, stream: UnixStream) {
        if timeout(CONNECTION_DEADLINE, self.serve(stream)).await.is_err() {
            warn!("connection deadline exceeded");
        }
    }

    async fn serve(&self, stream: UnixStream) {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();

        let response = match reader.read_line(&mut line).await {
            Err(e) => EvalResponse::ask(format!("failed to decode request: {e}")),
            Ok(_) => match serde_json::from_str::<EvalRequest>(&line) {
                Err(e) => EvalResponse::ask(format!("failed to decode request: {e}")),
                Ok(request) => self.evaluate_with_deadline(&request).await,
            },
        };

        let Ok(mut payload) = serde_json::to_string(&response) else {
            return;
        };
        payload.push('\n');
        if let Err(e) = write_half.write_all(payload.as_bytes()).await {
            warn!("failed to write response: {e}");
        }
    }

    async fn evaluate_with_deadline(&self, request: &EvalRequest) -> EvalResponse {
        match timeout(EVALUATOR_DEADLINE, self.evaluator.evaluate(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => EvalResponse::ask(format!("evaluator error: {e}")),
            Err(_) => EvalResponse::ask("evaluator error: evaluation timed out"),
        }
    }

    /// Remove socket and pidfile and close the evaluator. Idempotent.
    fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = std::fs::remove_file(self.config.socket());
        let _ = std::fs::remove_file(self.config.pid());
        self.evaluator.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorError;
    use async_trait::async_trait;

    struct MockEvaluator {
        decision: &'static str,
        reason: &'static str,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MockEvaluator {
        fn allowing() -> Self {
            MockEvaluator {
                decision: "ALLOW",
                reason: "mock says fine",
                fail: false,
                delay: None,
            }
        }

        fn failing() -> Self {
            MockEvaluator {
                decision: "ALLOW",
                reason: "",
                fail: true,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl Evaluator for MockEvaluator {
        async fn evaluate(&self, _req: &EvalRequest) -> Result<EvalResponse, EvaluatorError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(EvaluatorError::Backend("backend exploded".to_string()));
            }
            Ok(EvalResponse {
                decision: self.decision.to_string(),
                reason: self.reason.to_string(),
            })
        }
    }

    fn test_config(dir: &tempfile::TempDir, idle: Duration) -> DaemonConfig {
        DaemonConfig {
            idle_timeout: idle,
            socket_path: Some(dir.path().join("test.sock")),
            pid_path: Some(dir.path().join("test.pid")),
        }
    }

    async fn round_trip(socket: &std::path::Path, request: &EvalRequest) -> EvalResponse {
        let stream = UnixStream::connect(socket).await.expect("connect");
        let (read_half, mut write_half) = stream.into_split();
        let mut payload = serde_json::to_string(request).unwrap();
        payload.push('\n');
        write_half.write_all(payload.as_bytes()).await.unwrap();
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).expect("response json")
    }

    fn sample_request() -> EvalRequest {
        EvalRequest {
            tool_name: "Bash".to_string(),
            tool_input: r#"{"command":"frobnicate"}"#.to_string(),
            work_dir: "/proj".to_string(),
        }
    }

    #[tokio::test]
    async fn answers_one_request_and_cleans_up_on_idle() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, Duration::from_millis(300));
        let socket = config.socket();
        let pid = config.pid();

        let daemon = Daemon::new(MockEvaluator::allowing(), config);
        let run = tokio::spawn(async move { daemon.run().await });

        // Wait for the socket to appear.
        for _ in 0..50 {
            if socket.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(pid.exists(), "pidfile written on start");

        let response = round_trip(&socket, &sample_request()).await;
        assert_eq!(response.decision, "ALLOW");
        assert_eq!(response.reason, "mock says fine");

        // Idle expiry ends the run and removes socket and pidfile.
        timeout(Duration::from_secs(2), run)
            .await
            .expect("daemon should stop on idle")
            .unwrap()
            .unwrap();
        assert!(!socket.exists());
        assert!(!pid.exists());
    }

    #[tokio::test]
    async fn evaluator_failure_answers_ask() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, Duration::from_millis(500));
        let socket = config.socket();

        let daemon = Daemon::new(MockEvaluator::failing(), config);
        let run = tokio::spawn(async move { daemon.run().await });

        for _ in 0..50 {
            if socket.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let response = round_trip(&socket, &sample_request()).await;
        assert_eq!(response.decision, "ASK");
        assert!(response.reason.starts_with("evaluator error:"));

        let _ = timeout(Duration::from_secs(2), run).await;
    }

    #[tokio::test]
    async fn malformed_request_answers_ask() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, Duration::from_millis(500));
        let socket = config.socket();

        let daemon = Daemon::new(MockEvaluator::allowing(), config);
        let run = tokio::spawn(async move { daemon.run().await });

        for _ in 0..50 {
            if socket.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let stream = UnixStream::connect(&socket).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(b"this is not json\n").await.unwrap();
        let mut line = String::new();
        BufReader::new(read_half).read_line(&mut line).await.unwrap();
        let response: EvalResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(response.decision, "ASK");
        assert!(response.reason.starts_with("failed to decode request"));

        let _ = timeout(Duration::from_secs(2), run).await;
    }

    #[tokio::test]
    async fn second_instance_refuses_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, Duration::from_millis(800));
        let socket = config.socket();

        let first = Daemon::new(MockEvaluator::allowing(), config.clone());
        let run = tokio::spawn(async move { first.run().await });

        for _ in 0..50 {
            if socket.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let second = Daemon::new(MockEvaluator::allowing(), config);
        match second.run().await {
            Err(DaemonError::AlreadyRunning(path)) => assert_eq!(path, socket),
            other => panic!("expected AlreadyRunning, got {other:?}"),
        }

        let _ = timeout(Duration::from_secs(2), run).await;
    }

    #[tokio::test]
    async fn stale_socket_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir, Duration::from_millis(200));
        let socket = config.socket();

        // A leftover file with no listener behind it.
        std::fs::write(&socket, b"").unwrap();

        let daemon = Daemon::new(MockEvaluator::allowing(), config);
        daemon.run().await.expect("stale socket should not block start");
        assert!(!socket.exists());
    }

    #[tokio::test]
    async fn slow_evaluator_is_cut_off() {
        tokio::time::pause();
        let evaluator = MockEvaluator {
            decision: "ALLOW",
            reason: "",
            fail: false,
            delay: Some(Duration::from_secs(60)),
        };
        let daemon = Daemon::new(
            evaluator,
            DaemonConfig {
                idle_timeout: Duration::from_secs(300),
                socket_path: None,
                pid_path: None,
            },
        );
        let request = sample_request();
        let pending = daemon.evaluate_with_deadline(&request);
        tokio::pin!(pending);
        tokio::time::advance(Duration::from_secs(31)).await;
        let response = pending.await;
        assert_eq!(response.decision, "ASK");
        assert_eq!(response.reason, "evaluator error: evaluation timed out");
    }
}
