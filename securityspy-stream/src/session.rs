//! The long-lived event stream session.
//!
//! One [`EventSession`] owns one connection to the server's `++eventStream`
//! endpoint, its own camera registry, and its own consumer callbacks. The
//! session never reconnects on its own: when the transport fails it
//! surfaces a retryable [`StreamError`] and leaves the retry/backoff policy
//! to the caller, who may re-seed the registry and call [`EventSession::run`]
//! again. Sessions for different servers are fully independent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use securityspy_api::ServerConfig;

use crate::decoder::{decode_line, Target};
use crate::dispatch::CallbackDispatcher;
use crate::error::{Result, StreamError};
use crate::registry::{CameraRegistry, ReconcileOutcome};
use crate::types::{CameraId, Snapshot};

/// Configuration for one stream session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server address and credential
    pub server: ServerConfig,
    /// Timeout for establishing the streaming connection
    /// Default: 10 seconds
    pub connect_timeout: Duration,
    /// Maximum time to wait for the next line before failing the session.
    /// `None` waits indefinitely.
    /// Default: None
    pub read_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Create a configuration with default timeouts.
    pub fn new(server: ServerConfig) -> Self {
        Self {
            server,
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Fail the session when no line arrives within `timeout`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

/// Lifecycle of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected; the initial state, and the result of cancellation
    Disconnected,
    /// Opening the streaming request
    Connecting,
    /// Connected and processing lines
    Streaming,
    /// The transport failed; the caller may start a new run
    Failed,
}

/// A live connection to one server's event stream.
///
/// The pipeline per line is strictly sequential: decode, reconcile into
/// the registry, then fan the fresh snapshot out to consumers. Wrap the
/// session in an `Arc` to drive [`run`](Self::run) from one task and
/// [`cancel`](Self::cancel) from another.
pub struct EventSession {
    config: SessionConfig,
    http: reqwest::Client,
    registry: Mutex<CameraRegistry>,
    dispatcher: Mutex<CallbackDispatcher>,
    state: Mutex<SessionState>,
    cancelled: AtomicBool,
    cancel_notify: Notify,
}

impl EventSession {
    /// Create a session for the given configuration.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| StreamError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http,
            registry: Mutex::new(CameraRegistry::new()),
            dispatcher: Mutex::new(CallbackDispatcher::new()),
            state: Mutex::new(SessionState::Disconnected),
            cancelled: AtomicBool::new(false),
            cancel_notify: Notify::new(),
        })
    }

    /// Seed the camera registry from (id, name) pairs.
    ///
    /// Call once with the result of the camera-list request before
    /// [`run`](Self::run); safe to call again before a reconnect. Returns
    /// the number of newly created entries.
    pub fn seed<I>(&self, cameras: I) -> usize
    where
        I: IntoIterator<Item = (CameraId, String)>,
    {
        self.registry.lock().seed(cameras)
    }

    /// Seed the camera registry from an API camera list.
    pub fn seed_from_cameras(&self, cameras: &[securityspy_api::Camera]) -> usize {
        self.seed(
            cameras
                .iter()
                .map(|camera| (CameraId::new(camera.number), camera.name.clone())),
        )
    }

    /// Register a consumer for snapshot updates.
    ///
    /// Callbacks run synchronously in registration order after every
    /// reconciled event, each receiving an immutable snapshot copy.
    /// Registering from inside a callback deadlocks; register before or
    /// between updates instead.
    pub fn on_snapshot<F>(&self, callback: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.dispatcher.lock().register(callback);
    }

    /// The current per-camera state, as a copy.
    pub fn snapshot(&self) -> Snapshot {
        self.registry.lock().snapshot()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Request cooperative shutdown.
    ///
    /// The run loop observes cancellation before each line read and exits
    /// cleanly; shutdown latency is bounded by one read timeout. A
    /// cancelled session stays cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.cancel_notify.notify_one();
    }

    /// Connect and process the event stream until the transport ends or
    /// the session is cancelled.
    ///
    /// Returns `Ok(())` only for cancellation. Every error is a retryable
    /// connectivity failure; the caller decides whether to run again.
    pub async fn run(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            self.set_state(SessionState::Disconnected);
            return Ok(());
        }

        self.set_state(SessionState::Connecting);
        let endpoint = self.config.server.event_stream_url();
        tracing::debug!(%endpoint, "opening event stream");

        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                self.set_state(SessionState::Failed);
                StreamError::Connect {
                    endpoint: endpoint.clone(),
                    message: e.to_string(),
                }
            })?;

        self.set_state(SessionState::Streaming);
        tracing::info!(camera_count = self.registry.lock().len(), "event stream connected");

        let mut reader = LineReader::new(response);
        loop {
            // Cancellation is observed before blocking on the next read.
            if self.cancelled.load(Ordering::SeqCst) {
                tracing::info!("event stream session cancelled");
                self.set_state(SessionState::Disconnected);
                return Ok(());
            }

            let next = tokio::select! {
                biased;
                _ = self.cancel_notify.notified() => {
                    tracing::info!("event stream session cancelled");
                    self.set_state(SessionState::Disconnected);
                    return Ok(());
                }
                next = self.read_next(&mut reader) => next,
            };

            match next {
                Ok(Some(line)) => self.handle_line(&line),
                Ok(None) => {
                    self.set_state(SessionState::Failed);
                    return Err(StreamError::Transport(
                        "event stream closed by server".to_string(),
                    ));
                }
                Err(e) => {
                    self.set_state(SessionState::Failed);
                    return Err(e);
                }
            }
        }
    }

    async fn read_next(&self, reader: &mut LineReader) -> Result<Option<String>> {
        match self.config.read_timeout {
            Some(limit) => tokio::time::timeout(limit, reader.next_line())
                .await
                .map_err(|_| StreamError::Timeout(limit))?,
            None => reader.next_line().await,
        }
    }

    /// Run one line through decode, reconcile, and dispatch.
    fn handle_line(&self, line: &str) {
        let event = match decode_line(line) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, line, "malformed event line discarded");
                return;
            }
        };

        let camera = match event.target {
            Target::Camera(id) => id,
            Target::Server => {
                tracing::debug!("server-wide event carries no camera target, skipped");
                return;
            }
        };

        // Reconcile under the lock, but dispatch outside it so consumers
        // can read the session's snapshot without deadlocking.
        let snapshot = {
            let mut registry = self.registry.lock();
            match registry.apply(&event) {
                ReconcileOutcome::Updated(_) => Some(registry.snapshot()),
                ReconcileOutcome::NoOp => {
                    tracing::warn!(camera = %camera, "event for unknown camera dropped");
                    None
                }
            }
        };

        if let Some(snapshot) = snapshot {
            self.dispatcher.lock().dispatch(&snapshot);
        }
    }

    fn set_state(&self, state: SessionState) {
        let mut current = self.state.lock();
        if *current != state {
            tracing::debug!(from = ?*current, to = ?state, "session state transition");
            *current = state;
        }
    }
}

impl std::fmt::Debug for EventSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSession")
            .field("host", &self.config.server.host)
            .field("state", &self.state())
            .finish()
    }
}

/// Incremental newline splitter over a streaming response body.
struct LineReader {
    response: reqwest::Response,
    buf: Vec<u8>,
}

impl LineReader {
    fn new(response: reqwest::Response) -> Self {
        Self {
            response,
            buf: Vec::new(),
        }
    }

    /// The next `\n`-terminated line, without its terminator.
    ///
    /// Returns `Ok(None)` once the body ends; a trailing unterminated
    /// fragment is yielded as a final line first.
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(newline) = self.buf.iter().position(|&b| b == b'\n') {
                let rest = self.buf.split_off(newline + 1);
                let mut line = std::mem::replace(&mut self.buf, rest);
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            let chunk = self
                .response
                .chunk()
                .await
                .map_err(|e| StreamError::Transport(e.to_string()))?;

            match chunk {
                Some(chunk) => self.buf.extend_from_slice(&chunk),
                None => {
                    if self.buf.is_empty() {
                        return Ok(None);
                    }
                    let line = String::from_utf8_lossy(&self.buf).into_owned();
                    self.buf.clear();
                    return Ok(Some(line.trim_end_matches('\r').to_string()));
                }
            }
        }
    }
}
