//! # securityspy-stream
//!
//! Live event-stream ingestion for a SecuritySpy server.
//!
//! The server's `++eventStream` endpoint emits one line per camera event
//! (motion detection, trigger reasons, classification results). An
//! [`EventSession`] holds that connection open, decodes each line, folds
//! it into a per-camera state registry, and pushes a fresh [`Snapshot`]
//! copy to every registered consumer.
//!
//! ```no_run
//! use std::sync::Arc;
//! use securityspy_api::{SecuritySpyClient, ServerConfig};
//! use securityspy_stream::{EventSession, SessionConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ServerConfig::new("10.0.1.10", 8000, "viewer", "secret");
//! let client = SecuritySpyClient::new(server.clone())?;
//!
//! let session = Arc::new(EventSession::new(SessionConfig::new(server))?);
//! session.seed_from_cameras(&client.list_cameras().await?);
//! session.on_snapshot(|snapshot| {
//!     for (id, camera) in snapshot {
//!         println!("camera {}: motion={}", id, camera.motion_active);
//!     }
//! });
//!
//! // Retry policy is the caller's: re-seed and run again on failure.
//! session.run().await?;
//! # Ok(())
//! # }
//! ```

mod decoder;
mod dispatch;
mod error;
mod registry;
mod session;
mod types;

pub use decoder::{decode_line, Event, EventDetail, Target};
pub use dispatch::{CallbackDispatcher, SnapshotCallback};
pub use error::{DecodeError, Result, StreamError};
pub use registry::{CameraRegistry, ReconcileOutcome};
pub use session::{EventSession, SessionConfig, SessionState};
pub use types::{BoundingBox, CameraId, CameraState, EventKind, Snapshot, TriggerReason};
