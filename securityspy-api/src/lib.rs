//! Request/response layer for the SecuritySpy web server API.
//!
//! This crate covers the one-shot operations a SecuritySpy client needs:
//! listing configured cameras, querying server information, fetching still
//! images, and reading or changing a camera's recording schedule. The
//! long-lived event stream lives in the companion `securityspy-stream`
//! crate, which uses the [`ServerConfig`] defined here to reach the server.
//!
//! # Quick start
//!
//! ```no_run
//! use securityspy_api::{SecuritySpyClient, ServerConfig};
//!
//! # async fn run() -> securityspy_api::Result<()> {
//! let config = ServerConfig::new("10.0.1.10", 8000, "viewer", "secret");
//! let client = SecuritySpyClient::new(config)?;
//!
//! for camera in client.list_cameras().await? {
//!     println!("camera {}: {} ({})", camera.number, camera.name, camera.recording_mode);
//! }
//! # Ok(())
//! # }
//! ```

mod camera;
mod client;
mod config;
mod error;

pub use camera::{ArmState, Camera, CameraModes, RecordingMode, ServerInfo, SystemInfo};
pub use client::{SecuritySpyClient, DEFAULT_TIMEOUT};
pub use config::ServerConfig;
pub use error::{ApiError, Result};
