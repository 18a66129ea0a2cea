//! Core types for the securityspy-stream crate.

use std::collections::BTreeMap;

use serde::Serialize;

/// Unique identifier for a camera on one SecuritySpy server.
///
/// Camera numbers are stable for the lifetime of the physical camera
/// configuration. `Ord` so snapshots iterate in stable id order.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct CameraId(pub u32);

impl CameraId {
    /// Create a new camera id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw camera number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CameraId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Motion bounding box reported by `MOTION` events.
///
/// All-zero when no box applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Box width in pixels
    pub width: u32,
    /// Box height in pixels
    pub height: u32,
}

/// The event kinds carried by the stream protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// Motion was detected inside a camera's frame
    Motion,
    /// A motion-triggered capture started
    TriggerMotion,
    /// The classifier scored the current subject
    Classify,
    /// A motion-triggered recording was finalized to disk
    FileFinalized,
}

/// Why a motion capture was triggered.
///
/// SecuritySpy reports the reason as an integer code; the known codes map
/// to the names below, and codes outside the table are preserved as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TriggerReason {
    /// No trigger recorded
    #[default]
    None,
    /// Video motion detection (code 1)
    VideoMotion,
    /// Audio detection (code 2)
    Audio,
    /// AppleScript (code 4)
    AppleScript,
    /// Camera event (code 8)
    CameraEvent,
    /// Web server event (code 16)
    WebServer,
    /// Triggered by another camera (code 32)
    OtherCamera,
    /// Manual trigger (code 64)
    Manual,
    /// Human detected (code 128)
    Human,
    /// Vehicle detected (code 256)
    Vehicle,
    /// A code outside the fixed table, passed through unchanged
    Unknown(u32),
}

impl TriggerReason {
    /// Map a wire-format trigger code to its reason.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => TriggerReason::None,
            1 => TriggerReason::VideoMotion,
            2 => TriggerReason::Audio,
            4 => TriggerReason::AppleScript,
            8 => TriggerReason::CameraEvent,
            16 => TriggerReason::WebServer,
            32 => TriggerReason::OtherCamera,
            64 => TriggerReason::Manual,
            128 => TriggerReason::Human,
            256 => TriggerReason::Vehicle,
            other => TriggerReason::Unknown(other),
        }
    }

    /// The wire-format code for this reason.
    pub fn code(&self) -> u32 {
        match self {
            TriggerReason::None => 0,
            TriggerReason::VideoMotion => 1,
            TriggerReason::Audio => 2,
            TriggerReason::AppleScript => 4,
            TriggerReason::CameraEvent => 8,
            TriggerReason::WebServer => 16,
            TriggerReason::OtherCamera => 32,
            TriggerReason::Manual => 64,
            TriggerReason::Human => 128,
            TriggerReason::Vehicle => 256,
            TriggerReason::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::None => write!(f, "None"),
            TriggerReason::VideoMotion => write!(f, "Video motion detection"),
            TriggerReason::Audio => write!(f, "Audio detection"),
            TriggerReason::AppleScript => write!(f, "AppleScript"),
            TriggerReason::CameraEvent => write!(f, "Camera event"),
            TriggerReason::WebServer => write!(f, "Web server event"),
            TriggerReason::OtherCamera => write!(f, "Triggered by another camera"),
            TriggerReason::Manual => write!(f, "Manual trigger"),
            TriggerReason::Human => write!(f, "Human"),
            TriggerReason::Vehicle => write!(f, "Vehicle"),
            TriggerReason::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Per-camera state accumulated from the event stream.
///
/// The name is static, set when the registry is seeded; every other field
/// is mutated by reconciliation as events arrive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraState {
    /// Display name, from the camera-list seed
    pub name: String,
    /// Raw 14-character timestamp of the last event (`YYYYMMDDHHMMSS`)
    pub last_timestamp: Option<String>,
    /// Kind of the last event applied
    pub last_event: Option<EventKind>,
    /// Bounding box of the last motion event
    pub bounds: BoundingBox,
    /// Reason of the last motion trigger
    pub trigger_reason: TriggerReason,
    /// Label from the last classification, absent until one arrives
    pub classify_label: Option<String>,
    /// Score (0-100) from the last classification
    pub classify_score: Option<u8>,
    /// Whether a motion-triggered capture window is currently open.
    ///
    /// Best effort: set by `TRIGGER_M`, cleared by the `FILE` terminal
    /// event, with no guarantee on how long a window stays open.
    pub motion_active: bool,
}

impl CameraState {
    /// A fresh state for a named camera with all mutable fields zeroed.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The full per-camera state mapping delivered to consumers.
///
/// Each notification carries its own copy; consumers never observe the
/// live registry mid-update.
pub type Snapshot = BTreeMap<CameraId, CameraState>;
