//! Stateless decoder for the event stream's line protocol.
//!
//! Each event line is space-delimited ASCII. Field 0 is a fixed-width
//! 14-digit timestamp (`YYYYMMDDHHMMSS`), field 2 the camera number (or
//! the literal `X` for server-wide events), field 3 the kind token, and
//! the remaining fields are kind-specific. Lines without the digit prefix
//! are not events at all; the stream interleaves them freely.

use crate::error::DecodeError;
use crate::types::{BoundingBox, CameraId, EventKind, TriggerReason};

/// What an event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// One camera
    Camera(CameraId),
    /// The whole server (the `X` sentinel); dropped before reconciliation
    Server,
}

/// Kind-specific payload of a decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    /// `MOTION`: motion detected inside the given box
    Motion {
        /// Where in the frame motion was seen
        bounds: BoundingBox,
    },
    /// `TRIGGER_M`: a motion capture started for the given reason
    TriggerMotion {
        /// Why the capture was triggered
        reason: TriggerReason,
    },
    /// `CLASSIFY`: the classifier scored the current subject
    Classify {
        /// Classification label, e.g. `Person`
        label: String,
        /// Confidence score, 0-100
        score: u8,
    },
    /// `FILE`: the motion-triggered recording was finalized
    FileFinalized,
}

impl EventDetail {
    /// The kind tag for this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetail::Motion { .. } => EventKind::Motion,
            EventDetail::TriggerMotion { .. } => EventKind::TriggerMotion,
            EventDetail::Classify { .. } => EventKind::Classify,
            EventDetail::FileFinalized => EventKind::FileFinalized,
        }
    }
}

/// One decoded unit of camera activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Raw timestamp field, `YYYYMMDDHHMMSS`
    pub timestamp: String,
    /// Camera the event applies to, or the server sentinel
    pub target: Target,
    /// Kind-specific payload
    pub detail: EventDetail,
}

/// Decode one line from the event stream.
///
/// Returns `Ok(None)` for lines that are not events: missing the 14-digit
/// timestamp prefix, or carrying a kind token this client does not
/// recognize. Returns an error only for lines that qualified as events but
/// whose fields failed to parse; callers discard those and keep streaming.
///
/// The decoder is pure: the same line always yields the same result.
pub fn decode_line(line: &str) -> Result<Option<Event>, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let bytes = line.as_bytes();
    if bytes.len() < 14 || !bytes[..14].iter().all(u8::is_ascii_digit) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() < 4 {
        return Err(DecodeError::TooFewFields {
            found: fields.len(),
        });
    }

    let target = match fields[2] {
        "X" => Target::Server,
        raw => {
            let number = raw
                .parse::<u32>()
                .map_err(|_| DecodeError::InvalidCameraId(raw.to_string()))?;
            Target::Camera(CameraId::new(number))
        }
    };

    let detail = match fields[3] {
        "MOTION" => {
            if fields.len() < 8 {
                return Err(DecodeError::TooFewFields {
                    found: fields.len(),
                });
            }
            EventDetail::Motion {
                bounds: BoundingBox {
                    x: parse_field("MOTION", "box_x", fields[4])?,
                    y: parse_field("MOTION", "box_y", fields[5])?,
                    width: parse_field("MOTION", "box_w", fields[6])?,
                    height: parse_field("MOTION", "box_h", fields[7])?,
                },
            }
        }
        "TRIGGER_M" => {
            if fields.len() < 5 {
                return Err(DecodeError::TooFewFields {
                    found: fields.len(),
                });
            }
            let code = parse_field("TRIGGER_M", "trigger_type", fields[4])?;
            EventDetail::TriggerMotion {
                reason: TriggerReason::from_code(code),
            }
        }
        "CLASSIFY" => {
            if fields.len() < 6 {
                return Err(DecodeError::TooFewFields {
                    found: fields.len(),
                });
            }
            let score: u8 = fields[5]
                .parse()
                .ok()
                .filter(|score| *score <= 100)
                .ok_or_else(|| DecodeError::InvalidField {
                    kind: "CLASSIFY",
                    field: "score",
                    value: fields[5].to_string(),
                })?;
            EventDetail::Classify {
                label: fields[4].to_string(),
                score,
            }
        }
        "FILE" => EventDetail::FileFinalized,
        other => {
            tracing::debug!(kind = other, "unrecognized event kind, line discarded");
            return Ok(None);
        }
    };

    Ok(Some(Event {
        timestamp: fields[0].to_string(),
        target,
        detail,
    }))
}

fn parse_field(kind: &'static str, field: &'static str, value: &str) -> Result<u32, DecodeError> {
    value.parse().map_err(|_| DecodeError::InvalidField {
        kind,
        field,
        value: value.to_string(),
    })
}
