//! Camera registry and state reconciliation.
//!
//! The registry owns the per-camera state map for one session. It is
//! seeded once from the camera-list call before streaming begins, and
//! mutated in place by [`CameraRegistry::apply`] as decoded events arrive.
//! Entries are never removed during a session's lifetime.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use crate::decoder::{Event, EventDetail, Target};
use crate::types::{CameraId, CameraState, Snapshot, TriggerReason};

/// Result of reconciling one event against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event was applied to this camera's state
    Updated(CameraId),
    /// Nothing changed: server-wide event or unknown camera
    NoOp,
}

/// The set of known cameras and their accumulated state.
#[derive(Debug, Default)]
pub struct CameraRegistry {
    cameras: BTreeMap<CameraId, CameraState>,
}

impl CameraRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from a camera list.
    ///
    /// Idempotent: re-applying the same list neither duplicates entries nor
    /// resets event state already accumulated for surviving ids. A camera
    /// id appearing twice in one list is last-write-wins and logged as a
    /// data-quality warning. Returns the number of newly created entries.
    pub fn seed<I>(&mut self, cameras: I) -> usize
    where
        I: IntoIterator<Item = (CameraId, String)>,
    {
        let mut seen = HashSet::new();
        let mut created = 0;

        for (id, name) in cameras {
            if !seen.insert(id) {
                tracing::warn!(camera = %id, "camera id listed twice in seed, keeping last entry");
            }
            match self.cameras.entry(id) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().name = name;
                }
                Entry::Vacant(entry) => {
                    entry.insert(CameraState::named(name));
                    created += 1;
                }
            }
        }

        tracing::debug!(
            total = self.cameras.len(),
            created,
            "camera registry seeded"
        );
        created
    }

    /// Apply one decoded event to the matching camera's state.
    ///
    /// Known camera: the event's carried fields are copied onto the state,
    /// and the timestamp and last-event-kind fields update unconditionally.
    /// Unknown camera: no mutation, except for the `FILE` terminal event,
    /// which may introduce a camera the seed list missed. Server-wide
    /// events are always a no-op.
    pub fn apply(&mut self, event: &Event) -> ReconcileOutcome {
        let id = match event.target {
            Target::Camera(id) => id,
            Target::Server => return ReconcileOutcome::NoOp,
        };

        let state = match self.cameras.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !matches!(event.detail, EventDetail::FileFinalized) {
                    return ReconcileOutcome::NoOp;
                }
                tracing::debug!(camera = %id, "file event for unseeded camera, creating entry");
                entry.insert(CameraState::default())
            }
        };

        state.last_timestamp = Some(event.timestamp.clone());
        state.last_event = Some(event.detail.kind());

        match &event.detail {
            EventDetail::Motion { bounds } => {
                state.bounds = *bounds;
                state.trigger_reason = TriggerReason::None;
                state.classify_label = None;
                state.classify_score = None;
            }
            EventDetail::TriggerMotion { reason } => {
                state.trigger_reason = *reason;
                state.motion_active = true;
            }
            EventDetail::Classify { label, score } => {
                state.classify_label = Some(label.clone());
                state.classify_score = Some(*score);
            }
            EventDetail::FileFinalized => {
                state.motion_active = false;
            }
        }

        ReconcileOutcome::Updated(id)
    }

    /// An immutable copy of the full per-camera mapping.
    pub fn snapshot(&self) -> Snapshot {
        self.cameras.clone()
    }

    /// State of one camera, if known.
    pub fn get(&self, id: CameraId) -> Option<&CameraState> {
        self.cameras.get(&id)
    }

    /// Number of known cameras.
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Whether the registry has been seeded with any cameras.
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// All known camera ids, in id order.
    pub fn camera_ids(&self) -> Vec<CameraId> {
        self.cameras.keys().copied().collect()
    }
}
