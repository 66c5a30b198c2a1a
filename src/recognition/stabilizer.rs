//! Pose debouncing
//!
//! A classified pose only counts once it has been seen continuously for
//! longer than the hold duration, and each pose re-fires at most once per
//! cooldown window. Any frame without the pose restarts the hold timer.

use crate::config::{GestureConfig, SlotPolicy};
use crate::input::types::Handedness;
use crate::recognition::classifier::PoseTag;
use std::collections::HashMap;

/// Candidate tracking for one slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StabilizerState {
    pub candidate: Option<PoseTag>,
    /// When the current candidate was first seen (ms)
    pub since_ms: f64,
}

/// Which candidate slot a hand feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// All hands share one slot
    Shared,
    /// Per-hand slot keyed by detector label
    Label(Handedness),
    /// Per-hand slot for an unlabeled hand, keyed by frame position
    Index(usize),
}

/// Result of observing one hand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldOutcome {
    /// Pose held past the hold duration
    pub stable: Option<PoseTag>,
    /// Whether the cooldown allowed an event this frame
    pub fired: bool,
}

#[derive(Debug, Clone, Copy)]
struct CooldownEntry {
    cooldown_ms: f64,
    last_fired_ms: Option<f64>,
}

/// Last-fired timestamps for a fixed set of poses
#[derive(Debug, Clone)]
pub struct CooldownTable {
    entries: HashMap<PoseTag, CooldownEntry>,
}

impl CooldownTable {
    /// One entry per tag; the key set never changes afterwards
    pub fn new(config: &GestureConfig, tags: &[PoseTag]) -> Self {
        let entries = tags
            .iter()
            .map(|&pose| {
                (
                    pose,
                    CooldownEntry {
                        cooldown_ms: config.cooldown_ms(pose),
                        last_fired_ms: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Fire `pose` if its cooldown has elapsed, recording `now`.
    ///
    /// Asking for a pose outside the table is a wiring bug: it panics in
    /// debug builds and is logged and refused in release builds.
    pub fn try_fire(&mut self, pose: PoseTag, now_ms: f64) -> bool {
        debug_assert!(
            self.entries.contains_key(&pose),
            "pose {} missing from cooldown table",
            pose
        );
        let Some(entry) = self.entries.get_mut(&pose) else {
            tracing::error!("Pose {} missing from cooldown table, not firing", pose);
            return false;
        };

        let ready = match entry.last_fired_ms {
            Some(last) => now_ms - last > entry.cooldown_ms,
            None => true,
        };
        if ready {
            entry.last_fired_ms = Some(now_ms);
        }
        ready
    }

    pub fn last_fired(&self, pose: PoseTag) -> Option<f64> {
        self.entries.get(&pose).and_then(|e| e.last_fired_ms)
    }

    pub fn cooldown_ms(&self, pose: PoseTag) -> Option<f64> {
        self.entries.get(&pose).map(|e| e.cooldown_ms)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hold-then-cooldown state machine over one or more candidate slots
#[derive(Debug, Clone)]
pub struct PoseStabilizer {
    hold_ms: f64,
    policy: SlotPolicy,
    slots: HashMap<SlotKey, StabilizerState>,
    cooldowns: CooldownTable,
}

impl PoseStabilizer {
    pub fn new(config: &GestureConfig, cooldowns: CooldownTable) -> Self {
        Self {
            hold_ms: config.hold_ms,
            policy: config.slot_policy,
            slots: HashMap::new(),
            cooldowns,
        }
    }

    /// Slot a hand feeds under the configured policy
    pub fn slot_for(&self, frame_index: usize, label: Option<Handedness>) -> SlotKey {
        match (self.policy, label) {
            (SlotPolicy::Shared, _) => SlotKey::Shared,
            (SlotPolicy::PerHand, Some(label)) => SlotKey::Label(label),
            (SlotPolicy::PerHand, None) => SlotKey::Index(frame_index),
        }
    }

    /// Feed one hand's classification
    pub fn observe(&mut self, slot: SlotKey, pose: Option<PoseTag>, now_ms: f64) -> HoldOutcome {
        let state = self.slots.entry(slot).or_default();

        let Some(pose) = pose else {
            // No grace period: any gap restarts the hold
            *state = StabilizerState::default();
            return HoldOutcome::default();
        };

        if state.candidate != Some(pose) {
            tracing::debug!("Candidate pose {} on {:?} at {:.0}ms", pose, slot, now_ms);
            *state = StabilizerState {
                candidate: Some(pose),
                since_ms: now_ms,
            };
            return HoldOutcome::default();
        }

        if now_ms - state.since_ms <= self.hold_ms {
            return HoldOutcome::default();
        }

        let fired = self.cooldowns.try_fire(pose, now_ms);
        HoldOutcome {
            stable: Some(pose),
            fired,
        }
    }

    /// Drop slots not fed this frame; an absent hand cannot keep a hold alive
    pub fn end_frame(&mut self, seen: &[SlotKey]) {
        self.slots.retain(|slot, _| seen.contains(slot));
    }

    /// Return every slot to idle; cooldowns are kept
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    pub fn state(&self, slot: SlotKey) -> StabilizerState {
        self.slots.get(&slot).copied().unwrap_or_default()
    }

    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut CooldownTable {
        &mut self.cooldowns
    }
}
