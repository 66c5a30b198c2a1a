//! Photo navigation from a held l_shape
//!
//! Motion mode anchors the mean hand-center height when l_shape becomes the
//! frame's stable pose and fires once the hand travels past the threshold,
//! re-anchoring after every firing. Handedness mode maps the hand holding
//! the pose straight to a direction.

use crate::config::NavigationMode;
use crate::input::types::Handedness;
use crate::recognition::classifier::PoseTag;
use crate::recognition::stabilizer::CooldownTable;

#[derive(Debug, Clone)]
pub struct NavigationTracker {
    mode: NavigationMode,
    anchor_y: Option<f64>,
}

impl NavigationTracker {
    pub fn new(mode: NavigationMode) -> Self {
        Self {
            mode,
            anchor_y: None,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn anchor_y(&self) -> Option<f64> {
        self.anchor_y
    }

    /// Motion mode, once per frame.
    ///
    /// `active` is whether l_shape is the frame's stable pose and `center_y`
    /// the mean middle-MCP height over the frame's hands. Image y grows
    /// downward, so moving down is photo_next.
    pub fn track_motion(
        &mut self,
        active: bool,
        center_y: f64,
        now_ms: f64,
        cooldowns: &mut CooldownTable,
    ) -> Option<PoseTag> {
        let NavigationMode::Motion { threshold } = self.mode else {
            return None;
        };
        if !active {
            self.anchor_y = None;
            return None;
        }

        let Some(anchor) = self.anchor_y else {
            tracing::debug!("Navigation anchored at y={:.3}", center_y);
            self.anchor_y = Some(center_y);
            return None;
        };

        let dy = center_y - anchor;
        if dy.abs() <= threshold {
            return None;
        }

        let direction = if dy > 0.0 {
            PoseTag::PhotoNext
        } else {
            PoseTag::PhotoPrev
        };
        if !cooldowns.try_fire(direction, now_ms) {
            return None;
        }
        self.anchor_y = Some(center_y);
        Some(direction)
    }

    /// Handedness mode, for a hand whose l_shape just stabilized
    pub fn fire_for_hand(
        &self,
        label: Option<Handedness>,
        now_ms: f64,
        cooldowns: &mut CooldownTable,
    ) -> Option<PoseTag> {
        if self.mode != NavigationMode::Handedness {
            return None;
        }
        let direction = match label? {
            Handedness::Left => PoseTag::PhotoNext,
            Handedness::Right => PoseTag::PhotoPrev,
        };
        cooldowns.try_fire(direction, now_ms).then_some(direction)
    }

    pub fn reset(&mut self) {
        self.anchor_y = None;
    }
}
