//! Per-digit curl detection
//!
//! Compares distances to the wrist instead of raw y coordinates, so the
//! result does not depend on how the hand is rotated or tilted in frame.

use crate::input::types::{
    Hand, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_MCP, THUMB_TIP,
};
use serde::{Deserialize, Serialize};

/// Extended (`true`) or curled (`false`) for each digit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    /// Number of extended digits
    pub fn extended_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|extended| **extended)
            .count()
    }

    /// Index, middle, ring and pinky all curled
    pub fn fingers_curled(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Evaluates finger states with a fixed curl tolerance
#[derive(Debug, Clone, Copy)]
pub struct FingerEvaluator {
    curl_tolerance: f64,
}

impl FingerEvaluator {
    pub fn new(curl_tolerance: f64) -> Self {
        Self { curl_tolerance }
    }

    pub fn evaluate(&self, hand: &Hand<'_>) -> FingerState {
        FingerState {
            thumb: !is_thumb_curled(hand),
            index: !self.is_finger_curled(hand, INDEX_TIP, INDEX_PIP),
            middle: !self.is_finger_curled(hand, MIDDLE_TIP, MIDDLE_PIP),
            ring: !self.is_finger_curled(hand, RING_TIP, RING_PIP),
            pinky: !self.is_finger_curled(hand, PINKY_TIP, PINKY_PIP),
        }
    }

    /// Curled when the tip is not meaningfully farther from the wrist than
    /// the PIP joint. Inclusive so collapsed (all-zero) landmarks read as curled.
    fn is_finger_curled(&self, hand: &Hand<'_>, tip: usize, pip: usize) -> bool {
        let wrist = hand.wrist();
        let tip_sq = hand.landmark(tip).planar_distance_sq(wrist);
        let pip_sq = hand.landmark(pip).planar_distance_sq(wrist);
        tip_sq <= pip_sq * self.curl_tolerance
    }
}

/// The thumb tucks diagonally across the palm rather than folding, so it is
/// curled when its tip sits at least as close to the pinky base as its own MCP.
fn is_thumb_curled(hand: &Hand<'_>) -> bool {
    let pinky_base = hand.landmark(PINKY_MCP);
    let tip = hand.landmark(THUMB_TIP).planar_distance(pinky_base);
    let base = hand.landmark(THUMB_MCP).planar_distance(pinky_base);
    tip <= base
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic hands shared by the recognition tests.
    //!
    //! Wrist at (0.5, 0.8), middle MCP 0.2 above it, fingers pointing up
    //! (decreasing y). Proportions keep the openness ratio near a real hand:
    //! fist ≈ 3.1, one finger ≈ 4.3, two fingers ≈ 5.5, open ≈ 8.5.

    use crate::input::types::*;

    pub const WRIST_POS: (f64, f64) = (0.5, 0.8);

    fn set(points: &mut [Landmark], index: usize, x: f64, y: f64) {
        points[index] = Landmark::new(x, y, 0.0);
    }

    /// Place a non-thumb finger as MCP, PIP, DIP, TIP at column `x`
    fn finger(points: &mut [Landmark], mcp: usize, x: f64, extended: bool) {
        set(points, mcp, x, 0.60);
        set(points, mcp + 1, x, 0.54);
        if extended {
            set(points, mcp + 2, x, 0.49);
            set(points, mcp + 3, x, 0.45);
        } else {
            // Folded back down toward the palm
            set(points, mcp + 2, x, 0.60);
            set(points, mcp + 3, x, 0.70);
        }
    }

    fn thumb(points: &mut [Landmark], extended: bool) {
        set(points, 1, 0.42, 0.74);
        set(points, THUMB_MCP, 0.38, 0.68);
        if extended {
            set(points, 3, 0.33, 0.64);
            set(points, THUMB_TIP, 0.30, 0.62);
        } else {
            // Tucked across the palm toward the pinky base
            set(points, 3, 0.46, 0.66);
            set(points, THUMB_TIP, 0.53, 0.68);
        }
    }

    /// Build a hand from extended flags in thumb-to-pinky order
    pub fn hand(extended: [bool; 5]) -> Vec<Landmark> {
        let mut points = vec![Landmark::default(); HAND_LANDMARK_COUNT];
        set(&mut points, WRIST, WRIST_POS.0, WRIST_POS.1);
        thumb(&mut points, extended[0]);
        finger(&mut points, 5, 0.44, extended[1]);
        finger(&mut points, MIDDLE_MCP, 0.50, extended[2]);
        finger(&mut points, 13, 0.56, extended[3]);
        finger(&mut points, PINKY_MCP, 0.62, extended[4]);
        points
    }

    /// Move the index and middle tips so their gap equals `spread`
    pub fn spread_tips(points: &mut [Landmark], spread: f64) {
        let mid = (points[INDEX_TIP].x + points[MIDDLE_TIP].x) / 2.0;
        points[INDEX_TIP].x = mid - spread / 2.0;
        points[MIDDLE_TIP].x = mid + spread / 2.0;
    }

    /// Shift every landmark by (dx, dy)
    pub fn translate(points: &mut [Landmark], dx: f64, dy: f64) {
        for p in points.iter_mut() {
            p.x += dx;
            p.y += dy;
        }
    }
}
