//! Continuous rotation and scale signals
//!
//! Runs independently of pose stabilization: every frame with a hand in
//! view yields a rotation delta, and a scale value when the active scale
//! method has something to report. A frame without hands clears all
//! tracking so nothing stale leaks across a gap.

use crate::config::{GestureConfig, PinchMode, ScaleMethod};
use crate::input::types::{Frame, Hand, FINGERTIPS, INDEX_TIP, THUMB_TIP};
use crate::processing::smoothing::ExponentialSmoother;
use serde::{Deserialize, Serialize};

/// Floor for hand-size normalization
pub const MIN_HAND_SIZE: f64 = 0.001;

/// Smallest pinch gap accepted as a relative-scale reference. A grab that
/// starts with the fingers closed anchors once they open past this.
pub const MIN_PINCH_REFERENCE: f64 = 0.02;

/// Per-frame output of the controller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSignal {
    /// Rotation delta; 0 when there is no motion or no hand
    pub rotation: f64,
    /// `None` means "no update", not zero; hold the previous scale
    pub scale: Option<f64>,
}

/// Rotation and scale estimation state
#[derive(Debug, Clone)]
pub struct SignalEstimator {
    rotation_sensitivity: f64,
    scale_method: ScaleMethod,
    last_center_x: Option<f64>,
    scale: ExponentialSmoother,
    /// Pinch distance captured when the hand came into view
    pinch_reference: Option<f64>,
}

impl SignalEstimator {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            rotation_sensitivity: config.rotation_sensitivity,
            scale_method: config.scale_method,
            last_center_x: None,
            scale: ExponentialSmoother::new(config.smoothing_alpha),
            pinch_reference: None,
        }
    }

    /// Consume one frame
    pub fn update(&mut self, frame: &Frame) -> ControlSignal {
        let hands: Vec<Hand<'_>> = frame.valid_hands().map(|(_, hand, _)| hand).collect();
        let Some(first) = hands.first() else {
            self.reset();
            return ControlSignal::default();
        };

        let mean_x = hands.iter().map(|h| h.center().x).sum::<f64>() / hands.len() as f64;
        let rotation = match self.last_center_x {
            Some(prev) => (mean_x - prev) * self.rotation_sensitivity,
            None => 0.0,
        };
        self.last_center_x = Some(mean_x);

        let scale = match self.scale_method {
            ScaleMethod::Openness { deadzone } => Some(self.openness_scale(first, deadzone)),
            ScaleMethod::Pinch { mode, jitter } => self.pinch_scale(first, mode, jitter),
        };

        ControlSignal { rotation, scale }
    }

    /// Forget the rotation baseline, smoothing history and pinch anchor
    pub fn reset(&mut self) {
        if self.last_center_x.is_some() {
            tracing::debug!("Hands lost, clearing continuous tracking");
        }
        self.last_center_x = None;
        self.scale.reset();
        self.pinch_reference = None;
    }

    pub fn last_center_x(&self) -> Option<f64> {
        self.last_center_x
    }

    pub fn smoothed_scale(&self) -> Option<f64> {
        self.scale.value()
    }

    fn openness_scale(&mut self, hand: &Hand<'_>, deadzone: f64) -> f64 {
        let raw = (openness_ratio(hand) - deadzone).max(0.0);
        self.scale.step(raw)
    }

    fn pinch_scale(&mut self, hand: &Hand<'_>, mode: PinchMode, jitter: f64) -> Option<f64> {
        let distance = pinch_distance(hand);
        let smoothed = self.scale.step(distance);
        match mode {
            PinchMode::Absolute => Some(smoothed),
            PinchMode::Relative => {
                let Some(reference) = self.pinch_reference else {
                    if smoothed >= MIN_PINCH_REFERENCE {
                        tracing::debug!("Pinch reference anchored at {:.4}", smoothed);
                        self.pinch_reference = Some(smoothed);
                    }
                    return None;
                };
                if (smoothed - reference).abs() > jitter {
                    Some(smoothed / reference)
                } else {
                    None
                }
            }
        }
    }
}

/// Sum of wrist-to-fingertip distances over the wrist-to-middle-MCP length.
/// Fist ≈ 3, fully open ≈ 9.
pub fn openness_ratio(hand: &Hand<'_>) -> f64 {
    let wrist = hand.wrist();
    let hand_size = wrist.planar_distance(hand.center()).max(MIN_HAND_SIZE);
    let total: f64 = FINGERTIPS
        .iter()
        .map(|&tip| hand.landmark(tip).planar_distance(wrist))
        .sum();
    total / hand_size
}

/// Thumb tip to index tip
pub fn pinch_distance(hand: &Hand<'_>) -> f64 {
    hand.landmark(THUMB_TIP).planar_distance(hand.landmark(INDEX_TIP))
}
