//! Landmark input (frames, hands, providers)
//!
//! Frame and hand types as delivered by the external detector, plus the
//! `HandTracker` lifecycle used to feed them into a controller.

pub mod tracker;
pub mod types;

pub use tracker::{FrameRecorder, HandTracker, RecordedFrame, ReplayTracker, TrackerError, TrackerResult};
pub use types::{Frame, Hand, Handedness, Landmark, HAND_LANDMARK_COUNT};
