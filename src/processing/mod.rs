//! Continuous control signals
//!
//! Rotation delta from hand-center motion and a smoothed scale signal,
//! computed every frame independently of discrete pose recognition.

pub mod signals;
pub mod smoothing;

pub use signals::{openness_ratio, pinch_distance, ControlSignal, SignalEstimator};
pub use smoothing::ExponentialSmoother;
