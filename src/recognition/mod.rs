//! Discrete pose recognition
//!
//! Finger states feed a rule-based classifier; the stabilizer turns noisy
//! per-frame classifications into debounced, rate-limited firings.

pub mod classifier;
pub mod finger_state;
pub mod navigation;
pub mod stabilizer;

pub use classifier::{PoseClassifier, PoseTag, RuleSet};
pub use finger_state::{FingerEvaluator, FingerState};
pub use navigation::NavigationTracker;
pub use stabilizer::{CooldownTable, HoldOutcome, PoseStabilizer, SlotKey, StabilizerState};
