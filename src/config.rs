//! Controller configuration
//!
//! Every tuning knob of the recognition pipeline lives here. The values are
//! empirically tuned for a webcam at arm's length; none of them are derived.
//! Configuration is trusted, one-time setup, so `validate` rejects misuse
//! instead of degrading like per-frame data does.

use crate::recognition::classifier::{PoseTag, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Minimum hold before a pose counts as intentional
pub const DEFAULT_HOLD_MS: f64 = 200.0;

/// Cooldown between repeated firings of a mode-switch pose
pub const DEFAULT_POSE_COOLDOWN_MS: f64 = 500.0;

/// Cooldown between navigation firings, short enough for continuous scrolling
pub const DEFAULT_NAVIGATION_COOLDOWN_MS: f64 = 300.0;

/// Squared-distance factor for the curl test (≈1.22x linear)
pub const DEFAULT_CURL_TOLERANCE: f64 = 1.5;

/// Accepted curl tolerance range
pub const CURL_TOLERANCE_RANGE: (f64, f64) = (1.0, 1.5);

/// Minimum index/middle tip gap for victory (normalized units)
pub const DEFAULT_VICTORY_MIN_SPREAD: f64 = 0.08;

/// Maximum index/middle tip gap for restore (normalized units)
pub const DEFAULT_RESTORE_MAX_SPREAD: f64 = 0.04;

/// Openness ratio below which the scale signal stays at zero.
/// Fist ≈ 3.0, one finger ≈ 4.2, two fingers ≈ 5.4, open hand ≈ 9.0.
pub const DEFAULT_OPENNESS_DEADZONE: f64 = 5.8;

/// Pinch changes at or below this distance are treated as jitter
pub const DEFAULT_PINCH_JITTER: f64 = 0.01;

/// EMA weight of the newest sample
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// EMA weight for the heavier smoothing profile
pub const HEAVY_SMOOTHING_ALPHA: f64 = 0.2;

/// Rotation units per normalized unit of horizontal hand motion
pub const DEFAULT_ROTATION_SENSITIVITY: f64 = 5.0;

/// Vertical travel (fraction of frame height) that triggers navigation
pub const DEFAULT_NAVIGATION_THRESHOLD: f64 = 0.1;

/// Errors raised for invalid configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Curl tolerance {0} outside [1.0, 1.5]")]
    CurlToleranceOutOfRange(f64),

    #[error("Smoothing alpha {0} outside (0, 1]")]
    InvalidSmoothingAlpha(f64),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Pose vocabulary is empty")]
    EmptyVocabulary,

    #[error("Pose {0} listed twice in vocabulary")]
    DuplicatePose(PoseTag),

    #[error("Pose {0} is derived and cannot be a classifier rule")]
    DerivedPoseInVocabulary(PoseTag),

    #[error("Cooldown override for {0}, which the vocabulary never emits")]
    UnknownCooldownPose(PoseTag),

    #[error("Restore spread {restore} overlaps victory spread {victory}")]
    OverlappingSpread { restore: f64, victory: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which pose rule set the classifier runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    /// l_shape, one_finger, two_fingers
    Numbered,
    /// fist, restore, victory
    Themes,
    /// Any ordered list of classifier poses, first match wins
    Custom(Vec<PoseTag>),
}

/// How the pinch method reports scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinchMode {
    /// Smoothed thumb-index distance
    Absolute,
    /// Smoothed distance over the distance captured when the hand appeared
    Relative,
}

/// Continuous scale strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum ScaleMethod {
    /// Hand-size-normalized fingertip extension with a deadzone
    Openness { deadzone: f64 },
    /// Thumb-tip to index-tip distance
    Pinch { mode: PinchMode, jitter: f64 },
}

impl Default for ScaleMethod {
    fn default() -> Self {
        Self::Openness {
            deadzone: DEFAULT_OPENNESS_DEADZONE,
        }
    }
}

/// How a stable l_shape becomes photo_next / photo_prev
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum NavigationMode {
    /// Vertical travel of the hand center since the pose stabilized
    Motion { threshold: f64 },
    /// Left hand → next, right hand → prev
    Handedness,
}

impl Default for NavigationMode {
    fn default() -> Self {
        Self::Motion {
            threshold: DEFAULT_NAVIGATION_THRESHOLD,
        }
    }
}

/// How candidate poses are tracked when several hands are in view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// One candidate slot for all hands; the last hand processed wins
    #[default]
    Shared,
    /// One slot per handedness label (frame index when unlabeled)
    PerHand,
}

/// Recognition pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureConfig {
    pub hold_ms: f64,
    pub pose_cooldown_ms: f64,
    pub navigation_cooldown_ms: f64,
    /// Per-pose cooldowns replacing the two defaults above
    pub cooldown_overrides: BTreeMap<PoseTag, f64>,
    pub curl_tolerance: f64,
    pub vocabulary: Vocabulary,
    pub victory_min_spread: f64,
    pub restore_max_spread: f64,
    pub scale_method: ScaleMethod,
    pub smoothing_alpha: f64,
    pub rotation_sensitivity: f64,
    pub navigation: NavigationMode,
    pub slot_policy: SlotPolicy,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            hold_ms: DEFAULT_HOLD_MS,
            pose_cooldown_ms: DEFAULT_POSE_COOLDOWN_MS,
            navigation_cooldown_ms: DEFAULT_NAVIGATION_COOLDOWN_MS,
            cooldown_overrides: BTreeMap::new(),
            curl_tolerance: DEFAULT_CURL_TOLERANCE,
            vocabulary: Vocabulary::Numbered,
            victory_min_spread: DEFAULT_VICTORY_MIN_SPREAD,
            restore_max_spread: DEFAULT_RESTORE_MAX_SPREAD,
            scale_method: ScaleMethod::default(),
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            rotation_sensitivity: DEFAULT_ROTATION_SENSITIVITY,
            navigation: NavigationMode::default(),
            slot_policy: SlotPolicy::default(),
        }
    }
}

impl GestureConfig {
    /// Fist/victory/restore profile with heavier scale smoothing
    pub fn themes() -> Self {
        Self {
            vocabulary: Vocabulary::Themes,
            smoothing_alpha: HEAVY_SMOOTHING_ALPHA,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&content)?;
        tracing::info!("Loaded gesture config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Build the classifier rule set named by `vocabulary`
    pub fn rule_set(&self) -> ConfigResult<RuleSet> {
        match &self.vocabulary {
            Vocabulary::Numbered => Ok(RuleSet::numbered()),
            Vocabulary::Themes => Ok(RuleSet::themes()),
            Vocabulary::Custom(poses) => RuleSet::custom(poses.clone()),
        }
    }

    /// Cooldown for `pose`, honoring overrides
    pub fn cooldown_ms(&self, pose: PoseTag) -> f64 {
        if let Some(ms) = self.cooldown_overrides.get(&pose) {
            return *ms;
        }
        if pose.is_navigation() {
            self.navigation_cooldown_ms
        } else {
            self.pose_cooldown_ms
        }
    }

    /// Check every field; returns the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        let (min_k, max_k) = CURL_TOLERANCE_RANGE;
        if !(min_k..=max_k).contains(&self.curl_tolerance) {
            return Err(ConfigError::CurlToleranceOutOfRange(self.curl_tolerance));
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(ConfigError::InvalidSmoothingAlpha(self.smoothing_alpha));
        }

        non_negative("holdMs", self.hold_ms)?;
        non_negative("poseCooldownMs", self.pose_cooldown_ms)?;
        non_negative("navigationCooldownMs", self.navigation_cooldown_ms)?;
        non_negative("victoryMinSpread", self.victory_min_spread)?;
        non_negative("restoreMaxSpread", self.restore_max_spread)?;
        if !self.rotation_sensitivity.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "rotationSensitivity",
                value: self.rotation_sensitivity,
            });
        }

        match self.scale_method {
            ScaleMethod::Openness { deadzone } => non_negative("deadzone", deadzone)?,
            ScaleMethod::Pinch { jitter, .. } => non_negative("jitter", jitter)?,
        }
        if let NavigationMode::Motion { threshold } = self.navigation {
            if !(threshold > 0.0 && threshold.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: "navigation.threshold",
                    value: threshold,
                });
            }
        }

        let rules = self.rule_set()?;
        if rules.contains(PoseTag::Restore)
            && rules.contains(PoseTag::Victory)
            && self.restore_max_spread >= self.victory_min_spread
        {
            return Err(ConfigError::OverlappingSpread {
                restore: self.restore_max_spread,
                victory: self.victory_min_spread,
            });
        }

        let emitted = rules.emitted_tags();
        for (pose, ms) in &self.cooldown_overrides {
            if !emitted.contains(pose) {
                return Err(ConfigError::UnknownCooldownPose(*pose));
            }
            non_negative("cooldownOverrides", *ms)?;
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
