//! Pose classification from finger states
//!
//! A pose vocabulary is an ordered `RuleSet`; the first rule whose
//! finger-state pattern and geometric checks hold wins. Classification is
//! pure: the same hand always maps to the same pose.

use crate::config::{ConfigError, ConfigResult, GestureConfig};
use crate::input::types::{Hand, Landmark, INDEX_TIP, MIDDLE_TIP};
use crate::recognition::finger_state::{FingerEvaluator, FingerState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete pose and gesture names carried by `gesture` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseTag {
    /// Index only
    OneFinger,
    /// Index and middle, thumb ignored
    TwoFingers,
    /// Index and thumb; enters navigation mode
    LShape,
    /// Four fingers curled
    Fist,
    /// Index and middle spread apart, thumb tucked
    Victory,
    /// Index and middle pressed together
    Restore,
    /// Navigation derived from a stable l_shape
    PhotoNext,
    /// Navigation derived from a stable l_shape
    PhotoPrev,
}

impl PoseTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneFinger => "one_finger",
            Self::TwoFingers => "two_fingers",
            Self::LShape => "l_shape",
            Self::Fist => "fist",
            Self::Victory => "victory",
            Self::Restore => "restore",
            Self::PhotoNext => "photo_next",
            Self::PhotoPrev => "photo_prev",
        }
    }

    /// Derived tags come from the navigation stage, never from a rule
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::PhotoNext | Self::PhotoPrev)
    }
}

impl fmt::Display for PoseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered pose vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    poses: Vec<PoseTag>,
}

impl RuleSet {
    /// l_shape, one_finger, two_fingers
    pub fn numbered() -> Self {
        Self {
            poses: vec![PoseTag::LShape, PoseTag::OneFinger, PoseTag::TwoFingers],
        }
    }

    /// fist, restore, victory; restore is the narrower two-finger check so it goes first
    pub fn themes() -> Self {
        Self {
            poses: vec![PoseTag::Fist, PoseTag::Restore, PoseTag::Victory],
        }
    }

    /// Caller-ordered vocabulary
    pub fn custom(poses: Vec<PoseTag>) -> ConfigResult<Self> {
        if poses.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        for (i, pose) in poses.iter().enumerate() {
            if pose.is_navigation() {
                return Err(ConfigError::DerivedPoseInVocabulary(*pose));
            }
            if poses[..i].contains(pose) {
                return Err(ConfigError::DuplicatePose(*pose));
            }
        }
        Ok(Self { poses })
    }

    pub fn poses(&self) -> &[PoseTag] {
        &self.poses
    }

    pub fn contains(&self, pose: PoseTag) -> bool {
        self.poses.contains(&pose)
    }

    /// Every tag a controller running this vocabulary can emit
    pub fn emitted_tags(&self) -> Vec<PoseTag> {
        let mut tags = self.poses.clone();
        if self.contains(PoseTag::LShape) {
            tags.push(PoseTag::PhotoNext);
            tags.push(PoseTag::PhotoPrev);
        }
        tags
    }
}

/// Finger-state evaluation plus the active rule set
#[derive(Debug, Clone)]
pub struct PoseClassifier {
    fingers: FingerEvaluator,
    rules: RuleSet,
    victory_min_spread: f64,
    restore_max_spread: f64,
}

impl PoseClassifier {
    pub fn new(config: &GestureConfig) -> ConfigResult<Self> {
        Ok(Self {
            fingers: FingerEvaluator::new(config.curl_tolerance),
            rules: config.rule_set()?,
            victory_min_spread: config.victory_min_spread,
            restore_max_spread: config.restore_max_spread,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify a raw landmark sequence; malformed hands yield `None`
    pub fn classify_points(&self, points: &[Landmark]) -> Option<PoseTag> {
        Hand::new(points).and_then(|hand| self.classify(&hand))
    }

    pub fn classify(&self, hand: &Hand<'_>) -> Option<PoseTag> {
        let state = self.fingers.evaluate(hand);
        self.classify_state(&state, hand)
    }

    /// First matching rule for already-evaluated finger states
    pub fn classify_state(&self, state: &FingerState, hand: &Hand<'_>) -> Option<PoseTag> {
        self.rules
            .poses()
            .iter()
            .copied()
            .find(|pose| self.matches(*pose, state, hand))
    }

    fn matches(&self, pose: PoseTag, s: &FingerState, hand: &Hand<'_>) -> bool {
        let index_and_middle_only = s.index && s.middle && !s.ring && !s.pinky;
        match pose {
            PoseTag::LShape => s.index && s.thumb && !s.middle && !s.ring && !s.pinky,
            PoseTag::OneFinger => s.index && !s.thumb && !s.middle && !s.ring && !s.pinky,
            PoseTag::TwoFingers => index_and_middle_only,
            PoseTag::Fist => s.fingers_curled(),
            PoseTag::Victory => {
                index_and_middle_only && !s.thumb && tip_spread(hand) >= self.victory_min_spread
            }
            PoseTag::Restore => index_and_middle_only && tip_spread(hand) <= self.restore_max_spread,
            PoseTag::PhotoNext | PoseTag::PhotoPrev => false,
        }
    }
}

/// Gap between the index and middle fingertips
fn tip_spread(hand: &Hand<'_>) -> f64 {
    hand.landmark(INDEX_TIP).planar_distance(hand.landmark(MIDDLE_TIP))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::HAND_LANDMARK_COUNT;
    use crate::recognition::finger_state::fixtures::{hand, spread_tips};

    fn numbered() -> PoseClassifier {
        PoseClassifier::new(&GestureConfig::default()).unwrap()
    }

    fn themes() -> PoseClassifier {
        PoseClassifier::new(&GestureConfig::themes()).unwrap()
    }

    #[test]
    fn test_numbered_vocabulary() {
        let c = numbered();
        assert_eq!(
            c.classify_points(&hand([true, true, false, false, false])),
            Some(PoseTag::LShape)
        );
        assert_eq!(
            c.classify_points(&hand([false, true, false, false, false])),
            Some(PoseTag::OneFinger)
        );
        assert_eq!(
            c.classify_points(&hand([false, true, true, false, false])),
            Some(PoseTag::TwoFingers)
        );
        // Thumb state is irrelevant for two fingers
        assert_eq!(
            c.classify_points(&hand([true, true, true, false, false])),
            Some(PoseTag::TwoFingers)
        );
        assert_eq!(c.classify_points(&hand([true; 5])), None);
        assert_eq!(c.classify_points(&hand([false; 5])), None);
    }

    #[test]
    fn test_themes_vocabulary() {
        let c = themes();
        assert_eq!(c.classify_points(&hand([false; 5])), Some(PoseTag::Fist));
        // Thumb out still counts as a fist
        assert_eq!(
            c.classify_points(&hand([true, false, false, false, false])),
            Some(PoseTag::Fist)
        );

        let mut pressed = hand([false, true, true, false, false]);
        spread_tips(&mut pressed, 0.02);
        assert_eq!(c.classify_points(&pressed), Some(PoseTag::Restore));

        let mut spread = hand([false, true, true, false, false]);
        spread_tips(&mut spread, 0.12);
        assert_eq!(c.classify_points(&spread), Some(PoseTag::Victory));

        // Victory needs the thumb tucked
        let mut thumb_out = hand([true, true, true, false, false]);
        spread_tips(&mut thumb_out, 0.12);
        assert_eq!(c.classify_points(&thumb_out), None);

        // Between the two thresholds neither fires
        let mut ambiguous = hand([false, true, true, false, false]);
        spread_tips(&mut ambiguous, 0.06);
        assert_eq!(c.classify_points(&ambiguous), None);
    }

    #[test]
    fn test_fully_curled_hand_is_fist() {
        // Every tip sits closer to the wrist than its PIP
        assert_eq!(themes().classify_points(&hand([false; 5])), Some(PoseTag::Fist));
        let zeros = vec![Landmark::default(); HAND_LANDMARK_COUNT];
        assert_eq!(themes().classify_points(&zeros), Some(PoseTag::Fist));
    }

    #[test]
    fn test_priority_order_decides_overlap() {
        // two_fingers shadows restore when listed first
        let config = GestureConfig {
            vocabulary: crate::config::Vocabulary::Custom(vec![
                PoseTag::TwoFingers,
                PoseTag::Restore,
            ]),
            ..GestureConfig::default()
        };
        let c = PoseClassifier::new(&config).unwrap();
        let mut pressed = hand([false, true, true, false, false]);
        spread_tips(&mut pressed, 0.01);
        assert_eq!(c.classify_points(&pressed), Some(PoseTag::TwoFingers));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = numbered();
        let points = hand([false, true, false, false, false]);
        let first = c.classify_points(&points);
        let second = c.classify_points(&points);
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_hand_yields_none() {
        let points = hand([false, true, false, false, false]);
        assert_eq!(numbered().classify_points(&points[..20]), None);
        assert_eq!(themes().classify_points(&[]), None);
    }

    #[test]
    fn test_custom_rule_set_validation() {
        assert!(matches!(
            RuleSet::custom(vec![]),
            Err(ConfigError::EmptyVocabulary)
        ));
        assert!(matches!(
            RuleSet::custom(vec![PoseTag::Fist, PoseTag::Fist]),
            Err(ConfigError::DuplicatePose(PoseTag::Fist))
        ));
        assert!(matches!(
            RuleSet::custom(vec![PoseTag::PhotoNext]),
            Err(ConfigError::DerivedPoseInVocabulary(PoseTag::PhotoNext))
        ));
    }

    #[test]
    fn test_emitted_tags_include_navigation_only_with_l_shape() {
        let numbered = RuleSet::numbered().emitted_tags();
        assert!(numbered.contains(&PoseTag::PhotoNext));
        assert!(numbered.contains(&PoseTag::PhotoPrev));

        let themes = RuleSet::themes().emitted_tags();
        assert!(!themes.contains(&PoseTag::PhotoNext));
        assert_eq!(themes.len(), 3);
    }

    #[test]
    fn test_pose_tag_strings() {
        assert_eq!(PoseTag::OneFinger.as_str(), "one_finger");
        assert_eq!(PoseTag::LShape.to_string(), "l_shape");
        assert_eq!(
            serde_json::to_string(&PoseTag::PhotoPrev).unwrap(),
            "\"photo_prev\""
        );
    }
}
