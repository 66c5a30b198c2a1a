use serde::{Deserialize, Serialize};

/// Number of landmarks the detector reports per hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Fingertips in thumb-to-pinky order
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// A single tracked point in normalized image space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Landmark {
    /// 0-1 normalized to image width
    pub x: f64,
    /// 0-1 normalized to image height (grows downward)
    pub y: f64,
    /// Relative depth
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance in the image plane
    pub fn planar_distance_sq(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        self.planar_distance_sq(other).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Handedness label reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// One detection tick: zero or more hands plus optional parallel labels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Frame {
    pub hands: Vec<Vec<Landmark>>,
    pub handedness: Vec<Handedness>,
}

impl Frame {
    /// A frame with no hands in view
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hands(hands: Vec<Vec<Landmark>>) -> Self {
        Self {
            hands,
            handedness: Vec::new(),
        }
    }

    pub fn with_labeled_hands(hands: Vec<(Vec<Landmark>, Handedness)>) -> Self {
        let (hands, handedness) = hands.into_iter().unzip();
        Self { hands, handedness }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Label for the hand at `index`, if the detector supplied one
    pub fn handedness_of(&self, index: usize) -> Option<Handedness> {
        self.handedness.get(index).copied()
    }

    /// Hands that pass validation, paired with their frame index and label.
    /// Malformed hands are skipped rather than reported.
    pub fn valid_hands(&self) -> impl Iterator<Item = (usize, Hand<'_>, Option<Handedness>)> + '_ {
        self.hands.iter().enumerate().filter_map(move |(i, points)| {
            Hand::new(points).map(|hand| (i, hand, self.handedness_of(i)))
        })
    }
}

/// Borrowed view over exactly 21 finite landmarks.
#[derive(Debug, Clone, Copy)]
pub struct Hand<'a> {
    points: &'a [Landmark; HAND_LANDMARK_COUNT],
}

impl<'a> Hand<'a> {
    /// Returns `None` for fewer than 21 points or any non-finite coordinate.
    /// Points past the 21st are ignored.
    pub fn new(points: &'a [Landmark]) -> Option<Self> {
        let points: &[Landmark; HAND_LANDMARK_COUNT] =
            points.get(..HAND_LANDMARK_COUNT)?.try_into().ok()?;
        if !points.iter().all(Landmark::is_finite) {
            return None;
        }
        Some(Self { points })
    }

    pub fn landmark(&self, index: usize) -> &'a Landmark {
        &self.points[index]
    }

    pub fn wrist(&self) -> &'a Landmark {
        &self.points[WRIST]
    }

    /// Middle-finger MCP, the hand-center proxy
    pub fn center(&self) -> &'a Landmark {
        &self.points[MIDDLE_MCP]
    }

    pub fn points(&self) -> &'a [Landmark; HAND_LANDMARK_COUNT] {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hand_is_invalid() {
        let points = vec![Landmark::default(); 20];
        assert!(Hand::new(&points).is_none());
    }

    #[test]
    fn test_extra_points_are_ignored() {
        let mut points = vec![Landmark::default(); 22];
        points[21] = Landmark::new(f64::NAN, 0.0, 0.0);
        assert!(Hand::new(&points).is_some());
    }

    #[test]
    fn test_non_finite_hand_is_invalid() {
        let mut points = vec![Landmark::default(); 21];
        points[MIDDLE_MCP].x = f64::INFINITY;
        assert!(Hand::new(&points).is_none());
    }

    #[test]
    fn test_valid_hands_skips_malformed() {
        let frame = Frame::with_labeled_hands(vec![
            (vec![Landmark::default(); 5], Handedness::Left),
            (vec![Landmark::default(); 21], Handedness::Right),
        ]);
        let valid: Vec<_> = frame.valid_hands().collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].0, 1);
        assert_eq!(valid[0].2, Some(Handedness::Right));
    }

    #[test]
    fn test_frame_json_tolerates_missing_fields() {
        let json = r#"{"hands": [[{"x": 0.5}]]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.hands[0][0], Landmark::new(0.5, 0.0, 0.0));
        assert!(frame.handedness.is_empty());
        assert_eq!(frame.handedness_of(0), None);
    }

    #[test]
    fn test_handedness_labels_parse() {
        let json = r#"{"hands": [], "handedness": ["Left", "Right"]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.handedness, vec![Handedness::Left, Handedness::Right]);
        assert!(frame.is_empty());
    }
}
