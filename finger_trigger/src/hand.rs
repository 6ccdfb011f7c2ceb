//! Key identity: which hand, which finger.
//!
//! Keys are a closed product type so the engine can store its per-finger
//! state in a plain array indexed by [`FingerKey::index`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// Handedness as reported by the hand tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    /// The tracker's label for this hand.
    pub fn label(self) -> &'static str {
        match self {
            Hand::Left  => "Left",
            Hand::Right => "Right",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A handedness label that is neither "Left" nor "Right".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised handedness label {0:?}")]
pub struct ParseHandError(pub String);

impl FromStr for Hand {
    type Err = ParseHandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("left") {
            Ok(Hand::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Hand::Right)
        } else {
            Err(ParseHandError(s.to_string()))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerId
// ════════════════════════════════════════════════════════════════════════════

/// One of the five tracked fingertips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerId {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerId {
    /// Thumb → pinky, the order fingertips are fed to the engine.
    pub const ALL: [FingerId; 5] = [
        FingerId::Thumb,
        FingerId::Index,
        FingerId::Middle,
        FingerId::Ring,
        FingerId::Pinky,
    ];

    /// Landmark index of this fingertip in a 21-point hand skeleton.
    pub fn tip_landmark(self) -> usize {
        match self {
            FingerId::Thumb  => 4,
            FingerId::Index  => 8,
            FingerId::Middle => 12,
            FingerId::Ring   => 16,
            FingerId::Pinky  => 20,
        }
    }

    /// Map the numeric selector keys `1`–`5` to a finger (1 = thumb).
    pub fn from_selector(n: u8) -> Option<FingerId> {
        match n {
            1..=5 => Some(FingerId::ALL[(n - 1) as usize]),
            _     => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FingerId::Thumb  => "Thumb",
            FingerId::Index  => "Index",
            FingerId::Middle => "Middle",
            FingerId::Ring   => "Ring",
            FingerId::Pinky  => "Pinky",
        }
    }
}

impl fmt::Display for FingerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerKey
// ════════════════════════════════════════════════════════════════════════════

/// Identity of one tracked fingertip slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerKey {
    pub hand:   Hand,
    pub finger: FingerId,
}

impl FingerKey {
    /// Number of slots: 2 hands × 5 fingers.
    pub const COUNT: usize = 10;

    /// Every key, left hand first, fingers thumb → pinky.
    /// `ALL[k.index()] == k` for every key.
    pub const ALL: [FingerKey; FingerKey::COUNT] = [
        FingerKey::new(Hand::Left,  FingerId::Thumb),
        FingerKey::new(Hand::Left,  FingerId::Index),
        FingerKey::new(Hand::Left,  FingerId::Middle),
        FingerKey::new(Hand::Left,  FingerId::Ring),
        FingerKey::new(Hand::Left,  FingerId::Pinky),
        FingerKey::new(Hand::Right, FingerId::Thumb),
        FingerKey::new(Hand::Right, FingerId::Index),
        FingerKey::new(Hand::Right, FingerId::Middle),
        FingerKey::new(Hand::Right, FingerId::Ring),
        FingerKey::new(Hand::Right, FingerId::Pinky),
    ];

    pub const fn new(hand: Hand, finger: FingerId) -> Self {
        FingerKey { hand, finger }
    }

    /// Dense slot index in `0..COUNT`.
    pub fn index(self) -> usize {
        let h = match self.hand {
            Hand::Left  => 0,
            Hand::Right => 1,
        };
        h * FingerId::ALL.len() + self.finger as usize
    }
}

impl fmt::Display for FingerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.hand, self.finger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (i, key) in FingerKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i, "{} out of place", key);
        }
    }

    #[test]
    fn keys_are_unique() {
        let set: std::collections::HashSet<_> = FingerKey::ALL.iter().collect();
        assert_eq!(set.len(), FingerKey::COUNT);
    }

    #[test]
    fn parse_hand_labels() {
        assert_eq!("Left".parse::<Hand>(), Ok(Hand::Left));
        assert_eq!(" right ".parse::<Hand>(), Ok(Hand::Right));
        assert_eq!(
            "Unknown".parse::<Hand>(),
            Err(ParseHandError("Unknown".to_string()))
        );
    }

    #[test]
    fn tip_landmarks() {
        let tips: Vec<usize> = FingerId::ALL.iter().map(|f| f.tip_landmark()).collect();
        assert_eq!(tips, vec![4, 8, 12, 16, 20]);
    }

    #[test]
    fn selector_keys() {
        assert_eq!(FingerId::from_selector(1), Some(FingerId::Thumb));
        assert_eq!(FingerId::from_selector(5), Some(FingerId::Pinky));
        assert_eq!(FingerId::from_selector(0), None);
        assert_eq!(FingerId::from_selector(6), None);
    }

    #[test]
    fn display() {
        let k = FingerKey::new(Hand::Right, FingerId::Ring);
        assert_eq!(k.to_string(), "Right Ring");
    }
}
