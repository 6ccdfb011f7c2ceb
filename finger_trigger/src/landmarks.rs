//! Hand-tracker input: 21 normalised landmarks per detected hand.
//!
//! Only the five fingertip landmarks feed the engine; the rest are carried
//! so a recording keeps the full skeleton.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{TriggerEngine, TriggerEvent};
use crate::hand::{FingerId, FingerKey, Hand, ParseHandError};

/// Points per hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// One normalised landmark.  `x`, `y` are in image space (0–1, `y` grows
/// downwards); `z` is relative depth and unused by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// A single detected hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedHand {
    /// Handedness label from the tracker, normally "Left" or "Right".
    pub label:     String,
    pub landmarks: [Landmark; LANDMARK_COUNT],
}

impl TrackedHand {
    pub fn new(hand: Hand, landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        TrackedHand { label: hand.label().to_string(), landmarks }
    }

    pub fn hand(&self) -> Result<Hand, ParseHandError> {
        self.label.parse()
    }

    pub fn fingertip(&self, finger: FingerId) -> Landmark {
        self.landmarks[finger.tip_landmark()]
    }
}

impl TriggerEngine {
    /// Feed every fingertip of every hand in one frame.
    ///
    /// Hands are processed in the order given, fingers thumb → pinky.
    /// A hand whose label is not Left/Right is skipped entirely.
    pub fn observe_hands(&mut self, hands: &[TrackedHand], now: Duration) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for tracked in hands {
            let hand = match tracked.hand() {
                Ok(h)  => h,
                Err(e) => {
                    warn!(error = %e, "skipping hand");
                    continue;
                }
            };
            for finger in FingerId::ALL {
                let y = tracked.fingertip(finger).y;
                if let Some(ev) = self.observe(FingerKey::new(hand, finger), y, now) {
                    events.push(ev);
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BASELINE_SENTINEL;

    fn hand_at(hand: Hand, tips: [f32; 5]) -> TrackedHand {
        let mut lm = [Landmark { x: 0.5, y: 0.8, z: 0.0 }; LANDMARK_COUNT];
        for (finger, y) in FingerId::ALL.into_iter().zip(tips) {
            lm[finger.tip_landmark()].y = y;
        }
        TrackedHand::new(hand, lm)
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn fingertips_reach_their_keys() {
        let mut e = TriggerEngine::default();
        e.observe_hands(&[hand_at(Hand::Right, [0.1, 0.2, 0.3, 0.4, 0.5])], ms(0));
        for (finger, y) in FingerId::ALL.into_iter().zip([0.1, 0.2, 0.3, 0.4, 0.5]) {
            assert_eq!(e.state(FingerKey::new(Hand::Right, finger)).baseline(), y);
            assert_eq!(e.state(FingerKey::new(Hand::Left, finger)).baseline(), BASELINE_SENTINEL);
        }
    }

    #[test]
    fn simultaneous_triggers_in_one_frame() {
        let mut e = TriggerEngine::default();
        let rest = [0.5; 5];
        e.observe_hands(&[hand_at(Hand::Left, rest), hand_at(Hand::Right, rest)], ms(0));

        let events = e.observe_hands(
            &[
                hand_at(Hand::Left,  [0.5, 0.7, 0.5, 0.5, 0.5]),
                hand_at(Hand::Right, [0.7, 0.5, 0.5, 0.5, 0.5]),
            ],
            ms(100),
        );
        let notes: Vec<&str> = events.iter().map(|e| e.note.as_str()).collect();
        assert_eq!(notes, vec!["Fa (F)", "La (A)"]);
    }

    #[test]
    fn unknown_label_is_skipped() {
        let mut e = TriggerEngine::default();
        let mut h = hand_at(Hand::Left, [0.2; 5]);
        h.label = "Unknown".into();
        assert!(e.observe_hands(&[h], ms(0)).is_empty());
        for (_, st) in e.states() {
            assert_eq!(st.baseline(), BASELINE_SENTINEL);
        }
    }

    #[test]
    fn landmark_json_defaults_z() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(lm, Landmark { x: 0.25, y: 0.75, z: 0.0 });
    }
}
