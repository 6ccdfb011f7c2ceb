//! Engine tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::{FingerId, FingerKey, Hand};

/// Rejected engine tuning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("smoothing rate must be in (0, 1], got {0}")]
    Smoothing(f32),

    #[error("threshold for {key} must be a positive number, got {value}")]
    Threshold { key: FingerKey, value: f32 },

    #[error("{name} must be a positive, in-range number of seconds, got {value}")]
    Duration { name: &'static str, value: f32 },

    #[error("visual feedback ({visual}s) must be shorter than the cooldown ({cooldown}s)")]
    FeedbackOutlastsCooldown { visual: f32, cooldown: f32 },
}

/// Default displacement threshold per finger type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerThresholds {
    pub thumb:  f32,
    pub index:  f32,
    pub middle: f32,
    pub ring:   f32,
    pub pinky:  f32,
}

impl FingerThresholds {
    pub fn get(&self, finger: FingerId) -> f32 {
        match finger {
            FingerId::Thumb  => self.thumb,
            FingerId::Index  => self.index,
            FingerId::Middle => self.middle,
            FingerId::Ring   => self.ring,
            FingerId::Pinky  => self.pinky,
        }
    }
}

impl Default for FingerThresholds {
    fn default() -> Self {
        FingerThresholds {
            thumb:  0.050,
            index:  0.072,
            middle: 0.072,
            ring:   0.060,
            pinky:  0.076,
        }
    }
}

/// Threshold for one specific (hand, finger) slot, replacing the
/// finger-type default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub hand:      Hand,
    pub finger:    FingerId,
    pub threshold: f32,
}

/// Tunable parameters of a [`TriggerEngine`](crate::TriggerEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exponential smoothing rate α applied when the fingertip is at or
    /// below its baseline.
    pub smoothing: f32,
    /// Minimum time between two triggers on the same slot.
    pub cooldown_secs: f32,
    /// How long a slot stays "pressed" after it fires.
    pub visual_feedback_secs: f32,
    pub thresholds: FingerThresholds,
    pub overrides: Vec<ThresholdOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            smoothing:            0.05,
            cooldown_secs:        0.5,
            visual_feedback_secs: 0.3,
            thresholds:           FingerThresholds::default(),
            overrides:            Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Initial threshold for `key`.  The last matching override wins.
    pub fn threshold_for(&self, key: FingerKey) -> f32 {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.hand == key.hand && o.finger == key.finger)
            .map(|o| o.threshold)
            .unwrap_or_else(|| self.thresholds.get(key.finger))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs)
    }

    pub fn visual_feedback(&self) -> Duration {
        Duration::from_secs_f32(self.visual_feedback_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }

        for (name, value) in [
            ("cooldown_secs", self.cooldown_secs),
            ("visual_feedback_secs", self.visual_feedback_secs),
        ] {
            if !(value.is_finite() && value > 0.0) || Duration::try_from_secs_f32(value).is_err() {
                return Err(ConfigError::Duration { name, value });
            }
        }
        if self.visual_feedback_secs >= self.cooldown_secs {
            return Err(ConfigError::FeedbackOutlastsCooldown {
                visual:   self.visual_feedback_secs,
                cooldown: self.cooldown_secs,
            });
        }

        for key in FingerKey::ALL {
            let value = self.threshold_for(key);
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Threshold { key, value });
            }
        }
        // Overrides shadowed by a later entry are still checked.
        for o in &self.overrides {
            if !(o.threshold.is_finite() && o.threshold > 0.0) {
                let key = FingerKey::new(o.hand, o.finger);
                return Err(ConfigError::Threshold { key, value: o.threshold });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn finger_defaults() {
        let cfg = EngineConfig::default();
        let li = FingerKey::new(Hand::Left, FingerId::Index);
        let rt = FingerKey::new(Hand::Right, FingerId::Thumb);
        assert_eq!(cfg.threshold_for(li), 0.072);
        assert_eq!(cfg.threshold_for(rt), 0.050);
    }

    #[test]
    fn override_applies_to_one_hand_only() {
        let mut cfg = EngineConfig::default();
        cfg.overrides.push(ThresholdOverride {
            hand: Hand::Right, finger: FingerId::Ring, threshold: 0.09,
        });
        assert_eq!(cfg.threshold_for(FingerKey::new(Hand::Right, FingerId::Ring)), 0.09);
        assert_eq!(cfg.threshold_for(FingerKey::new(Hand::Left, FingerId::Ring)), 0.060);
    }

    #[test]
    fn rejects_bad_smoothing() {
        let cfg = EngineConfig { smoothing: 0.0, ..EngineConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Smoothing(0.0)));
        let cfg = EngineConfig { smoothing: f32::NAN, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_feedback_longer_than_cooldown() {
        let cfg = EngineConfig {
            visual_feedback_secs: 0.6,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::FeedbackOutlastsCooldown { .. })
        ));
    }

    #[test]
    fn rejects_unrepresentable_duration() {
        let cfg = EngineConfig {
            cooldown_secs:        1e30,
            visual_feedback_secs: 1e29,
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Duration { name: "cooldown_secs", value: 1e30 })
        );
        assert!(crate::TriggerEngine::new(cfg).is_err());

        let cfg = EngineConfig { visual_feedback_secs: 1e29, ..EngineConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Duration { name: "visual_feedback_secs", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let mut cfg = EngineConfig::default();
        cfg.thresholds.pinky = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Threshold { .. })));

        let mut cfg = EngineConfig::default();
        cfg.overrides.push(ThresholdOverride {
            hand: Hand::Left, finger: FingerId::Thumb, threshold: -0.1,
        });
        assert!(matches!(cfg.validate(), Err(ConfigError::Threshold { .. })));
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{ "cooldown_secs": 0.8, "thresholds": { "thumb": 0.04 } }"#,
        ).unwrap();
        assert_eq!(cfg.cooldown_secs, 0.8);
        assert_eq!(cfg.thresholds.thumb, 0.04);
        assert_eq!(cfg.thresholds.index, 0.072);
        assert_eq!(cfg.smoothing, 0.05);
    }
}
