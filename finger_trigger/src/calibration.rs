//! Runtime calibration: pick a slot, make it more or less sensitive,
//! re-seat the baselines.

use tracing::info;

use crate::engine::TriggerEngine;
use crate::hand::{FingerId, FingerKey, Hand};

/// Default multiplicative threshold step.
pub const DEFAULT_STEP: f32 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalibrationCommand {
    SelectHand(Hand),
    SelectFinger(FingerId),
    /// Raise the selected threshold (needs a deeper press).
    Desensitize,
    /// Lower the selected threshold.
    Sensitize,
    ResetBaselines,
    /// Only affects what the HUD draws.
    ToggleDebug,
}

/// Selection and debug-display state for the calibration controls.
#[derive(Clone, Debug, PartialEq)]
pub struct Calibrator {
    selected: FingerKey,
    step:     f32,
    debug:    bool,
}

impl Default for Calibrator {
    fn default() -> Self {
        Calibrator {
            selected: FingerKey::new(Hand::Left, FingerId::Index),
            step:     DEFAULT_STEP,
            debug:    true,
        }
    }
}

impl Calibrator {
    /// `step` must be a finite number > 1; anything else falls back to
    /// [`DEFAULT_STEP`].
    pub fn new(step: f32, debug: bool) -> Self {
        let step = if step.is_finite() && step > 1.0 { step } else { DEFAULT_STEP };
        Calibrator { step, debug, ..Calibrator::default() }
    }

    pub fn selected(&self) -> FingerKey { self.selected }
    pub fn step(&self) -> f32 { self.step }
    pub fn debug(&self) -> bool { self.debug }

    pub fn select(&mut self, key: FingerKey) {
        self.selected = key;
    }

    /// Apply one command and return a one-line description of the result.
    pub fn apply(&mut self, cmd: CalibrationCommand, engine: &mut TriggerEngine) -> String {
        let msg = match cmd {
            CalibrationCommand::SelectHand(hand) => {
                self.selected.hand = hand;
                format!("Selected hand: {}", hand)
            }
            CalibrationCommand::SelectFinger(finger) => {
                self.selected.finger = finger;
                format!("Selected finger: {}", self.selected)
            }
            CalibrationCommand::Desensitize => {
                let t = engine.adjust_threshold(self.selected, self.step);
                format!("{} threshold increased: {:.3}", self.selected, t)
            }
            CalibrationCommand::Sensitize => {
                let t = engine.adjust_threshold(self.selected, 1.0 / self.step);
                format!("{} threshold decreased: {:.3}", self.selected, t)
            }
            CalibrationCommand::ResetBaselines => {
                engine.reset();
                "Baselines reset".to_string()
            }
            CalibrationCommand::ToggleDebug => {
                self.debug = !self.debug;
                format!("Debug mode: {}", if self.debug { "ON" } else { "OFF" })
            }
        };
        info!("{}", msg);
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BASELINE_SENTINEL;
    use std::time::Duration;

    #[test]
    fn default_selection() {
        let c = Calibrator::default();
        assert_eq!(c.selected(), FingerKey::new(Hand::Left, FingerId::Index));
        assert!(c.debug());
    }

    #[test]
    fn select_hand_keeps_finger() {
        let mut c = Calibrator::default();
        let mut e = TriggerEngine::default();
        c.apply(CalibrationCommand::SelectFinger(FingerId::Ring), &mut e);
        let msg = c.apply(CalibrationCommand::SelectHand(Hand::Right), &mut e);
        assert_eq!(c.selected(), FingerKey::new(Hand::Right, FingerId::Ring));
        assert_eq!(msg, "Selected hand: Right");
    }

    #[test]
    fn adjust_only_selected_key() {
        let mut c = Calibrator::default();
        let mut e = TriggerEngine::default();
        c.select(FingerKey::new(Hand::Right, FingerId::Pinky));

        let msg = c.apply(CalibrationCommand::Desensitize, &mut e);
        assert_eq!(msg, "Right Pinky threshold increased: 0.091");
        for (key, st) in e.states() {
            if key == c.selected() {
                assert!((st.threshold() - 0.076 * 1.2).abs() < 1e-6);
            } else {
                assert_eq!(st.threshold(), e.config().threshold_for(key));
            }
        }

        c.apply(CalibrationCommand::Sensitize, &mut e);
        assert!((e.state(c.selected()).threshold() - 0.076).abs() < 1e-6);
    }

    #[test]
    fn reset_via_command() {
        let mut c = Calibrator::default();
        let mut e = TriggerEngine::default();
        let key = FingerKey::new(Hand::Left, FingerId::Thumb);
        e.observe(key, 0.4, Duration::ZERO);
        c.apply(CalibrationCommand::ResetBaselines, &mut e);
        assert_eq!(e.state(key).baseline(), BASELINE_SENTINEL);
    }

    #[test]
    fn toggle_debug_leaves_engine_alone() {
        let mut c = Calibrator::default();
        let mut e = TriggerEngine::default();
        let before = e.clone();
        assert_eq!(c.apply(CalibrationCommand::ToggleDebug, &mut e), "Debug mode: OFF");
        assert!(!c.debug());
        assert_eq!(
            e.states().map(|(_, s)| s.clone()).collect::<Vec<_>>(),
            before.states().map(|(_, s)| s.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn bad_step_falls_back() {
        assert_eq!(Calibrator::new(0.5, false).step(), DEFAULT_STEP);
        assert_eq!(Calibrator::new(1.5, false).step(), 1.5);
    }
}
