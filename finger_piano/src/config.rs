//! Application configuration, loaded from a TOML file.
//!
//! ```toml
//! [engine]
//! smoothing = 0.05
//! cooldown_secs = 0.5
//! visual_feedback_secs = 0.3
//!
//! [engine.thresholds]
//! index = 0.08
//!
//! [[engine.overrides]]
//! hand = "Right"
//! finger = "Pinky"
//! threshold = 0.09
//!
//! [calibration]
//! step = 1.2
//! debug = true
//!
//! [notes]
//! replace_defaults = false
//! bindings = [{ hand = "Left", finger = "Thumb", note = "G4" }]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use finger_trigger::calibration::DEFAULT_STEP;
use finger_trigger::{Calibrator, EngineConfig, FingerId, FingerKey, Hand, NoteMap, TriggerEngine};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Multiplicative threshold step for the `+` / `-` keys.
    pub step:  f32,
    /// Start with the debug overlay shown.
    pub debug: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig { step: DEFAULT_STEP, debug: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteBinding {
    pub hand:   Hand,
    pub finger: FingerId,
    pub note:   String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Start from an empty table instead of the built-in scale.
    pub replace_defaults: bool,
    pub bindings:         Vec<NoteBinding>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub width:  usize,
    pub height: usize,
}

impl Default for HudConfig {
    fn default() -> Self {
        HudConfig { width: 1280, height: 720 }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine:      EngineConfig,
    pub calibration: CalibrationConfig,
    pub notes:       NotesConfig,
    pub hud:         HudConfig,
}

impl AppConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(text).context("parsing TOML")?;
        cfg.engine.validate().context("invalid [engine] section")?;
        Ok(cfg)
    }

    pub fn note_map(&self) -> NoteMap {
        let mut map = if self.notes.replace_defaults {
            NoteMap::empty()
        } else {
            NoteMap::default()
        };
        for b in &self.notes.bindings {
            map.bind(FingerKey::new(b.hand, b.finger), b.note.clone());
        }
        map
    }

    pub fn build_engine(&self) -> Result<TriggerEngine> {
        let engine = TriggerEngine::new(self.engine.clone())?;
        Ok(engine.with_notes(self.note_map()))
    }

    pub fn build_calibrator(&self) -> Calibrator {
        Calibrator::new(self.calibration.step, self.calibration.debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finger_trigger::UNKNOWN_NOTE;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn partial_engine_section() {
        let cfg = AppConfig::from_toml(
            "[engine]\ncooldown_secs = 0.8\n[engine.thresholds]\nring = 0.05\n",
        ).unwrap();
        assert_eq!(cfg.engine.cooldown_secs, 0.8);
        assert_eq!(cfg.engine.thresholds.ring, 0.05);
        assert_eq!(cfg.engine.thresholds.thumb, 0.05);
        assert_eq!(cfg.engine.visual_feedback_secs, 0.3);
    }

    #[test]
    fn overrides_reach_the_engine() {
        let cfg = AppConfig::from_toml(
            r#"
            [[engine.overrides]]
            hand = "Right"
            finger = "Pinky"
            threshold = 0.09
            "#,
        ).unwrap();
        let engine = cfg.build_engine().unwrap();
        let rp = FingerKey::new(Hand::Right, FingerId::Pinky);
        let lp = FingerKey::new(Hand::Left, FingerId::Pinky);
        assert_eq!(engine.state(rp).threshold(), 0.09);
        assert_eq!(engine.state(lp).threshold(), 0.076);
    }

    #[test]
    fn invalid_engine_rejected() {
        let err = AppConfig::from_toml("[engine]\nsmoothing = 2.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("smoothing"));
    }

    #[test]
    fn huge_durations_rejected() {
        let err = AppConfig::from_toml(
            "[engine]\ncooldown_secs = 1e30\nvisual_feedback_secs = 1e29\n",
        ).unwrap_err();
        assert!(format!("{:#}", err).contains("cooldown_secs"));
    }

    #[test]
    fn replace_defaults_leaves_unknowns() {
        let cfg = AppConfig::from_toml(
            r#"
            [notes]
            replace_defaults = true
            bindings = [{ hand = "Left", finger = "Thumb", note = "G4" }]
            "#,
        ).unwrap();
        let map = cfg.note_map();
        assert_eq!(map.name(FingerKey::new(Hand::Left, FingerId::Thumb)), "G4");
        assert_eq!(map.name(FingerKey::new(Hand::Left, FingerId::Index)), UNKNOWN_NOTE);
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[calibration]\nstep = 1.5\ndebug = false").unwrap();
        let cfg = AppConfig::load(f.path()).unwrap();
        let cal = cfg.build_calibrator();
        assert_eq!(cal.step(), 1.5);
        assert!(!cal.debug());
    }

    #[test]
    fn example_file_is_valid() {
        let cfg = AppConfig::from_toml(include_str!("../finger_piano.example.toml")).unwrap();
        let rp = FingerKey::new(Hand::Right, FingerId::Pinky);
        assert_eq!(cfg.engine.threshold_for(rp), 0.085);
        assert_eq!(cfg.hud, HudConfig::default());
    }

    #[test]
    fn missing_file_names_path() {
        let err = AppConfig::load(Path::new("/nonexistent/finger_piano.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/finger_piano.toml"));
    }
}
