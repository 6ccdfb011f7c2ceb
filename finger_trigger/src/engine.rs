//! The trigger engine: adaptive baselines, thresholds, cooldowns and the
//! visual "pressed" timer for all ten finger slots.
//!
//! The engine is driven synchronously by one caller, once per fingertip
//! per frame.  It keeps no memory of frame boundaries; the only notion of
//! time is the `now` value passed to [`TriggerEngine::observe`].

use std::time::Duration;

use tracing::{info, trace, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::hand::FingerKey;
use crate::notes::NoteMap;

/// Baseline value meaning "not seen yet": the bottom edge of the frame.
/// Any real observation is at or above it, so the first one always snaps.
pub const BASELINE_SENTINEL: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// FingerState
// ════════════════════════════════════════════════════════════════════════════

/// Tracking state of one finger slot.
#[derive(Clone, Debug, PartialEq)]
pub struct FingerState {
    baseline:     f32,
    threshold:    f32,
    pressed:      bool,
    last_trigger: Option<Duration>,
    last_y:       Option<f32>,
    displacement: f32,
}

impl FingerState {
    fn new(threshold: f32) -> Self {
        FingerState {
            baseline:     BASELINE_SENTINEL,
            threshold,
            pressed:      false,
            last_trigger: None,
            last_y:       None,
            displacement: 0.0,
        }
    }

    /// Adaptive rest position, in `[0, 1]`.
    pub fn baseline(&self) -> f32 { self.baseline }

    /// Downward displacement needed to fire.
    pub fn threshold(&self) -> f32 { self.threshold }

    /// True while the slot is shown as sounding.
    pub fn is_pressed(&self) -> bool { self.pressed }

    /// Time of the most recent trigger; `None` if the slot never fired.
    pub fn last_trigger(&self) -> Option<Duration> { self.last_trigger }

    /// Most recently observed (clamped) position.
    pub fn last_position(&self) -> Option<f32> { self.last_y }

    /// Displacement computed at the most recent observation.
    pub fn displacement(&self) -> f32 { self.displacement }

    fn since_trigger(&self, now: Duration) -> Option<Duration> {
        self.last_trigger.map(|t| now.saturating_sub(t))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TriggerEvent
// ════════════════════════════════════════════════════════════════════════════

/// A slot crossed its threshold outside its cooldown.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerEvent {
    pub key:  FingerKey,
    pub note: String,
    pub at:   Duration,
}

impl TriggerEvent {
    pub fn hand_label(&self) -> &'static str {
        self.key.hand.label()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TriggerEngine
// ════════════════════════════════════════════════════════════════════════════

/// Owns one [`FingerState`] per [`FingerKey`] and turns observations into
/// [`TriggerEvent`]s.
///
/// Instances are fully independent; nothing is shared between engines.
#[derive(Clone, Debug)]
pub struct TriggerEngine {
    config:          EngineConfig,
    cooldown:        Duration,
    visual_feedback: Duration,
    notes:           NoteMap,
    fingers:         [FingerState; FingerKey::COUNT],
}

impl Default for TriggerEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl TriggerEngine {
    /// Build an engine with the default note table.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let fingers = FingerKey::ALL.map(|key| FingerState::new(config.threshold_for(key)));
        TriggerEngine {
            cooldown:        config.cooldown(),
            visual_feedback: config.visual_feedback(),
            notes:           NoteMap::default(),
            fingers,
            config,
        }
    }

    /// Replace the note table.
    pub fn with_notes(mut self, notes: NoteMap) -> Self {
        self.notes = notes;
        self
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn notes(&self) -> &NoteMap { &self.notes }

    /// Note name bound to `key`, or `"Unknown"`.
    pub fn note(&self, key: FingerKey) -> &str {
        self.notes.name(key)
    }

    pub fn state(&self, key: FingerKey) -> &FingerState {
        &self.fingers[key.index()]
    }

    /// All slots in [`FingerKey::ALL`] order.
    pub fn states(&self) -> impl Iterator<Item = (FingerKey, &FingerState)> + '_ {
        FingerKey::ALL.into_iter().zip(self.fingers.iter())
    }

    /// True if `key` fired less than one cooldown before `now`.
    pub fn in_cooldown(&self, key: FingerKey, now: Duration) -> bool {
        self.state(key)
            .since_trigger(now)
            .map_or(false, |dt| dt <= self.cooldown)
    }

    // ── observe ───────────────────────────────────────────────────────────

    /// Feed one fingertip observation.
    ///
    /// `y` is the normalised vertical position (smaller = higher).  Values
    /// outside `[0, 1]` are clamped; `NaN` is ignored.  Returns the trigger
    /// event if this observation fired the slot.
    pub fn observe(&mut self, key: FingerKey, y: f32, now: Duration) -> Option<TriggerEvent> {
        if y.is_nan() {
            trace!(%key, "ignoring NaN observation");
            return None;
        }
        let y = y.clamp(0.0, 1.0);

        let alpha           = self.config.smoothing;
        let cooldown        = self.cooldown;
        let visual_feedback = self.visual_feedback;
        let state = &mut self.fingers[key.index()];

        // 1. Baseline: snap up, drift down.
        if y < state.baseline {
            state.baseline = y;
        } else {
            state.baseline = state.baseline * (1.0 - alpha) + y * alpha;
        }

        // 2. Displacement below rest.
        let distance = y - state.baseline;
        state.last_y = Some(y);
        state.displacement = distance;

        // 3. Threshold + per-slot cooldown.
        let cooled = state.since_trigger(now).map_or(true, |dt| dt > cooldown);
        let fired = distance > state.threshold && cooled;
        if fired {
            state.pressed = true;
            state.last_trigger = Some(now);
        }

        // 4. Visual decay, independent of step 3.
        if state.pressed && state.since_trigger(now).map_or(true, |dt| dt > visual_feedback) {
            state.pressed = false;
        }

        if !fired {
            return None;
        }

        let event = TriggerEvent {
            key,
            note: self.notes.name(key).to_string(),
            at:   now,
        };
        info!(
            hand = event.hand_label(),
            finger = %key.finger,
            note = %event.note,
            distance,
            "note triggered"
        );
        Some(event)
    }

    // ── calibration ───────────────────────────────────────────────────────

    /// Put every baseline back to the sentinel.  Thresholds and pressed
    /// flags are untouched.
    pub fn reset(&mut self) {
        for state in &mut self.fingers {
            state.baseline = BASELINE_SENTINEL;
        }
        info!("baselines reset");
    }

    /// Multiply the threshold of `key` by `factor` and return the result.
    ///
    /// There is no clamping: thresholds may be driven arbitrarily close to
    /// zero or arbitrarily large.  A factor that is not a finite positive
    /// number would break `threshold > 0` and is ignored.
    pub fn adjust_threshold(&mut self, key: FingerKey, factor: f32) -> f32 {
        let state = &mut self.fingers[key.index()];
        if !(factor.is_finite() && factor > 0.0) {
            warn!(%key, factor, "ignoring threshold factor");
            return state.threshold;
        }
        let scaled = state.threshold * factor;
        if scaled > 0.0 && scaled.is_finite() {
            state.threshold = scaled;
        } else {
            warn!(%key, factor, "threshold would leave the positive range; unchanged");
        }
        state.threshold
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
