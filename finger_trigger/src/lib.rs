//! # finger_trigger
//!
//! Turns a stream of fingertip observations into discrete note-trigger
//! events.  One [`TriggerEngine`] owns ten fixed slots, one per
//! (hand, finger) pair, and for each slot tracks:
//!
//! * an adaptive **baseline**: the finger's rest height, snapped up
//!   immediately and smoothed down slowly,
//! * a **threshold**: how far below the baseline the fingertip must drop,
//! * a **cooldown** timestamp: the last time the slot fired,
//! * a **pressed** flag: the visual "note sounding" state, cleared on a
//!   fixed timer.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use finger_trigger::{TriggerEngine, FingerKey, Hand, FingerId};
//!
//! let mut engine = TriggerEngine::default();
//! let key = FingerKey::new(Hand::Left, FingerId::Index);
//!
//! engine.observe(key, 0.50, Duration::from_millis(0));
//! engine.observe(key, 0.50, Duration::from_millis(100));
//! let event = engine.observe(key, 0.60, Duration::from_millis(300)).unwrap();
//! assert_eq!(event.note, "Fa (F)");
//! ```
//!
//! ## Coordinates
//!
//! Vertical positions are normalised image coordinates in `[0, 1]`:
//! smaller is higher on screen, `1.0` is the bottom edge.  A positive
//! displacement therefore means the finger moved *down* from rest.

pub mod hand;
pub mod notes;
pub mod config;
pub mod engine;
pub mod landmarks;
pub mod calibration;

pub use hand::{FingerId, FingerKey, Hand, ParseHandError};
pub use notes::{NoteMap, UNKNOWN_NOTE};
pub use config::{ConfigError, EngineConfig, FingerThresholds, ThresholdOverride};
pub use engine::{FingerState, TriggerEngine, TriggerEvent, BASELINE_SENTINEL};
pub use landmarks::{Landmark, TrackedHand, LANDMARK_COUNT};
pub use calibration::{CalibrationCommand, Calibrator};
