//! # finger_piano
//!
//! Interactive front end for the [`finger_trigger`] engine: a frame source
//! feeds fingertip landmarks, the engine turns downward finger taps into
//! note triggers, and a HUD shows baselines, thresholds and pressed keys.
//!
//! ## Note layout
//!
//! | Hand | Pinky | Ring | Middle | Index | Thumb |
//! |---|---|---|---|---|---|
//! | Left  | Do (C)   | Re (D)   | Mi (E)   | Fa (F) | Sol (G) |
//! | Right | Mi' (E') | Re' (D') | Do' (C') | Ti (B) | La (A)  |
//!
//! ## Frame sources
//!
//! * (default): **Simulation**: function keys hold fingers down.
//! * `--replay <file>`: **Recording**: JSON lines of tracked hands.
//!
//! ### HUD keys
//!
//! | Key | Action |
//! |---|---|
//! | `F1`–`F5` | Hold left pinky → thumb (simulation) |
//! | `F6`–`F10` | Hold right thumb → pinky (simulation) |
//! | `L` / `R` | Select hand |
//! | `1`–`5` | Select finger (1 = thumb) |
//! | `+` / `-` | Raise / lower the selected threshold |
//! | `C` | Reset baselines |
//! | `D` | Toggle debug overlay |
//! | `Q` | Quit |

pub mod config;
pub mod tracker;
pub mod sink;
pub mod hud;
pub mod app;
