//! Software-rendered HUD using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  title                                                        FPS    │
//! │  ┌──── LEFT HAND ─────────────────┐ ┌──── RIGHT HAND ────────────────┐│
//! │  │ pinky ring middle index thumb  │ │ thumb index middle ring pinky  ││
//! │  │   ●      ●     ◉      ●    ●   │ │   ●     ●     ●     ●     ●    ││
//! │  │ ── baseline   ·· threshold     │ │                                ││
//! │  └────────────────────────────────┘ └────────────────────────────────┘│
//! │  debug panel: thresholds, selection, keys                             │
//! │  status bar                                                           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The HUD only reads engine state; every change goes through
//! [`CalibrationCommand`]s returned from [`Hud::poll_input`].

use std::sync::mpsc::Sender;

use anyhow::{anyhow, bail, Result};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use finger_trigger::{CalibrationCommand, Calibrator, FingerId, FingerKey, Hand, TriggerEngine};

use crate::tracker::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const LANE_TOP:      usize = 50;
const LANE_FRAC:     f32   = 0.58;
const FONT_SCALE:    usize = 2;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const LANE_BG:       u32   = 0xFF16213E;
const TEXT_BG:       u32   = 0xFF0F3460;
const TIP_COLOR:     u32   = 0xFF00FF00;
const BASELINE_COLOR: u32  = 0xFFFFFF00;
const THRESH_COLOR:  u32   = 0xFFFF00FF;
const PRESSED_COLOR: u32   = 0xFF0050FF;
const SELECT_COLOR:  u32   = 0xFFFF00FF;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DEBUG_TEXT:    u32   = 0xFFFF6060;

/// Simulation keys: left pinky → thumb, then right thumb → pinky.
const SIM_KEYS: [(Key, Hand, FingerId); FingerKey::COUNT] = [
    (Key::F1,  Hand::Left,  FingerId::Pinky),
    (Key::F2,  Hand::Left,  FingerId::Ring),
    (Key::F3,  Hand::Left,  FingerId::Middle),
    (Key::F4,  Hand::Left,  FingerId::Index),
    (Key::F5,  Hand::Left,  FingerId::Thumb),
    (Key::F6,  Hand::Right, FingerId::Thumb),
    (Key::F7,  Hand::Right, FingerId::Index),
    (Key::F8,  Hand::Right, FingerId::Middle),
    (Key::F9,  Hand::Right, FingerId::Ring),
    (Key::F10, Hand::Right, FingerId::Pinky),
];

/// Left-to-right lane order, mirroring how the hands face the camera.
fn lane_order() -> [FingerKey; FingerKey::COUNT] {
    SIM_KEYS.map(|(_, hand, finger)| FingerKey::new(hand, finger))
}

// ════════════════════════════════════════════════════════════════════════════
// Hud
// ════════════════════════════════════════════════════════════════════════════

pub struct Hud {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
    /// Present when the simulator is the frame source.
    sim_tx: Option<Sender<SimInput>>,
    held:   Vec<FingerKey>,
}

impl Hud {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        if width < 640 || height < 360 {
            bail!("HUD needs at least 640x360, got {}x{}", width, height);
        }
        let mut window = Window::new(
            "Finger Piano: Separate Hand Settings",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("opening window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Hud {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            sim_tx,
            held: Vec::new(),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard.  Calibration keys are appended to `commands`;
    /// simulation keys are forwarded to the simulator.  Returns false on quit.
    pub fn poll_input(&mut self, commands: &mut Vec<CalibrationCommand>) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) {
            if let Some(tx) = &self.sim_tx {
                let _ = tx.send(SimInput::Quit);
            }
            return false;
        }
        if one_shot(Key::D) {
            commands.push(CalibrationCommand::ToggleDebug);
        }
        if one_shot(Key::Equal) || one_shot(Key::NumPadPlus) {
            commands.push(CalibrationCommand::Desensitize);
        }
        if one_shot(Key::Minus) || one_shot(Key::NumPadMinus) {
            commands.push(CalibrationCommand::Sensitize);
        }
        for (n, k) in [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5].into_iter().enumerate() {
            if one_shot(k) {
                if let Some(f) = FingerId::from_selector(n as u8 + 1) {
                    commands.push(CalibrationCommand::SelectFinger(f));
                }
            }
        }
        if one_shot(Key::L) {
            commands.push(CalibrationCommand::SelectHand(Hand::Left));
        }
        if one_shot(Key::R) {
            commands.push(CalibrationCommand::SelectHand(Hand::Right));
        }
        if one_shot(Key::C) {
            commands.push(CalibrationCommand::ResetBaselines);
        }

        if let Some(tx) = &self.sim_tx {
            let held: Vec<FingerKey> = SIM_KEYS.iter()
                .filter(|(k, _, _)| self.window.is_key_down(*k))
                .map(|&(_, hand, finger)| FingerKey::new(hand, finger))
                .collect();
            if held != self.held {
                let _ = tx.send(SimInput::Held(held.clone()));
                self.held = held;
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        engine: &TriggerEngine,
        cal:    &Calibrator,
        status: &str,
        fps:    f32,
    ) {
        self.buf.fill(BG_COLOR);

        // ── Title / FPS ───────────────────────────────────────────────────
        self.draw_label("FINGER PIANO", 20, 14, TEXT_COLOR);
        let fps_text = format!("FPS: {}", fps.round() as u32);
        self.draw_label(&fps_text, self.width.saturating_sub(140), 14, TEXT_COLOR);

        // ── Finger lanes ──────────────────────────────────────────────────
        let lane_h = (self.height as f32 * LANE_FRAC) as usize;
        let lane_w = self.width / FingerKey::COUNT;
        for (i, key) in lane_order().into_iter().enumerate() {
            let selected = cal.debug() && key == cal.selected();
            self.draw_lane(engine, key, i * lane_w, lane_w, lane_h, cal.debug(), selected);
        }

        // ── Debug panel ───────────────────────────────────────────────────
        let panel_y = LANE_TOP + lane_h + 16;
        if cal.debug() {
            self.draw_debug_panel(engine, cal, panel_y);
        }

        // ── Status bar ────────────────────────────────────────────────────
        let status_y = self.height.saturating_sub(60);
        self.fill_rect(0, status_y, self.width, 30, TEXT_BG);
        self.draw_label(status, 10, status_y + 8, TEXT_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "F1-F10=fingers  L/R=hand  1-5=finger  +/-=threshold  C=reset  D=debug  Q=quit",
            10, self.height.saturating_sub(22), 0xFF888888,
        );

        let (w, h) = (self.width, self.height);
        self.window.update_with_buffer(&self.buf, w, h).ok();
    }

    // ── One lane ──────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn draw_lane(
        &mut self,
        engine:   &TriggerEngine,
        key:      FingerKey,
        x:        usize,
        w:        usize,
        h:        usize,
        debug:    bool,
        selected: bool,
    ) {
        let state = engine.state(key);
        let to_px = |v: f32| LANE_TOP + (v.clamp(0.0, 1.0) * (h - 1) as f32) as usize;
        let cx = x + w / 2;

        self.fill_rect(x + 2, LANE_TOP, w.saturating_sub(4), h, LANE_BG);
        if selected {
            self.draw_border(x + 2, LANE_TOP, w.saturating_sub(4), h, SELECT_COLOR);
        }

        let tag = format!("{}-{}", &key.hand.label()[..1], key.finger.name());
        self.draw_label(&tag, x + 8, LANE_TOP + h + 2, TEXT_COLOR);

        let Some(y) = state.last_position() else { return };
        let py = to_px(y);

        if debug {
            let by = to_px(state.baseline());
            self.hline(cx.saturating_sub(30), cx + 30, by, BASELINE_COLOR);
            let ty = to_px(state.baseline() + state.threshold());
            self.hline(cx.saturating_sub(15), cx + 15, ty, THRESH_COLOR);

            let shown = format!("{:.1}", state.displacement() * 100.0);
            self.draw_label(&shown, cx + 12, py.saturating_sub(20), DEBUG_TEXT);
        }

        if state.is_pressed() {
            self.fill_circle(cx, py, 25, PRESSED_COLOR);
            self.fill_circle(cx, py, 15, 0xFFFFFFFF);
            let note = engine.note(key).to_string();
            self.draw_label(&note, x + 4, py.saturating_sub(44), TEXT_COLOR);
        } else {
            self.fill_circle(cx, py, 5, TIP_COLOR);
        }
    }

    // ── Threshold table ───────────────────────────────────────────────────

    fn draw_debug_panel(&mut self, engine: &TriggerEngine, cal: &Calibrator, y: usize) {
        let col_w = self.width / 4;
        for (col, hand) in Hand::ALL.into_iter().enumerate() {
            let x = 20 + col * col_w;
            let heading = format!("{} HAND:", hand.label().to_uppercase());
            self.draw_label(&heading, x, y, DEBUG_TEXT);
            for (row, finger) in FingerId::ALL.into_iter().enumerate() {
                let key = FingerKey::new(hand, finger);
                let color = if key == cal.selected() { SELECT_COLOR } else { DEBUG_TEXT };
                let line = format!(
                    "{}-{}: {:.3}",
                    &hand.label()[..1], finger.name(), engine.state(key).threshold()
                );
                self.draw_label(&line, x, y + 16 * (row + 1), color);
            }
        }

        let x = 20 + 2 * col_w;
        let selected = format!("Selected: {}", cal.selected());
        self.draw_label(&selected, x, y, DEBUG_TEXT);
        self.draw_label("L/R switch hands, 1-5 fingers", x, y + 16, DEBUG_TEXT);
        self.draw_label("+ raise threshold, - lower", x, y + 32, DEBUG_TEXT);
        self.draw_label("C reset baselines", x, y + 48, DEBUG_TEXT);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            let base = row * self.width;
            for col in x..(x + w).min(self.width) {
                self.buf[base + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        self.hline(x, x + w - 1, y, color);
        self.hline(x, x + w - 1, y + h - 1, color);
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn hline(&mut self, x0: usize, x1: usize, y: usize, color: u32) {
        for x in x0..=x1 {
            self.set_pixel(x, y, color);
            self.set_pixel(x, y + 1, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    fn fill_circle(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        let r = r as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r { continue; }
                let (sx, sy) = (cx as isize + dx, cy as isize + dy);
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// Minimal bitmap font, 3×5 glyphs scaled by [`FONT_SCALE`].
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * FONT_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    let px = cx + col * FONT_SCALE;
                    let py = y + row * FONT_SCALE;
                    self.fill_rect(px, py, FONT_SCALE, FONT_SCALE, color);
                }
            }
            cx += advance;
            if cx + advance > self.width { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
