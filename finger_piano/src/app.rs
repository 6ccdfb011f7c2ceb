//! Top-level application state and loops.
//!
//! `AppState` owns the `TriggerEngine` and the `Calibrator`.  It processes
//! `TrackedFrame`s and `CalibrationCommand`s and hands the resulting trigger
//! events to an `EventSink`.  Rendering only ever borrows it.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use finger_trigger::{CalibrationCommand, Calibrator, TriggerEngine, TriggerEvent};

use crate::config::AppConfig;
use crate::hud::Hud;
use crate::sink::EventSink;
use crate::tracker::{read_frames, spawn_frame_source, ReplaySource, SimSource, TrackedFrame};

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    engine:     TriggerEngine,
    calibrator: Calibrator,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,

    // ── frame rate ────────────────────────────────────────────────────────
    fps:        f32,
    last_frame: Option<Instant>,

    triggers:   usize,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        Ok(AppState {
            engine:     cfg.build_engine()?,
            calibrator: cfg.build_calibrator(),
            status:     "Ready: lower a finger to play".to_string(),
            fps:        0.0,
            last_frame: None,
            triggers:   0,
        })
    }

    // ── process one frame ─────────────────────────────────────────────────

    /// Feed a frame to the engine and deliver any triggers to `sink`.
    pub fn handle_frame(
        &mut self,
        frame: &TrackedFrame,
        sink:  &mut dyn EventSink,
    ) -> Result<Vec<TriggerEvent>> {
        let events = self.engine.observe_hands(&frame.hands, frame.at);
        for ev in &events {
            sink.deliver(ev)?;
        }
        if let Some(last) = events.last() {
            self.status = format!("PLAYED: {}", last.note);
        }
        self.triggers += events.len();
        Ok(events)
    }

    // ── process one calibration command ───────────────────────────────────

    pub fn handle_command(&mut self, cmd: CalibrationCommand) {
        self.status = self.calibrator.apply(cmd, &mut self.engine);
    }

    /// Update the FPS estimate; call once per rendered frame.
    pub fn tick(&mut self, now: Instant) {
        if let Some(prev) = self.last_frame {
            let dt = now.duration_since(prev).as_secs_f32();
            if dt > 0.0 {
                let inst = 1.0 / dt;
                self.fps = if self.fps == 0.0 { inst } else { self.fps * 0.9 + inst * 0.1 };
            }
        }
        self.last_frame = Some(now);
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn engine(&self)     -> &TriggerEngine { &self.engine }
    pub fn calibrator(&self) -> &Calibrator    { &self.calibrator }
    pub fn fps(&self)        -> f32            { self.fps }
    pub fn triggers(&self)   -> usize          { self.triggers }
}

// ════════════════════════════════════════════════════════════════════════════
// run_headless(): replay without a window
// ════════════════════════════════════════════════════════════════════════════

/// Replay a recording as fast as possible, delivering every trigger to
/// `sink`.  Returns the number of triggers.
pub fn run_headless<R: BufRead>(
    cfg:    &AppConfig,
    reader: R,
    sink:   &mut dyn EventSink,
) -> Result<usize> {
    let mut app = AppState::new(cfg)?;
    let mut frames = 0usize;
    for frame in read_frames(reader) {
        app.handle_frame(&frame?, sink)?;
        frames += 1;
    }
    info!(frames, triggers = app.triggers(), "replay complete");
    Ok(app.triggers())
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the windowed loop
// ════════════════════════════════════════════════════════════════════════════

/// Where frames come from in windowed mode.
pub enum Input {
    /// Keyboard simulation inside the HUD window.
    Simulated,
    /// A recording, replayed in real time.
    Replay(Box<dyn BufRead + Send>),
}

/// Run the full application.
///
/// Opens the HUD, starts the frame source on its own thread, and drives the
/// input/frame/render loop at ~60 fps until the window closes or `Q`.
pub fn run(cfg: &AppConfig, input: Input, sink: &mut dyn EventSink) -> Result<()> {
    let (frame_rx, sim_tx): (Receiver<TrackedFrame>, _) = match input {
        Input::Simulated => {
            let (tx, rx) = mpsc::channel();
            (spawn_frame_source(SimSource { rx }), Some(tx))
        }
        Input::Replay(reader) => (spawn_frame_source(ReplaySource { reader }), None),
    };

    let mut hud = Hud::new(cfg.hud.width, cfg.hud.height, sim_tx)?;
    let mut app = AppState::new(cfg)?;
    let mut commands = Vec::new();

    while hud.is_open() {
        // 1. Keyboard
        if !hud.poll_input(&mut commands) { break; }
        for cmd in commands.drain(..) {
            app.handle_command(cmd);
        }

        // 2. Drain frames
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => { app.handle_frame(&frame, sink)?; }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("frame source finished");
                    break;
                }
            }
        }

        // 3. Render
        app.tick(Instant::now());
        hud.render(app.engine(), app.calibrator(), &app.status, app.fps());
    }

    info!(triggers = app.triggers(), "session ended");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
