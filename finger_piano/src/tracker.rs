//! Frame sources: recorded landmark streams and keyboard simulation.
//!
//! The public interface is [`TrackedFrame`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from a recording or the
//! keyboard simulator.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, warn};

use finger_trigger::{FingerId, FingerKey, Hand, Landmark, TrackedHand, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// TrackedFrame
// ════════════════════════════════════════════════════════════════════════════

/// Every hand detected in one video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedFrame {
    /// Capture time, relative to the start of the session.
    pub at:    Duration,
    pub hands: Vec<TrackedHand>,
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait: unified interface for replay and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackedFrame`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackedFrame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<TrackedFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Recordings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct Record {
    /// Seconds since the start of the recording.
    t:     f64,
    #[serde(default)]
    hands: Vec<TrackedHand>,
}

/// Parse one line of a recording.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_record(line: &str) -> Result<Option<TrackedFrame>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let rec: Record = serde_json::from_str(line).context("malformed frame record")?;
    if !(rec.t.is_finite() && rec.t >= 0.0) {
        anyhow::bail!("frame timestamp must be a non-negative number, got {}", rec.t);
    }
    let at = Duration::try_from_secs_f64(rec.t)
        .with_context(|| format!("frame timestamp {} out of range", rec.t))?;
    Ok(Some(TrackedFrame {
        at,
        hands: rec.hands,
    }))
}

/// Read every frame of a recording.  Errors name the offending line.
pub fn read_frames<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TrackedFrame>> {
    reader.lines().enumerate().filter_map(|(i, line)| {
        let parsed = line
            .context("reading recording")
            .and_then(|l| parse_record(&l))
            .with_context(|| format!("line {}", i + 1));
        parsed.transpose()
    })
}

/// Frame source replaying a JSON-lines recording, paced to its timestamps.
pub struct ReplaySource {
    pub reader: Box<dyn BufRead + Send>,
}

impl FrameSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<TrackedFrame>) {
        let start = Instant::now();
        for frame in read_frames(self.reader) {
            let frame = match frame {
                Ok(f)  => f,
                Err(e) => {
                    error!("replay stopped: {:#}", e);
                    return;
                }
            };
            if let Some(wait) = frame.at.checked_sub(start.elapsed()) {
                thread::sleep(wait);
            }
            if tx.send(frame).is_err() { return; }
        }
        debug!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Resting fingertip height in simulated frames.
pub const REST_Y:  f32 = 0.50;
/// Fingertip height while its key is held.
pub const PRESS_Y: f32 = 0.62;

const SIM_FRAME: Duration = Duration::from_millis(16);

/// Raw input from the HUD window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Finger keys currently held down.
    Held(Vec<FingerKey>),
    Quit,
}

/// Frame source driven by [`SimInput`] events from the HUD window.
///
/// Emits one frame with both hands visible every ~16 ms; fingers whose keys
/// are held sit at [`PRESS_Y`], the rest at [`REST_Y`].
pub struct SimSource {
    pub rx: Receiver<SimInput>,
}

impl FrameSource for SimSource {
    fn run(self: Box<Self>, tx: Sender<TrackedFrame>) {
        let start = Instant::now();
        let mut held: Vec<FingerKey> = Vec::new();
        loop {
            match self.rx.recv_timeout(SIM_FRAME) {
                Ok(SimInput::Held(keys))               => held = keys,
                Ok(SimInput::Quit)                     => return,
                Err(RecvTimeoutError::Timeout)         => {}
                Err(RecvTimeoutError::Disconnected)    => return,
            }
            let frame = TrackedFrame {
                at:    start.elapsed(),
                hands: Hand::ALL.iter().map(|&h| sim_hand(h, &held)).collect(),
            };
            if tx.send(frame).is_err() {
                warn!("frame receiver gone; stopping simulator");
                return;
            }
        }
    }
}

/// Synthetic skeleton: palm low in the frame, fingertips in a row.
pub fn sim_hand(hand: Hand, held: &[FingerKey]) -> TrackedHand {
    let x0 = match hand {
        Hand::Left  => 0.10,
        Hand::Right => 0.55,
    };
    let mut lm = [Landmark { x: x0 + 0.15, y: 0.85, z: 0.0 }; LANDMARK_COUNT];
    for (i, finger) in FingerId::ALL.into_iter().enumerate() {
        let down = held.contains(&FingerKey::new(hand, finger));
        lm[finger.tip_landmark()] = Landmark {
            x: x0 + 0.07 * i as f32,
            y: if down { PRESS_Y } else { REST_Y },
            z: 0.0,
        };
    }
    TrackedHand::new(hand, lm)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
