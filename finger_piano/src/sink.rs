//! Trigger-event consumers.
//!
//! The engine only produces events; what happens to them (sound, serial
//! hardware, a log) is up to the sink the application is wired with.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use finger_trigger::TriggerEvent;

/// Anything that accepts trigger events.
pub trait EventSink {
    fn deliver(&mut self, event: &TriggerEvent) -> Result<()>;
}

/// Logs each event, one line per note.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn deliver(&mut self, event: &TriggerEvent) -> Result<()> {
        info!(
            "Note {} played by {} finger {}",
            event.note,
            event.hand_label(),
            event.key.finger.tip_landmark()
        );
        Ok(())
    }
}

/// Wire form of a [`TriggerEvent`] in a JSON-lines stream.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    t:      f64,
    hand:   &'a str,
    finger: &'a str,
    note:   &'a str,
}

/// Writes `{"t":…,"hand":…,"finger":…,"note":…}` per event, flushing each
/// line so a downstream process sees notes as they happen.
pub struct JsonLinesSink<W: Write> {
    out:     W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        JsonLinesSink { out, written: 0 }
    }

    pub fn written(&self) -> usize { self.written }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn deliver(&mut self, event: &TriggerEvent) -> Result<()> {
        let rec = EventRecord {
            t:      event.at.as_secs_f64(),
            hand:   event.hand_label(),
            finger: event.key.finger.name(),
            note:   &event.note,
        };
        serde_json::to_writer(&mut self.out, &rec).context("encoding event")?;
        self.out.write_all(b"\n").context("writing event")?;
        self.out.flush().context("flushing event stream")?;
        self.written += 1;
        Ok(())
    }
}

/// Fan out to several sinks; stops at the first error.
#[derive(Default)]
pub struct Tee {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Tee {
    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for Tee {
    fn deliver(&mut self, event: &TriggerEvent) -> Result<()> {
        for s in &mut self.sinks {
            s.deliver(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finger_trigger::{FingerId, FingerKey, Hand};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn event() -> TriggerEvent {
        TriggerEvent {
            key:  FingerKey::new(Hand::Left, FingerId::Index),
            note: "Fa (F)".into(),
            at:   Duration::from_millis(1500),
        }
    }

    #[test]
    fn json_line_shape() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.deliver(&event()).unwrap();
        assert_eq!(sink.written(), 1);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "{\"t\":1.5,\"hand\":\"Left\",\"finger\":\"Index\",\"note\":\"Fa (F)\"}\n"
        );
    }

    #[test]
    fn log_sink_accepts() {
        assert!(LogSink.deliver(&event()).is_ok());
    }

    /// Records the notes it receives into a shared list.
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl EventSink for Recorder {
        fn deliver(&mut self, event: &TriggerEvent) -> Result<()> {
            self.0.borrow_mut().push(event.note.clone());
            Ok(())
        }
    }

    struct Broken;

    impl EventSink for Broken {
        fn deliver(&mut self, _: &TriggerEvent) -> Result<()> {
            anyhow::bail!("sink unavailable")
        }
    }

    #[test]
    fn tee_delivers_to_all() {
        let a = Rc::new(RefCell::new(Vec::new()));
        let b = Rc::new(RefCell::new(Vec::new()));
        let mut tee = Tee::default()
            .with(Recorder(a.clone()))
            .with(LogSink)
            .with(Recorder(b.clone()));
        tee.deliver(&event()).unwrap();
        assert_eq!(*a.borrow(), vec!["Fa (F)".to_string()]);
        assert_eq!(*b.borrow(), vec!["Fa (F)".to_string()]);
    }

    #[test]
    fn tee_stops_at_first_error() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut tee = Tee::default().with(Broken).with(Recorder(seen.clone()));
        let err = tee.deliver(&event()).unwrap_err();
        assert!(err.to_string().contains("sink unavailable"));
        assert!(seen.borrow().is_empty());
    }
}
