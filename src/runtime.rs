use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop. `Tick` doubles as the
/// redraw heartbeat and the base clock for WPM sampling and the
/// time-mode countdown.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize).
pub trait EventSource: Send + 'static {
    /// Blocks for up to `timeout`; Err(Timeout) when nothing arrived.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production source: a background thread pumping crossterm events into a
/// channel so the app loop can multiplex them with the tick timeout.
pub struct TerminalEventSource {
    rx: Receiver<AppEvent>,
}

impl TerminalEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for TerminalEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TerminalEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed source for unit tests.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Serializes the event stream: one consumer, one event at a time, with a
/// `Tick` substituted whenever the tick interval elapses quietly.
pub struct EventLoop<E: EventSource> {
    source: E,
    tick_interval: Duration,
}

impl<E: EventSource> EventLoop<E> {
    pub fn new(source: E, tick_interval: Duration) -> Self {
        Self {
            source,
            tick_interval,
        }
    }

    pub fn next(&self) -> AppEvent {
        match self.source.recv_timeout(self.tick_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn next_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let events = EventLoop::new(ChannelEventSource::new(rx), Duration::from_millis(1));
        assert_matches!(events.next(), AppEvent::Tick);
    }

    #[test]
    fn next_passes_through_events_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Tick).unwrap();
        let events = EventLoop::new(ChannelEventSource::new(rx), Duration::from_millis(10));

        assert_matches!(events.next(), AppEvent::Resize);
        assert_matches!(events.next(), AppEvent::Tick);
    }

    #[test]
    fn disconnected_source_degrades_to_ticks() {
        let (tx, rx) = mpsc::channel();
        drop(tx);
        let events = EventLoop::new(ChannelEventSource::new(rx), Duration::from_millis(1));
        assert_matches!(events.next(), AppEvent::Tick);
    }
}
