use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, trace};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Timer refresh; only produced while the periodic tick is armed
    Tick,
    /// The event source went away
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait AppEventSource: Send + 'static {
    /// Block until an event arrives.
    fn recv(&self) -> Result<AppEvent, RecvError>;

    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
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
                Err(e) => {
                    debug!(error = %e, "terminal event reader stopped");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Cancellable fixed-interval tick.
///
/// Disarmed it never fires; arming schedules the first tick one interval out.
#[derive(Clone, Copy, Debug)]
pub struct PeriodicTick {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTick {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Start ticking. Arming an armed tick keeps its schedule.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            trace!(interval_ms = self.interval.as_millis() as u64, "tick armed");
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn cancel(&mut self) {
        if self.next_due.take().is_some() {
            trace!("tick cancelled");
        }
    }

    /// Time left until the next tick, `None` while disarmed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }

    /// Returns true when a tick is due and schedules the following one
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource> {
    event_source: E,
    tick: PeriodicTick,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(event_source: E, tick_interval: Duration) -> Self {
        Self {
            event_source,
            tick: PeriodicTick::new(tick_interval),
        }
    }

    pub fn tick(&self) -> &PeriodicTick {
        &self.tick
    }

    /// Arm the tick while `active`, cancel it otherwise
    pub fn set_ticking(&mut self, active: bool) {
        if active {
            self.tick.arm(Instant::now());
        } else {
            self.tick.cancel();
        }
    }

    /// Returns the next event. While the tick is armed, waits at most until the
    /// tick is due and returns Tick on timeout; otherwise blocks on input.
    pub fn step(&mut self) -> AppEvent {
        let Some(timeout) = self.tick.remaining(Instant::now()) else {
            return self.event_source.recv().unwrap_or(AppEvent::Closed);
        };

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.tick.poll(Instant::now());
                AppEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => AppEvent::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout_when_armed() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, Duration::from_millis(1));
        runner.set_ticking(true);

        // With no events available, step should yield Tick
        assert_matches!(runner.step(), AppEvent::Tick);
        assert!(runner.tick().is_armed());
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, Duration::from_millis(10));

        assert_matches!(runner.step(), AppEvent::Resize);
    }

    #[test]
    fn disarmed_runner_waits_for_input() {
        let (tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let mut runner = Runner::new(es, Duration::from_millis(1));

        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            tx.send(AppEvent::Resize).unwrap();
        });

        // no Tick is produced while waiting
        assert_matches!(runner.step(), AppEvent::Resize);
        sender.join().unwrap();
    }

    #[test]
    fn closed_source_reports_closed() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let mut runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));
        assert_matches!(runner.step(), AppEvent::Closed);

        runner.set_ticking(true);
        assert_matches!(runner.step(), AppEvent::Closed);
    }

    #[test]
    fn cancel_stops_ticks() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));
        runner.set_ticking(true);
        assert!(runner.tick().is_armed());

        runner.set_ticking(false);
        assert!(!runner.tick().is_armed());
    }

    #[test]
    fn periodic_tick_schedule() {
        let t0 = Instant::now();
        let mut tick = PeriodicTick::new(Duration::from_millis(50));
        assert_eq!(tick.remaining(t0), None);
        assert!(!tick.poll(t0 + Duration::from_secs(1)));

        tick.arm(t0);
        assert_eq!(tick.remaining(t0), Some(Duration::from_millis(50)));
        assert!(!tick.poll(t0 + Duration::from_millis(49)));
        assert!(tick.poll(t0 + Duration::from_millis(50)));
        assert_eq!(
            tick.remaining(t0 + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );

        // re-arming keeps the current schedule
        tick.arm(t0 + Duration::from_millis(60));
        assert_eq!(
            tick.remaining(t0 + Duration::from_millis(60)),
            Some(Duration::from_millis(40))
        );

        tick.cancel();
        assert!(!tick.is_armed());
        assert!(!tick.poll(t0 + Duration::from_secs(10)));
    }
}
