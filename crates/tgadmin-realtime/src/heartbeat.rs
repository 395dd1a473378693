//! Connection liveness tracking.
//!
//! A ping is due when nothing has been received for one interval; the
//! connection is considered dead when a ping goes unanswered for longer than
//! the timeout.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Beat {
    last_ping: Option<Instant>,
    last_message: Instant,
    waiting_for_pong: bool,
}

#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    timeout: Duration,
    state: Mutex<Beat>,
}

impl Heartbeat {
    pub fn new(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            state: Mutex::new(Beat {
                last_ping: None,
                last_message: Instant::now(),
                waiting_for_pong: false,
            }),
        }
    }

    /// Start over for a fresh connection.
    pub fn reset(&self) {
        let mut beat = self.state.lock();
        beat.last_ping = None;
        beat.last_message = Instant::now();
        beat.waiting_for_pong = false;
    }

    pub fn record_ping(&self) {
        let mut beat = self.state.lock();
        beat.last_ping = Some(Instant::now());
        beat.waiting_for_pong = true;
    }

    pub fn record_pong(&self) {
        let mut beat = self.state.lock();
        beat.waiting_for_pong = false;
        beat.last_message = Instant::now();
        if let Some(ping) = beat.last_ping {
            debug!(rtt_ms = ping.elapsed().as_millis() as u64, "Pong received");
        }
    }

    /// Any inbound frame counts as proof of life.
    pub fn record_message(&self) {
        self.state.lock().last_message = Instant::now();
    }

    pub fn is_timed_out(&self) -> bool {
        let beat = self.state.lock();
        match (beat.waiting_for_pong, beat.last_ping) {
            (true, Some(ping)) => ping.elapsed() > self.timeout,
            _ => false,
        }
    }

    pub fn should_ping(&self) -> bool {
        let beat = self.state.lock();
        !beat.waiting_for_pong && beat.last_message.elapsed() >= self.interval
    }

    /// Time until the next liveness check.
    pub fn check_period(&self) -> Duration {
        (self.interval / 2).min(self.timeout).max(Duration::from_millis(10))
    }
}
