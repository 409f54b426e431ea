// Fixed-interval send scheduling for the hoverboard link
//
// Every tick drains the receive side first; a command goes out only when the
// send deadline has passed. Open loop: the board gives no backpressure.

use std::time::{Duration, Instant};
use tracing::warn;

use super::transport::{FeedbackSink, HoverSerial, SerialLink};

/// Default interval between command frames
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Supplies the (steer, speed) pair for each scheduled send
pub trait CommandSource {
    fn next_command(&mut self) -> (i16, i16);
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub bytes_received: usize,
    pub sent: bool,
}

pub struct LinkScheduler {
    interval: Duration,
    next_send: Option<Instant>,
}

impl LinkScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_send: None,
        }
    }

    /// A send is due at `now` (the first tick is always due)
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_send.is_none_or(|deadline| now >= deadline)
    }

    /// Run one tick: drain inbound bytes, then send if the deadline passed.
    ///
    /// Errors on either side are logged and dropped; the next tick retries.
    pub fn tick<L: SerialLink>(
        &mut self,
        now: Instant,
        serial: &mut HoverSerial<L>,
        source: &mut dyn CommandSource,
        sink: &mut dyn FeedbackSink,
    ) -> TickReport {
        let mut report = TickReport::default();

        match serial.receive(now, sink) {
            Ok(n) => report.bytes_received = n,
            Err(e) => warn!("Receive failed: {}", e),
        }

        if !self.is_due(now) {
            return report;
        }
        self.next_send = Some(now + self.interval);

        let (steer, speed) = source.next_command();
        match serial.send(steer, speed) {
            Ok(()) => report.sent = true,
            Err(e) => warn!("Send failed, skipping this cycle: {}", e),
        }

        report
    }

    /// Deadline of the next send, `None` before the first one
    pub fn next_send(&self) -> Option<Instant> {
        self.next_send
    }
}

impl Default for LinkScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_INTERVAL)
    }
}
