// In-memory serial link and sinks for tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::protocol::{Command, Feedback, WireFrame};
use super::transport::{FeedbackSink, HoverError, Result, SerialLink};

/// Loopback-free fake port: tests queue inbound bytes and inspect writes
#[derive(Debug, Default)]
pub struct MockLink {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    writes: usize,
    fail_writes: bool,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available for the next drain
    pub fn queue_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful write calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far, decoded as Command frames
    pub fn sent_commands(&self) -> Vec<Command> {
        self.tx
            .chunks(Command::SIZE)
            .filter_map(Command::decode)
            .collect()
    }
}

impl SerialLink for MockLink {
    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.rx.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(HoverError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        self.tx.extend_from_slice(buf);
        self.writes += 1;
        Ok(())
    }
}

/// Sink that records every event
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub accepted: Vec<Feedback>,
    pub rejected: usize,
}

impl FeedbackSink for RecordingSink {
    fn on_feedback(&mut self, feedback: &Feedback) {
        self.accepted.push(*feedback);
    }

    fn on_rejected(&mut self) {
        self.rejected += 1;
    }
}

// Shared handle so a test can inspect the link after the owner is dropped
impl SerialLink for Rc<RefCell<MockLink>> {
    fn bytes_to_read(&mut self) -> Result<usize> {
        self.borrow_mut().bytes_to_read()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.borrow_mut().read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.borrow_mut().write_all(buf)
    }
}
