// Serial transport for the hoverboard link
//
// Sends Command frames fire-and-forget and drains whatever bytes the port has
// already buffered into the Feedback parser. Never waits on the wire.

use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::parser::{FrameParser, ParseEvent};
use super::protocol::{Command, Feedback};

/// Default serial configuration for the hoverboard USART
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 10;

/// Read chunk size used while draining the port
const DRAIN_CHUNK: usize = 64;

/// Error types for the hoverboard link
#[derive(Debug, thiserror::Error)]
pub enum HoverError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HoverError>;

/// Non-blocking byte stream the transport runs on
pub trait SerialLink {
    /// Bytes already buffered and readable without blocking
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` buffered bytes
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer as one operation
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}

impl SerialLink for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(SerialPort::bytes_to_read(&**self)? as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(Read::read(self, buf)?)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        Write::write_all(self, buf)?;
        self.flush()?;
        Ok(())
    }
}

/// Consumer of decoded feedback (telemetry, debug output)
pub trait FeedbackSink {
    /// A frame passed validation and is now the committed feedback
    fn on_feedback(&mut self, feedback: &Feedback);

    /// A full frame arrived but failed marker/checksum validation
    fn on_rejected(&mut self);
}

/// Sink that dumps frames to the log
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn on_feedback(&mut self, fb: &Feedback) {
        info!(
            "1: {} 2: {} 3: {} 4: {} 5: {} 6: {} 7: {}",
            fb.cmd1,
            fb.cmd2,
            fb.speed_r_meas,
            fb.speed_l_meas,
            fb.bat_voltage,
            fb.board_temp,
            fb.cmd_led
        );
    }

    fn on_rejected(&mut self) {
        warn!("Non-valid data skipped");
    }
}

/// Running counters for the link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub frames_sent: u64,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub write_errors: u64,
}

/// Framed transport over a serial link
pub struct HoverSerial<L: SerialLink> {
    link: L,
    parser: FrameParser<Feedback>,
    command: Command,
    feedback: Option<Feedback>,
    feedback_at: Option<Instant>,
    shutdown_sent: bool,
    stats: LinkStats,
}

impl HoverSerial<Box<dyn SerialPort>> {
    /// Open a serial port (8N1) at the default baud rate
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        info!("Opened hoverboard link on {} @ {} baud", port_name, baudrate);
        Ok(Self::new(port))
    }
}

impl<L: SerialLink> HoverSerial<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            parser: FrameParser::new(),
            command: Command::default(),
            feedback: None,
            feedback_at: None,
            shutdown_sent: false,
            stats: LinkStats::default(),
        }
    }

    /// Send a steer/speed command. Values go out as given, no clamping.
    pub fn send(&mut self, steer: i16, speed: i16) -> Result<()> {
        self.command = Command::new(steer, speed);
        self.write_command()
    }

    /// Send the shutdown frame once. Returns false if it was already sent.
    ///
    /// The latch is set on the first attempt, so a failed write is not retried.
    pub fn send_shutdown(&mut self) -> Result<bool> {
        if self.shutdown_sent {
            return Ok(false);
        }
        self.shutdown_sent = true;
        self.command = Command::shutdown();
        info!("Sending shutdown frame");
        self.write_command()?;
        Ok(true)
    }

    fn write_command(&mut self) -> Result<()> {
        let bytes = self.command.to_bytes();
        match self.link.write_all(&bytes) {
            Ok(()) => {
                self.stats.frames_sent += 1;
                debug!(
                    "Sent frame start=0x{:04X} steer={} speed={}",
                    self.command.start, self.command.steer, self.command.speed
                );
                Ok(())
            }
            Err(e) => {
                self.stats.write_errors += 1;
                Err(e)
            }
        }
    }

    /// Drain the bytes buffered right now through the parser.
    ///
    /// Returns the number of bytes consumed. Stops as soon as the buffered
    /// count is used up, even if more bytes arrive meanwhile. Frames committed
    /// during this drain are stamped with `now`.
    pub fn receive(&mut self, now: Instant, sink: &mut dyn FeedbackSink) -> Result<usize> {
        let mut remaining = self.link.bytes_to_read()?;
        let mut consumed = 0;
        let mut chunk = [0u8; DRAIN_CHUNK];

        while remaining > 0 {
            let want = remaining.min(DRAIN_CHUNK);
            let n = self.link.read(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                self.process_byte(byte, now, sink);
            }
            consumed += n;
            remaining -= n;
        }

        Ok(consumed)
    }

    fn process_byte(&mut self, byte: u8, now: Instant, sink: &mut dyn FeedbackSink) {
        match self.parser.push(byte) {
            Some(ParseEvent::Accepted(frame)) => {
                self.feedback = Some(frame);
                self.feedback_at = Some(now);
                self.stats.frames_accepted += 1;
                sink.on_feedback(&frame);
            }
            Some(ParseEvent::Rejected) => {
                self.stats.frames_rejected += 1;
                sink.on_rejected();
            }
            None => {}
        }
    }

    /// Most recent validated feedback frame
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// When the committed feedback was last replaced
    pub fn feedback_at(&self) -> Option<Instant> {
        self.feedback_at
    }

    pub fn shutdown_sent(&self) -> bool {
        self.shutdown_sent
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Receive cursor of the frame parser
    pub fn cursor(&self) -> usize {
        self.parser.cursor()
    }

    /// Underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hoverboard::mock::{MockLink, RecordingSink};
    use crate::hoverboard::protocol::{SHUTDOWN_FRAME, START_FRAME, WireFrame};

    fn telemetry() -> Feedback {
        Feedback {
            cmd1: 0,
            cmd2: 500,
            speed_r_meas: 48,
            speed_l_meas: -47,
            bat_voltage: 3910,
            board_temp: 301,
            cmd_led: 0,
            ..Default::default()
        }
        .sealed()
    }

    #[test]
    fn test_send_writes_one_frame() {
        let mut serial = HoverSerial::new(MockLink::new());
        serial.send(-120, 340).unwrap();

        let frames = serial.link().sent_commands();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].start, START_FRAME);
        assert_eq!(frames[0].steer, -120);
        assert_eq!(frames[0].speed, 340);
        assert!(frames[0].is_valid());
        assert_eq!(serial.link().writes(), 1);
        assert_eq!(serial.stats().frames_sent, 1);
    }

    #[test]
    fn test_send_failure_is_reported() {
        let mut serial = HoverSerial::new(MockLink::new());
        serial.link_mut().fail_writes(true);

        assert!(serial.send(0, 100).is_err());
        assert_eq!(serial.stats().write_errors, 1);
        assert_eq!(serial.stats().frames_sent, 0);

        // Link recovers on the next attempt
        serial.link_mut().fail_writes(false);
        serial.send(0, 100).unwrap();
        assert_eq!(serial.stats().frames_sent, 1);
    }

    #[test]
    fn test_shutdown_sent_once() {
        let mut serial = HoverSerial::new(MockLink::new());
        assert!(serial.send_shutdown().unwrap());
        assert!(!serial.send_shutdown().unwrap());

        let frames = serial.link().sent_commands();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].start, SHUTDOWN_FRAME);
        assert_eq!(frames[0].checksum, SHUTDOWN_FRAME);
        assert!(serial.shutdown_sent());
    }

    #[test]
    fn test_receive_commits_feedback() {
        let fb = telemetry();
        let mut serial = HoverSerial::new(MockLink::new());
        serial.link_mut().queue_rx(&[0x42, 0x99, 0x00]);
        serial.link_mut().queue_rx(&fb.to_bytes());

        let mut sink = RecordingSink::default();
        let now = Instant::now();
        let consumed = serial.receive(now, &mut sink).unwrap();

        assert_eq!(consumed, 3 + Feedback::SIZE);
        assert_eq!(sink.accepted, vec![fb]);
        assert_eq!(sink.rejected, 0);
        assert_eq!(serial.feedback(), Some(fb));
        assert_eq!(serial.feedback_at(), Some(now));
        assert_eq!(serial.cursor(), 0);
    }

    #[test]
    fn test_rejected_frame_keeps_previous_feedback() {
        let first = telemetry();
        let second = Feedback {
            speed_r_meas: 60,
            ..first
        }
        .sealed();

        let mut serial = HoverSerial::new(MockLink::new());
        let mut sink = RecordingSink::default();

        serial.link_mut().queue_rx(&first.to_bytes());
        serial.receive(Instant::now(), &mut sink).unwrap();

        let mut corrupt = second.to_bytes();
        corrupt[10] ^= 0x10;
        serial.link_mut().queue_rx(&corrupt);
        serial.receive(Instant::now(), &mut sink).unwrap();

        assert_eq!(sink.rejected, 1);
        assert_eq!(serial.feedback(), Some(first));
        assert_eq!(serial.stats().frames_rejected, 1);
    }

    #[test]
    fn test_frame_split_across_drains() {
        let fb = telemetry();
        let bytes = fb.to_bytes();
        let mut serial = HoverSerial::new(MockLink::new());
        let mut sink = RecordingSink::default();

        serial.link_mut().queue_rx(&bytes[..7]);
        assert_eq!(serial.receive(Instant::now(), &mut sink).unwrap(), 7);
        assert!(sink.accepted.is_empty());
        assert_eq!(serial.cursor(), 7);

        serial.link_mut().queue_rx(&bytes[7..]);
        serial.receive(Instant::now(), &mut sink).unwrap();
        assert_eq!(sink.accepted, vec![fb]);
    }

    #[test]
    fn test_receive_on_idle_link() {
        let mut serial = HoverSerial::new(MockLink::new());
        let mut sink = RecordingSink::default();
        assert_eq!(serial.receive(Instant::now(), &mut sink).unwrap(), 0);
        assert_eq!(serial.feedback(), None);
    }

    #[test]
    fn test_receive_drains_more_than_one_chunk() {
        let fb = telemetry();
        let mut serial = HoverSerial::new(MockLink::new());
        for _ in 0..10 {
            serial.link_mut().queue_rx(&fb.to_bytes());
        }
        let mut sink = RecordingSink::default();
        assert_eq!(serial.receive(Instant::now(), &mut sink).unwrap(), 10 * Feedback::SIZE);
        assert_eq!(sink.accepted.len(), 10);
    }
}
