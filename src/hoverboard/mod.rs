// Hoverboard serial link
//
// Provides:
// - Command/Feedback wire frames with XOR checksums
// - Resynchronizing byte-level frame parser
// - Non-blocking serial transport
// - Fixed-interval send scheduler

#[cfg(test)]
pub(crate) mod mock;
pub mod parser;
pub mod protocol;
pub mod scheduler;
pub mod transport;

pub use parser::{FrameParser, ParseEvent};
pub use protocol::{Command, Feedback, SHUTDOWN_FRAME, START_FRAME, WireFrame};
pub use scheduler::{CommandSource, DEFAULT_SEND_INTERVAL, LinkScheduler, TickReport};
pub use transport::{FeedbackSink, HoverError, HoverSerial, LinkStats, LogSink, SerialLink};
