// Byte-at-a-time frame parser with marker resynchronization
//
// Every incoming byte forms a 2-byte window with the previous byte. A window
// equal to START_FRAME restarts the frame at offset 2, wherever it appears in
// the stream. There is no byte stuffing, so a marker pattern inside a payload
// also restarts the frame; the board firmware expects exactly this behavior.

use std::marker::PhantomData;

use super::protocol::{MAX_FRAME_SIZE, START_FRAME, WireFrame};

/// Outcome of a completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEvent<F> {
    /// Marker and checksum valid
    Accepted(F),
    /// A full frame arrived but failed validation
    Rejected,
}

/// Incremental parser for one frame type
pub struct FrameParser<F: WireFrame> {
    staging: [u8; MAX_FRAME_SIZE],
    cursor: usize,
    prev: u8,
    _frame: PhantomData<F>,
}

impl<F: WireFrame> FrameParser<F> {
    pub fn new() -> Self {
        Self {
            staging: [0; MAX_FRAME_SIZE],
            cursor: 0,
            prev: 0,
            _frame: PhantomData,
        }
    }

    /// Feed one byte. Returns an event when a whole frame has been staged.
    pub fn push(&mut self, byte: u8) -> Option<ParseEvent<F>> {
        let window = u16::from_le_bytes([self.prev, byte]);

        if window == START_FRAME {
            self.staging = [0; MAX_FRAME_SIZE];
            self.staging[0] = self.prev;
            self.staging[1] = byte;
            self.cursor = 2;
        } else if (2..F::SIZE).contains(&self.cursor) {
            self.staging[self.cursor] = byte;
            self.cursor += 1;
        }

        let event = if self.cursor == F::SIZE {
            self.cursor = 0;
            Some(self.finish())
        } else {
            None
        };

        self.prev = byte;
        event
    }

    fn finish(&self) -> ParseEvent<F> {
        match F::decode(&self.staging[..F::SIZE]) {
            Some(frame) if frame.is_valid() => ParseEvent::Accepted(frame),
            _ => ParseEvent::Rejected,
        }
    }

    /// Bytes staged for the frame in progress (0 when no frame is open)
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<F: WireFrame> Default for FrameParser<F> {
    fn default() -> Self {
        Self::new()
    }
}
