// Hoverboard USART frame layouts (hoverboard-firmware-hack-FOC)
//
// Frame format: fixed-size records of 16-bit little-endian fields,
// delimited by a start marker and closed by an XOR checksum.
// Command:  [start, steer, speed, checksum]                          = 8 bytes
// Feedback: [start, cmd1, cmd2, speedR, speedL, bat, temp, led, checksum] = 18 bytes

/// Start marker for normal command and feedback frames
pub const START_FRAME: u16 = 0xABCD;

/// Start marker for the one-shot shutdown command
pub const SHUTDOWN_FRAME: u16 = 0xCAFE;

/// Largest frame the parser has to stage
pub const MAX_FRAME_SIZE: usize = Feedback::SIZE;

const _: () = assert!(Command::SIZE <= MAX_FRAME_SIZE);

/// A fixed-layout frame exchanged over the serial link
pub trait WireFrame: Copy {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Start marker field
    fn start(&self) -> u16;

    /// Checksum field as carried on the wire
    fn checksum(&self) -> u16;

    /// XOR of every field preceding the checksum
    fn compute_checksum(&self) -> u16;

    /// Write the frame into `out`, which must hold at least `SIZE` bytes
    fn encode_into(&self, out: &mut [u8]);

    /// Read a frame from the first `SIZE` bytes, `None` if the slice is short
    fn decode(bytes: &[u8]) -> Option<Self>;

    /// Marker and checksum both check out
    fn is_valid(&self) -> bool {
        self.start() == START_FRAME && self.checksum() == self.compute_checksum()
    }
}

/// Outbound steering/speed command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Command {
    pub start: u16,
    pub steer: i16,
    pub speed: i16,
    pub checksum: u16,
}

impl Command {
    /// Build a normal command with a freshly computed checksum
    pub fn new(steer: i16, speed: i16) -> Self {
        Self::with_start(START_FRAME, steer, speed)
    }

    /// Build the shutdown command (zero steer/speed)
    pub fn shutdown() -> Self {
        Self::with_start(SHUTDOWN_FRAME, 0, 0)
    }

    fn with_start(start: u16, steer: i16, speed: i16) -> Self {
        let mut cmd = Self {
            start,
            steer,
            speed,
            checksum: 0,
        };
        cmd.checksum = cmd.compute_checksum();
        cmd
    }

    /// Encoded bytes, ready for a single write
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        self.encode_into(&mut out);
        out
    }
}

impl WireFrame for Command {
    const SIZE: usize = 8;

    fn start(&self) -> u16 {
        self.start
    }

    fn checksum(&self) -> u16 {
        self.checksum
    }

    fn compute_checksum(&self) -> u16 {
        self.start ^ self.steer as u16 ^ self.speed as u16
    }

    fn encode_into(&self, out: &mut [u8]) {
        put_u16(out, 0, self.start);
        put_u16(out, 2, self.steer as u16);
        put_u16(out, 4, self.speed as u16);
        put_u16(out, 6, self.checksum);
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            start: get_u16(bytes, 0),
            steer: get_u16(bytes, 2) as i16,
            speed: get_u16(bytes, 4) as i16,
            checksum: get_u16(bytes, 6),
        })
    }
}

/// Inbound telemetry frame reported by the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Feedback {
    pub start: u16,
    pub cmd1: i16,
    pub cmd2: i16,
    pub speed_r_meas: i16,
    pub speed_l_meas: i16,
    pub bat_voltage: u16,
    pub board_temp: i16,
    pub cmd_led: u16,
    pub checksum: u16,
}

impl Feedback {
    /// Fill in start marker and checksum for the given field values.
    /// The board builds its frames this way; used by tests and demos.
    pub fn sealed(mut self) -> Self {
        self.start = START_FRAME;
        self.checksum = self.compute_checksum();
        self
    }

    /// Encoded bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        self.encode_into(&mut out);
        out
    }
}

impl WireFrame for Feedback {
    const SIZE: usize = 18;

    fn start(&self) -> u16 {
        self.start
    }

    fn checksum(&self) -> u16 {
        self.checksum
    }

    fn compute_checksum(&self) -> u16 {
        self.start
            ^ self.cmd1 as u16
            ^ self.cmd2 as u16
            ^ self.speed_r_meas as u16
            ^ self.speed_l_meas as u16
            ^ self.bat_voltage
            ^ self.board_temp as u16
            ^ self.cmd_led
    }

    fn encode_into(&self, out: &mut [u8]) {
        put_u16(out, 0, self.start);
        put_u16(out, 2, self.cmd1 as u16);
        put_u16(out, 4, self.cmd2 as u16);
        put_u16(out, 6, self.speed_r_meas as u16);
        put_u16(out, 8, self.speed_l_meas as u16);
        put_u16(out, 10, self.bat_voltage);
        put_u16(out, 12, self.board_temp as u16);
        put_u16(out, 14, self.cmd_led);
        put_u16(out, 16, self.checksum);
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            start: get_u16(bytes, 0),
            cmd1: get_u16(bytes, 2) as i16,
            cmd2: get_u16(bytes, 4) as i16,
            speed_r_meas: get_u16(bytes, 6) as i16,
            speed_l_meas: get_u16(bytes, 8) as i16,
            bat_voltage: get_u16(bytes, 10),
            board_temp: get_u16(bytes, 12) as i16,
            cmd_led: get_u16(bytes, 14),
            checksum: get_u16(bytes, 16),
        })
    }
}

fn put_u16(out: &mut [u8], offset: usize, value: u16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn get_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}
