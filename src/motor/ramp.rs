// Triangle-wave speed test signal for bench testing a board
//
// Steer stays 0 while speed climbs by `step` per send and reverses direction
// at +/- `max`. Run with the wheels off the ground.

use crate::hoverboard::CommandSource;

pub const DEFAULT_RAMP_MAX: i16 = 1000;
pub const DEFAULT_RAMP_STEP: i16 = 40;

#[derive(Debug, Clone)]
pub struct SpeedRamp {
    value: i16,
    step: i16,
    max: i16,
}

impl SpeedRamp {
    pub fn new(max: i16, step: i16) -> Self {
        Self {
            value: 0,
            step,
            max: max.saturating_abs(),
        }
    }

    /// Speed the next send will use
    pub fn value(&self) -> i16 {
        self.value
    }
}

impl Default for SpeedRamp {
    fn default() -> Self {
        Self::new(DEFAULT_RAMP_MAX, DEFAULT_RAMP_STEP)
    }
}

impl CommandSource for SpeedRamp {
    fn next_command(&mut self) -> (i16, i16) {
        let speed = self.value;
        self.value = self.value.saturating_add(self.step);
        if self.value >= self.max || self.value <= -self.max {
            self.step = -self.step;
        }
        (0, speed)
    }
}
