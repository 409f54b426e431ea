// Directional commands with a proximity safety override
//
// Holds the target (steer, speed) pair sent on each scheduled cycle. Before a
// send, a reading inside the unsafe band zeroes every forward (positive)
// component. Reverse and negative turn components are left alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sensor::DistanceSensor;
use crate::hoverboard::CommandSource;

/// Readings below this distance (cm) block forward motion
pub const DEFAULT_SAFETY_DISTANCE: i32 = 30;

/// Command magnitude for straight driving
pub const DRIVE_VALUE: i16 = 500;

/// Command magnitude for turning on the spot
pub const TURN_VALUE: i16 = 250;

/// High-level driving intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
    Left,
    Right,
    Stop,
    /// Turn key released
    Release,
}

impl Direction {
    /// Fixed (left, right) pair for this intent
    pub fn values(self) -> (i16, i16) {
        match self {
            Direction::Forward => (DRIVE_VALUE, DRIVE_VALUE),
            Direction::Reverse => (-DRIVE_VALUE, -DRIVE_VALUE),
            Direction::Left => (-TURN_VALUE, TURN_VALUE),
            Direction::Right => (TURN_VALUE, -TURN_VALUE),
            Direction::Stop | Direction::Release => (0, 0),
        }
    }
}

pub struct CommandRouter<S: DistanceSensor> {
    sensor: S,
    safety_distance: i32,
    left: i16,
    right: i16,
    obstacle: bool,
}

impl<S: DistanceSensor> CommandRouter<S> {
    pub fn new(sensor: S) -> Self {
        Self::with_safety_distance(sensor, DEFAULT_SAFETY_DISTANCE)
    }

    pub fn with_safety_distance(sensor: S, safety_distance: i32) -> Self {
        Self {
            sensor,
            safety_distance,
            left: 0,
            right: 0,
            obstacle: false,
        }
    }

    /// Select one of the fixed directional commands
    pub fn drive(&mut self, direction: Direction) {
        debug!("Drive {:?}", direction);
        let (left, right) = direction.values();
        self.set_values(left, right);
    }

    /// Set raw values. `left` goes out as steer, `right` as speed.
    pub fn set_values(&mut self, left: i16, right: i16) {
        self.left = left;
        self.right = right;
    }

    pub fn stop(&mut self) {
        self.set_values(0, 0);
    }

    /// Current target (left, right)
    pub fn values(&self) -> (i16, i16) {
        (self.left, self.right)
    }

    /// Poll the sensor and clamp forward components if something is close.
    ///
    /// Returns true when the obstacle band was hit. The clamp overwrites the
    /// stored target, so forward motion stays off until commanded again.
    pub fn apply_safety(&mut self) -> bool {
        let distance = self.sensor.read_distance();
        let blocked = distance > 0 && distance < self.safety_distance;

        if blocked {
            if !self.obstacle {
                warn!("Obstacle at {} cm, blocking forward motion", distance);
            }
            self.left = self.left.min(0);
            self.right = self.right.min(0);
        } else if self.obstacle {
            info!("Obstacle cleared");
        }

        self.obstacle = blocked;
        blocked
    }

    /// Last safety check found an obstacle
    pub fn obstacle(&self) -> bool {
        self.obstacle
    }

    pub fn safety_distance(&self) -> i32 {
        self.safety_distance
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

impl<S: DistanceSensor> CommandSource for CommandRouter<S> {
    fn next_command(&mut self) -> (i16, i16) {
        self.apply_safety();
        self.values()
    }
}
