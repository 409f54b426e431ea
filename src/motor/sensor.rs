// Proximity sensor interface used by the safety override

/// Distance source polled once per scheduled send.
///
/// Returns a positive distance (cm) or a value <= 0 when there is no valid
/// reading.
pub trait DistanceSensor {
    fn read_distance(&mut self) -> i32;
}

/// No sensor fitted; never reports an obstacle
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl DistanceSensor for NoSensor {
    fn read_distance(&mut self) -> i32 {
        0
    }
}

/// Holds the latest reading pushed in from elsewhere (e.g. a subscriber)
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestDistance {
    value: i32,
}

impl LatestDistance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, distance: i32) {
        self.value = distance;
    }

    /// Drop the reading, e.g. when the sensor went quiet
    pub fn clear(&mut self) {
        self.value = 0;
    }
}

impl DistanceSensor for LatestDistance {
    fn read_distance(&mut self) -> i32 {
        self.value
    }
}

impl<F: FnMut() -> i32> DistanceSensor for F {
    fn read_distance(&mut self) -> i32 {
        self()
    }
}
