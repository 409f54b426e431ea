// Motor command layer for the hoverboard base
//
// Provides:
// - Directional command router with proximity safety override
// - Distance sensor interface
// - Speed ramp test signal

pub mod ramp;
pub mod router;
pub mod sensor;

pub use ramp::SpeedRamp;
pub use router::{CommandRouter, DEFAULT_SAFETY_DISTANCE, Direction};
pub use sensor::{DistanceSensor, LatestDistance, NoSensor};
