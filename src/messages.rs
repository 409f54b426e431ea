// Define message types exchanged over zenoh

use serde::{Deserialize, Serialize};

use crate::hoverboard::Feedback;
use crate::motor::Direction;

// Command from teleop/scripts -> runtime
// Tagged by "cmd", e.g. {"cmd":"forward"} or {"cmd":"values","left":100,"right":-100}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriveCommand {
    Forward,
    Reverse,
    Left,
    Right,
    Stop,
    Release,
    Values { left: i16, right: i16 },
    Shutdown,
}

impl DriveCommand {
    /// Fixed directional intent, if this is one
    pub fn direction(&self) -> Option<Direction> {
        match self {
            DriveCommand::Forward => Some(Direction::Forward),
            DriveCommand::Reverse => Some(Direction::Reverse),
            DriveCommand::Left => Some(Direction::Left),
            DriveCommand::Right => Some(Direction::Right),
            DriveCommand::Stop => Some(Direction::Stop),
            DriveCommand::Release => Some(Direction::Release),
            DriveCommand::Values { .. } | DriveCommand::Shutdown => None,
        }
    }
}

// Proximity reading from the sensor node -> runtime
// Sent as a bare JSON integer (cm); <= 0 means no valid reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceReading {
    pub distance_cm: i32,
}

impl DistanceReading {
    /// Parse a raw distance payload
    pub fn from_payload(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}

// Board telemetry from runtime -> subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub cmd1: i16,
    pub cmd2: i16,
    pub speed_r_meas: i16,
    pub speed_l_meas: i16,
    pub bat_voltage: u16,
    pub board_temp: i16,
    pub cmd_led: u16,
}

impl From<&Feedback> for FeedbackReport {
    fn from(fb: &Feedback) -> Self {
        Self {
            cmd1: fb.cmd1,
            cmd2: fb.cmd2,
            speed_r_meas: fb.speed_r_meas,
            speed_l_meas: fb.speed_l_meas,
            bat_voltage: fb.bat_voltage,
            board_temp: fb.board_temp,
            cmd_led: fb.cmd_led,
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
    FeedbackStale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drive_commands() {
        let cmd: DriveCommand = serde_json::from_str(r#"{"cmd":"forward"}"#).unwrap();
        assert_eq!(cmd, DriveCommand::Forward);
        assert_eq!(cmd.direction(), Some(Direction::Forward));

        let cmd: DriveCommand =
            serde_json::from_str(r#"{"cmd":"values","left":120,"right":-80}"#).unwrap();
        assert_eq!(cmd, DriveCommand::Values { left: 120, right: -80 });
        assert_eq!(cmd.direction(), None);

        let cmd: DriveCommand = serde_json::from_str(r#"{"cmd":"shutdown"}"#).unwrap();
        assert_eq!(cmd, DriveCommand::Shutdown);
    }

    #[test]
    fn test_reject_unknown_command() {
        assert!(serde_json::from_str::<DriveCommand>(r#"{"cmd":"jump"}"#).is_err());
        // Out of i16 range
        assert!(
            serde_json::from_str::<DriveCommand>(r#"{"cmd":"values","left":40000,"right":0}"#)
                .is_err()
        );
    }

    #[test]
    fn test_distance_is_bare_integer() {
        let reading = DistanceReading::from_payload(b"15").unwrap();
        assert_eq!(reading, DistanceReading { distance_cm: 15 });
        assert_eq!(DistanceReading::from_payload(b"-1").unwrap().distance_cm, -1);
        assert_eq!(serde_json::to_string(&reading).unwrap(), "15");
        assert!(DistanceReading::from_payload(br#"{"distance_cm":15}"#).is_err());
    }

    #[test]
    fn test_health_serialization() {
        assert_eq!(
            serde_json::to_string(&RuntimeHealth::FeedbackStale).unwrap(),
            r#""feedback_stale""#
        );
    }

    #[test]
    fn test_feedback_report_from_frame() {
        let fb = Feedback {
            speed_r_meas: 10,
            speed_l_meas: -10,
            bat_voltage: 3600,
            board_temp: 290,
            ..Default::default()
        }
        .sealed();
        let report = FeedbackReport::from(&fb);
        assert_eq!(report.bat_voltage, 3600);
        assert_eq!(report.speed_l_meas, -10);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["board_temp"], 290);
    }
}
