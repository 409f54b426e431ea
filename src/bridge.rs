// High-level bridge between host commands and the hoverboard
//
// Owns the serial transport, the command router and the send scheduler, so
// all link state lives in one place and is advanced by `tick`.

use serialport::SerialPort;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::BridgeConfig;
use crate::hoverboard::transport::Result;
use crate::hoverboard::{Feedback, FeedbackSink, HoverSerial, LinkScheduler, SerialLink, TickReport};
use crate::motor::{CommandRouter, Direction, DistanceSensor};

pub struct Bridge<L: SerialLink, S: DistanceSensor> {
    serial: HoverSerial<L>,
    router: CommandRouter<S>,
    scheduler: LinkScheduler,
}

impl<S: DistanceSensor> Bridge<Box<dyn SerialPort>, S> {
    /// Open the configured serial port
    pub fn open(config: &BridgeConfig, sensor: S) -> Result<Self> {
        let serial = HoverSerial::open_with_baudrate(&config.port, config.baud_rate)?;
        Ok(Self::with_config(serial, sensor, config))
    }
}

impl<L: SerialLink, S: DistanceSensor> Bridge<L, S> {
    pub fn new(serial: HoverSerial<L>, router: CommandRouter<S>, scheduler: LinkScheduler) -> Self {
        Self {
            serial,
            router,
            scheduler,
        }
    }

    pub fn with_config(serial: HoverSerial<L>, sensor: S, config: &BridgeConfig) -> Self {
        info!(
            "Bridge: send every {}ms, safety distance {}cm",
            config.send_interval_ms, config.safety_distance_cm
        );
        Self::new(
            serial,
            CommandRouter::with_safety_distance(sensor, config.safety_distance_cm),
            LinkScheduler::new(config.send_interval()),
        )
    }

    /// Drain feedback and send the current command if due
    pub fn tick(&mut self, now: Instant, sink: &mut dyn FeedbackSink) -> TickReport {
        self.scheduler
            .tick(now, &mut self.serial, &mut self.router, sink)
    }

    pub fn drive(&mut self, direction: Direction) {
        self.router.drive(direction);
    }

    pub fn set_values(&mut self, left: i16, right: i16) {
        self.router.set_values(left, right);
    }

    pub fn stop(&mut self) {
        self.router.stop();
    }

    /// Zero the target and send the one-shot shutdown frame
    pub fn shutdown(&mut self) -> Result<bool> {
        self.router.stop();
        self.serial.send_shutdown()
    }

    /// Most recent validated feedback
    pub fn feedback(&self) -> Option<Feedback> {
        self.serial.feedback()
    }

    pub fn serial(&self) -> &HoverSerial<L> {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut HoverSerial<L> {
        &mut self.serial
    }

    pub fn router(&self) -> &CommandRouter<S> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut CommandRouter<S> {
        &mut self.router
    }
}

impl<L: SerialLink, S: DistanceSensor> Drop for Bridge<L, S> {
    fn drop(&mut self) {
        // Best-effort stop signal to the board
        if let Err(e) = self.shutdown() {
            warn!("Failed to send shutdown on drop: {}", e);
        }
    }
}
