// Fixed-rate loop bridging zenoh topics to the hoverboard link
// Note: the command watchdog stops the base if teleop goes quiet; stale
// feedback only changes the published health, the link keeps sending.

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::hoverboard::{Feedback, FeedbackSink, SerialLink, TickReport};
use crate::messages::{DistanceReading, DriveCommand, FeedbackReport, RuntimeHealth};
use crate::motor::LatestDistance;

/// Collects committed frames between publishes
#[derive(Debug, Default)]
pub struct TelemetryBuffer {
    reports: Vec<FeedbackReport>,
    rejected: u64,
}

impl TelemetryBuffer {
    /// Take the buffered reports
    pub fn drain(&mut self) -> Vec<FeedbackReport> {
        std::mem::take(&mut self.reports)
    }

    /// Total frames rejected so far
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl FeedbackSink for TelemetryBuffer {
    fn on_feedback(&mut self, feedback: &Feedback) {
        debug!("Feedback: {:?}", feedback);
        self.reports.push(FeedbackReport::from(feedback));
    }

    fn on_rejected(&mut self) {
        self.rejected += 1;
        debug!("Non-valid data skipped ({} total)", self.rejected);
    }
}

pub struct Runtime<L: SerialLink> {
    bridge: Bridge<L, LatestDistance>,
    cmd_timeout: Option<Duration>,
    feedback_timeout: Duration,
    sensor_timeout: Duration,
    cmd_received_at: Option<Instant>,
    distance_received_at: Option<Instant>,
    health: RuntimeHealth,
    shutdown_requested: bool,
}

impl<L: SerialLink> Runtime<L> {
    pub fn new(bridge: Bridge<L, LatestDistance>, config: &BridgeConfig) -> Self {
        Self {
            bridge,
            cmd_timeout: config.cmd_timeout(),
            feedback_timeout: config.feedback_timeout(),
            sensor_timeout: config.sensor_timeout(),
            cmd_received_at: None,
            distance_received_at: None,
            health: RuntimeHealth::FeedbackStale, // Start stale until first frame
            shutdown_requested: false,
        }
    }

    /// Process incoming command
    pub fn on_command(&mut self, cmd: DriveCommand, now: Instant) {
        debug!("Received command: {:?}", &cmd);
        self.cmd_received_at = Some(now);

        match cmd {
            DriveCommand::Values { left, right } => self.bridge.set_values(left, right),
            DriveCommand::Shutdown => {
                info!("Shutdown requested");
                self.shutdown_requested = true;
            }
            _ => {
                if let Some(direction) = cmd.direction() {
                    self.bridge.drive(direction);
                }
            }
        }
    }

    /// Store the latest proximity reading for the safety check
    pub fn on_distance(&mut self, reading: DistanceReading, now: Instant) {
        self.distance_received_at = Some(now);
        self.bridge
            .router_mut()
            .sensor_mut()
            .update(reading.distance_cm);
    }

    /// Drop a reading the sensor node stopped refreshing
    fn expire_distance(&mut self, now: Instant) {
        let Some(at) = self.distance_received_at else {
            return;
        };
        if now.saturating_duration_since(at) > self.sensor_timeout {
            warn!("No distance reading for {:?}, treating as no reading", self.sensor_timeout);
            self.bridge.router_mut().sensor_mut().clear();
            self.distance_received_at = None;
        }
    }

    fn cmd_stale(&self, now: Instant) -> bool {
        let Some(timeout) = self.cmd_timeout else {
            return false;
        };
        match self.cmd_received_at {
            Some(at) => now.saturating_duration_since(at) > timeout,
            None => true,
        }
    }

    fn feedback_stale(&self, now: Instant) -> bool {
        match self.bridge.serial().feedback_at() {
            Some(at) => now.saturating_duration_since(at) > self.feedback_timeout,
            None => true,
        }
    }

    /// Apply the watchdog, then advance the link
    pub fn tick(&mut self, now: Instant, sink: &mut dyn FeedbackSink) -> TickReport {
        self.expire_distance(now);

        let cmd_stale = self.cmd_stale(now);
        if cmd_stale {
            // Watchdog triggered - hold the base still
            if self.health != RuntimeHealth::CmdStale && self.bridge.router().values() != (0, 0) {
                warn!("Command stale, stopping base");
            }
            self.bridge.stop();
        }

        let report = self.bridge.tick(now, sink);
        self.health = self.compute_health(now, cmd_stale);
        report
    }

    fn compute_health(&self, now: Instant, cmd_stale: bool) -> RuntimeHealth {
        if self.feedback_stale(now) {
            if self.health != RuntimeHealth::FeedbackStale {
                warn!("No valid feedback for {:?}", self.feedback_timeout);
            }
            RuntimeHealth::FeedbackStale
        } else if cmd_stale {
            RuntimeHealth::CmdStale
        } else {
            RuntimeHealth::Ok
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Send the shutdown frame (once)
    pub fn shutdown(&mut self) {
        match self.bridge.shutdown() {
            Ok(true) => info!("Shutdown frame sent"),
            Ok(false) => debug!("Shutdown frame already sent"),
            Err(e) => warn!("Failed to send shutdown frame: {}", e),
        }
    }

    pub fn bridge(&self) -> &Bridge<L, LatestDistance> {
        &self.bridge
    }
}

pub async fn run(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    config.validate()?;

    info!("Opening hoverboard link on {}...", config.port);
    let bridge = Bridge::open(&config, LatestDistance::new())?;
    let mut runtime = Runtime::new(bridge, &config);

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_cmd = session.declare_subscriber(config.topic_cmd.as_str()).await?;
    let sub_distance = session
        .declare_subscriber(config.topic_distance.as_str())
        .await?;
    let pub_feedback = session
        .declare_publisher(config.topic_feedback.clone())
        .await?;
    let pub_health = session.declare_publisher(config.topic_health.clone()).await?;

    let mut tick = interval(config.loop_period());
    let mut telemetry = TelemetryBuffer::default();

    info!(
        "Runtime started: {}Hz loop, {}ms send interval, {}ms watchdog timeout",
        config.loop_hz, config.send_interval_ms, config.cmd_timeout_ms
    );
    info!("Subscribed to: {}, {}", config.topic_cmd, config.topic_distance);
    info!("Publishing to: {}, {}", config.topic_feedback, config.topic_health);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }

        // 1. Drain all pending commands (non-blocking)
        while let Ok(Some(sample)) = sub_cmd.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd, Instant::now()),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Keep only the newest distance reading
        while let Ok(Some(sample)) = sub_distance.try_recv() {
            let payload = sample.payload().to_bytes();
            match DistanceReading::from_payload(&payload) {
                Ok(reading) => runtime.on_distance(reading, Instant::now()),
                Err(e) => warn!("Failed to parse distance reading: {}", e),
            }
        }

        if runtime.shutdown_requested() {
            break;
        }

        // 3. Drain the serial link, send if due (includes watchdog + safety)
        let report = runtime.tick(Instant::now(), &mut telemetry);

        // 4. Publish feedback frames
        for fb in telemetry.drain() {
            pub_feedback.put(serde_json::to_string(&fb)?).await?;
        }

        // 5. Publish health at send cadence
        if report.sent {
            let health_json = serde_json::to_string(&runtime.health())?;
            pub_health.put(health_json).await?;
        }
    }

    runtime.shutdown();
    Ok(())
}
