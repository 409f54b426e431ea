use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hoverboard_bridge::config::{BridgeConfig, ConfigError};

/// Bridge zenoh drive commands to a hoverboard board over serial
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file (missing fields use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port connected to the board
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Milliseconds between command frames
    #[arg(long)]
    send_interval_ms: Option<u64>,

    /// Obstacle distance (cm) below which forward motion is blocked
    #[arg(long)]
    safety_distance: Option<i32>,
}

impl Args {
    fn into_config(self) -> Result<BridgeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(ms) = self.send_interval_ms {
            config.send_interval_ms = ms;
        }
        if let Some(cm) = self.safety_distance {
            config.safety_distance_cm = cm;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = hoverboard_bridge::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
