// Keyboard teleop: WASD drive, space stop, X shutdown, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use hoverboard_bridge::config::TOPIC_CMD_DRIVE;
use hoverboard_bridge::messages::DriveCommand;

const INPUT_TIMEOUT_MS: u64 = 100; // Fall back to stop after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_DRIVE).await?;

    info!("Controls: W/S=forward/reverse, A/D=turn, SPACE=stop, X=shutdown, Q=quit");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut current = DriveCommand::Stop;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                let next = match code {
                    KeyCode::Char('w') if pressed => Some(DriveCommand::Forward),
                    KeyCode::Char('s') if pressed => Some(DriveCommand::Reverse),
                    KeyCode::Char('a') if pressed => Some(DriveCommand::Left),
                    KeyCode::Char('d') if pressed => Some(DriveCommand::Right),
                    KeyCode::Char('a') | KeyCode::Char('d') => Some(DriveCommand::Release),
                    KeyCode::Char(' ') if pressed => Some(DriveCommand::Stop),

                    KeyCode::Char('x') if pressed => {
                        info!("Sending shutdown");
                        publish(publisher, DriveCommand::Shutdown).await?;
                        break;
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => None,
                };

                if let Some(cmd) = next {
                    current = cmd;
                    last_movement_input = Instant::now();
                }
            }
        }

        // Stop if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            current = DriveCommand::Stop;
        }

        // Always publish at ~50Hz so the runtime watchdog stays fed
        publish(publisher, current).await?;
    }

    publish(publisher, DriveCommand::Stop).await?;
    Ok(())
}

async fn publish(
    publisher: &zenoh::pubsub::Publisher<'_>,
    cmd: DriveCommand,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    publisher.put(serde_json::to_string(&cmd)?).await?;
    Ok(())
}
