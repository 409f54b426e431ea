// Feedback monitor: READ-ONLY dump of hoverboard telemetry
//
// This tool never writes to the board. Use it first to check wiring and
// baud rate before running ramp_test or the runtime.
//
// Usage: cargo run --example feedback_monitor -- [port] [seconds]
// Example: cargo run --example feedback_monitor -- /dev/ttyUSB0 10

use hoverboard_bridge::config::DEFAULT_PORT;
use hoverboard_bridge::hoverboard::{HoverSerial, LogSink};
use std::thread::sleep;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?),
        )
        .init();

    // Get port and duration from args or use defaults
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let seconds: u64 = match std::env::args().nth(2) {
        Some(s) => s.parse()?,
        None => 5,
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Hoverboard Feedback Monitor (READ-ONLY)              ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  This tool only READS from the board - no commands sent      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Serial port: {}", port);
    println!();

    println!("Step 1: Opening serial port...");
    let mut serial = match HoverSerial::open(&port) {
        Ok(serial) => {
            println!("  ✓ Serial port opened successfully");
            serial
        }
        Err(e) => {
            println!("  ✗ Failed to open serial port: {}", e);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the port path is correct");
            println!("  - Verify TX/RX are crossed and GND is shared");
            println!("  - Check the board is built with FEEDBACK_SERIAL_USART2/3");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: Listening for {} seconds...", seconds);
    let mut sink = LogSink;
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut bytes = 0;
    while Instant::now() < deadline {
        bytes += serial.receive(Instant::now(), &mut sink)?;
        sleep(Duration::from_millis(5));
    }
    println!();

    let stats = serial.stats();
    println!("Step 3: Summary");
    println!("  Bytes received:  {}", bytes);
    println!("  Frames accepted: {}", stats.frames_accepted);
    println!("  Frames rejected: {}", stats.frames_rejected);
    println!();

    if stats.frames_accepted == 0 {
        println!("⚠ WARNING: No valid feedback frames received!");
        if bytes == 0 {
            println!("  - No bytes at all: check wiring and that the board is powered");
        } else {
            println!("  - Bytes arrive but never validate: check the baud rate");
        }
    } else {
        println!("Next step: Run 'cargo run --example ramp_test' with wheels OFF THE GROUND");
    }

    Ok(())
}
