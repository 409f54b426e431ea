// Ramp test: sweeps speed up and down on the hoverboard
//
// IMPORTANT: Run feedback_monitor FIRST to verify read-only communication.
//
// Usage: cargo run --example ramp_test -- [port] [seconds]
// Example: cargo run --example ramp_test -- /dev/ttyUSB0 20
//
// Safety features:
// - Explicit confirmation before any writes
// - Starts at zero speed
// - Shutdown frame sent on exit

use hoverboard_bridge::config::DEFAULT_PORT;
use hoverboard_bridge::hoverboard::{HoverSerial, LinkScheduler, LogSink};
use hoverboard_bridge::motor::SpeedRamp;
use std::io::{self, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?),
        )
        .init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let seconds: u64 = match std::env::args().nth(2) {
        Some(s) => s.parse()?,
        None => 10,
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           Hoverboard Ramp Test (WITH WRITES)                 ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  ⚠  This tool WILL drive the wheels up to speed 1000!        ║");
    println!("║  ⚠  Make sure wheels are OFF THE GROUND before proceeding!   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Serial port: {}", port);
    println!();

    if !confirm("Have you run feedback_monitor first and seen valid frames?")? {
        println!(
            "Please run: cargo run --example feedback_monitor -- {}",
            port
        );
        return Ok(());
    }

    if !confirm("Are the wheels OFF THE GROUND?")? {
        println!("Please elevate the board so the wheels can spin freely.");
        return Ok(());
    }

    println!();
    println!("Opening serial port...");
    let mut serial = HoverSerial::open(&port)?;
    println!("✓ Connected");
    println!();

    let mut scheduler = LinkScheduler::default();
    let mut ramp = SpeedRamp::default();
    let mut sink = LogSink;

    println!("Running ramp for {} seconds (Ctrl+C to abort)...", seconds);
    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        scheduler.tick(Instant::now(), &mut serial, &mut ramp, &mut sink);
        sleep(Duration::from_millis(5));
    }

    println!();
    println!("Stopping...");
    serial.send(0, 0)?;
    serial.send_shutdown()?;
    println!("  ✓ Shutdown frame sent");

    let stats = serial.stats();
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Test Complete!                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!(
        "Frames sent: {}, feedback accepted: {}, rejected: {}",
        stats.frames_sent, stats.frames_accepted, stats.frames_rejected
    );
    println!("You can now try the full runtime with: cargo run");

    Ok(())
}
