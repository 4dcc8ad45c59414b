//! # Ender CLI
//!
//! Command-line interface for streaming GCode to an Ender-3.
//!
//! ## Usage
//!
//! ```bash
//! # List serial ports and see which ones could be the printer
//! ender ports
//!
//! # Replay the moves of a GCode file at half size
//! ender print --scale 0.5 part.gcode
//!
//! # Force travel and cutting speeds
//! ender print --rapid-feedrate 6000 --move-feedrate 900 part.gcode
//!
//! # Write the resulting GCode to stdout instead of a printer
//! ender --output - print part.gcode
//!
//! # Send raw lines and show the replies
//! ender --port /dev/ttyUSB0 send "M115"
//!
//! # Where is the head?
//! ender position --json
//! ```
//!
//! Set `RUST_LOG=ender=debug` to see every line sent and received.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use ender::{
    Ender, EnderError, Settings,
    import::ImportOptions,
    transport::{FileTransport, discovery},
};

/// Ender - GCode streaming utility for Ender-3 printers
#[derive(Parser, Debug)]
#[command(name = "ender")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial port (skips auto-discovery)
    #[arg(long, global = true)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Write GCode to a file ("-" for stdout) instead of the printer
    #[arg(long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List serial ports
    Ports,

    /// Replay the G0/G1 moves of a GCode file
    Print {
        /// GCode file to replay
        file: PathBuf,

        /// Feed rate for every G0 move (mm/min)
        #[arg(long)]
        rapid_feedrate: Option<f64>,

        /// Feed rate for every G1 move (mm/min)
        #[arg(long)]
        move_feedrate: Option<f64>,

        /// Scale factor for X, Y and Z
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Flush but leave the connection open when done
        #[arg(long)]
        keep_connected: bool,
    },

    /// Send raw GCode lines and print the replies
    Send {
        /// Lines to send, in order
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Query the current position (M114)
    Position {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Home axes (G28); all axes when none are given
    Home {
        #[arg(long)]
        x: bool,
        #[arg(long)]
        y: bool,
        #[arg(long)]
        z: bool,
    },

    /// Print the effective settings as TOML
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), EnderError> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Ports => {
            let ports = discovery::describe_ports()?;
            if ports.is_empty() {
                println!("No serial ports found.");
            }
            for port in ports {
                let marker = if port.candidate { "*" } else { " " };
                println!("{} {:<24} {}", marker, port.name, port.kind);
            }
        }

        Commands::Print {
            file,
            rapid_feedrate,
            move_feedrate,
            scale,
            keep_connected,
        } => {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(EnderError::InvalidCommand(format!(
                    "scale must be a positive number (got {})",
                    scale
                )));
            }
            let options = ImportOptions {
                rapid_feedrate,
                move_feedrate,
                scale,
            };

            let mut ender = open_session(cli.output.as_deref(), &settings).await?;
            log::info!("Printing {} to {}", file.display(), ender.describe());
            ender.print_from_gcode(&file, &options).await?;
            ender.print(!keep_connected).await?;
            log::info!("Printed successfully!");
        }

        Commands::Send { lines } => {
            let mut ender = open_session(cli.output.as_deref(), &settings).await?;
            for line in &lines {
                for reply in ender.write(line).await? {
                    println!("{}", reply);
                }
            }
            ender.teardown().await?;
        }

        Commands::Position { json } => {
            let mut ender = open_session(cli.output.as_deref(), &settings).await?;
            let position = ender.get_position().await?;
            ender.teardown().await?;

            if json {
                let text = serde_json::to_string_pretty(&position)
                    .map_err(|e| EnderError::Protocol(e.to_string()))?;
                println!("{}", text);
            } else {
                println!("X:{} Y:{} Z:{}", position.x, position.y, position.z);
            }
        }

        Commands::Home { x, y, z } => {
            let mut ender = open_session(cli.output.as_deref(), &settings).await?;
            ender.home(x, y, z).await?;
            ender.teardown().await?;
        }

        Commands::Config => {
            print!("{}", settings.to_toml_string()?);
        }
    }

    Ok(())
}

/// Settings file (or defaults) with command-line overrides applied.
fn load_settings(cli: &Cli) -> Result<Settings, EnderError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(port) = &cli.port {
        settings.serial.port = Some(port.clone());
    }
    if let Some(baud) = cli.baud {
        settings.serial.baud_rate = baud;
    }
    settings.validate()?;
    Ok(settings)
}

/// Connect to the printer, or to a GCode file when `--output` is given.
async fn open_session(output: Option<&Path>, settings: &Settings) -> Result<Ender, EnderError> {
    let profile = settings.profile();
    match output {
        None => Ender::connect(settings).await,
        Some(path) if path == Path::new("-") => {
            let mut transport = FileTransport::stdout();
            transport.write_header().await?;
            Ender::with_transport(transport, profile).await
        }
        Some(path) => {
            let mut transport = FileTransport::create(path).await?;
            transport.write_header().await?;
            Ender::with_transport(transport, profile).await
        }
    }
}
