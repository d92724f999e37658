//! swarm-tool: talk to a Swarm Tile or M138 over its serial interface

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use swarm_core::config::{DeviceConfig, DEFAULT_DEVICE_PATH};
use swarm_core::prelude::*;
use swarm_core::protocol::messages::{GeospatialInformation, Validity};
use swarm_core::transport::list_ports;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Query and configure a Swarm device over its serial interface",
    long_about = None
)]
struct Cli {
    /// Serial device node
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// JSON device configuration; --device overrides its path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read the device ID and kind (default)
    Configuration,
    /// Read the firmware version
    Version,
    /// Repeat the last date/time report, or query or set its rate
    DateTime(RateArgs),
    /// Repeat the last position report, or query or set its rate
    Position(RateArgs),
    /// Print messages from the device as they arrive
    Monitor {
        /// Stop after this many messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Send an arbitrary frame and print the next line
    Send {
        /// Message type code, e.g. RT
        message_type: String,
        /// Frame body
        body: Option<String>,
    },
    /// List serial ports
    Ports,
}

#[derive(Debug, Args)]
struct RateArgs {
    /// Set the report rate in seconds (0 disables)
    #[arg(long, conflicts_with = "query_rate")]
    rate: Option<u32>,
    /// Query the current report rate
    #[arg(long)]
    query_rate: bool,
}

#[derive(Debug, Clone, Copy)]
enum RateRequest {
    Repeat,
    Query,
    Set(u32),
}

impl RateArgs {
    fn request(&self) -> RateRequest {
        match (self.rate, self.query_rate) {
            (Some(rate), _) => RateRequest::Set(rate),
            (None, true) => RateRequest::Query,
            (None, false) => RateRequest::Repeat,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config: Option<&Path>, device: Option<&str>) -> Result<DeviceConfig> {
    let mut loaded = match config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DeviceConfig::default(),
    };
    if let Some(device) = device {
        loaded.path = device.to_string();
    }
    Ok(loaded)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_ports(json: bool) -> Result<()> {
    let ports = list_ports();
    if json {
        return print_json(&ports);
    }
    if ports.is_empty() {
        println!("No serial ports found (default is {DEFAULT_DEVICE_PATH})");
    }
    for port in ports {
        println!("{}\t{}", port.path, port.description());
    }
    Ok(())
}

fn print_date_time(response: &DateTimeResponse) {
    match response {
        DateTimeResponse::Ok => println!("OK"),
        DateTimeResponse::Error => println!("ERR"),
        DateTimeResponse::Rate(rate) => println!("rate: {rate}s"),
        DateTimeResponse::DateTime(at, validity) => {
            let flag = match validity {
                Validity::Valid => "valid",
                Validity::Invalid => "invalid",
            };
            println!("{} ({flag})", at.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
    }
}

fn print_position(info: &GeospatialInformation) {
    println!(
        "lat {:.4} lon {:.4} alt {} m course {} speed {} km/h",
        info.latitude, info.longitude, info.altitude, info.course, info.speed
    );
}

fn print_geospatial(response: &GeospatialResponse) {
    match response {
        GeospatialResponse::Ok => println!("OK"),
        GeospatialResponse::Error => println!("ERR"),
        GeospatialResponse::Rate(rate) => println!("rate: {rate}s"),
        GeospatialResponse::Information(info) => print_position(info),
    }
}

fn print_message(message: &Message) {
    match message {
        Message::DateTime(response) => print_date_time(response),
        Message::Geospatial(response) => print_geospatial(response),
        Message::Configuration(config) => println!("{} {}", config.kind, config.id),
        Message::FirmwareVersion(fw) => println!("{} built {}", fw.version, fw.date),
        Message::Other(frame) => println!("{frame}"),
    }
}

async fn run<S>(device: &mut Device<S>, command: Commands, json: bool) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match command {
        Commands::Configuration => {
            let config: DeviceConfiguration = device
                .request(&Frame::query(MessageType::CONFIGURATION))
                .await
                .context("Configuration request failed")?;
            if json {
                print_json(&config)?;
            } else {
                println!("device: {}", config.kind);
                println!("id:     {}", config.id);
            }
        }
        Commands::Version => {
            let fw: FirmwareVersion = device
                .request(&Frame::query(MessageType::FIRMWARE_VERSION))
                .await
                .context("Firmware version request failed")?;
            if json {
                print_json(&fw)?;
            } else {
                println!("version: {}", fw.version);
                println!("built:   {}", fw.date.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
        }
        Commands::DateTime(args) => {
            let command = match args.request() {
                RateRequest::Repeat => DateTimeCommand::Repeat,
                RateRequest::Query => DateTimeCommand::QueryRate,
                RateRequest::Set(rate) => DateTimeCommand::SetRate(rate),
            };
            let response: DateTimeResponse = device
                .request_message(&command)
                .await
                .context("Date/time request failed")?;
            if json {
                print_json(&response)?;
            } else {
                print_date_time(&response);
            }
        }
        Commands::Position(args) => {
            let command = match args.request() {
                RateRequest::Repeat => GeospatialCommand::Repeat,
                RateRequest::Query => GeospatialCommand::QueryRate,
                RateRequest::Set(rate) => GeospatialCommand::SetRate(rate),
            };
            let response: GeospatialResponse = device
                .request_message(&command)
                .await
                .context("Position request failed")?;
            if json {
                print_json(&response)?;
            } else {
                print_geospatial(&response);
            }
        }
        Commands::Monitor { count } => {
            let mut seen = 0;
            while count.map_or(true, |limit| seen < limit) {
                let message = match device.next_message().await {
                    Ok(message) => message,
                    Err(DeviceError::Transport(TransportError::Disconnected)) => break,
                    Err(e) => return Err(e).context("Failed to read from device"),
                };
                if json {
                    println!("{}", serde_json::to_string(&message)?);
                } else {
                    print_message(&message);
                }
                seen += 1;
            }
        }
        Commands::Send { message_type, body } => {
            let message_type = MessageType::new(message_type)?;
            let frame = Frame::new(message_type, body)?;
            device.send(&frame).await.context("Failed to send frame")?;
            let line = device.receive_line().await.context("No reply from device")?;
            println!("{line}");
        }
        Commands::Ports => print_ports(json)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Configuration);
    if let Commands::Ports = command {
        return print_ports(cli.json);
    }

    let config = load_config(cli.config.as_deref(), cli.device.as_deref())?;
    tracing::debug!("Device configuration: {:?}", config);
    open_and_run(&config, command, cli.json).await
}

#[cfg(unix)]
async fn open_and_run(config: &DeviceConfig, command: Commands, json: bool) -> Result<()> {
    let mut device = Device::open(config)
        .with_context(|| format!("Failed to open {}", config.path))?;
    let result = run(&mut device, command, json).await;
    device.close();
    result
}

#[cfg(not(unix))]
async fn open_and_run(_config: &DeviceConfig, _command: Commands, _json: bool) -> Result<()> {
    anyhow::bail!("serial devices are only supported on Unix platforms")
}
