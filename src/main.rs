//! Native Bluetooth HID Mouse Controller
//!
//! Presents the local machine as a Bluetooth mouse: BlueZ handles pairing
//! and the HID profile, evdev supplies the motion.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod cli;
use cli::{Cli, Commands};

mod commands;

use mouse_controller::config::ControllerConfig;
use mouse_controller::daemon;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(ControllerConfig::default_path);

    match cli.command {
        None => {
            run(config_path, None, None, None, false, false, Vec::new()).await?;
        }
        Some(Commands::Run {
            name,
            adapter,
            rate,
            grab,
            wait_input,
            devices,
        }) => {
            run(config_path, name, adapter, rate, grab, wait_input, devices).await?;
        }
        Some(Commands::ListInputs) => {
            commands::list_inputs()?;
        }
        Some(Commands::SdpRecord { name }) => {
            commands::sdp_record(&name)?;
        }
        Some(Commands::InitConfig { force }) => {
            commands::init_config(&config_path, force)?;
        }
    }

    Ok(())
}

async fn run(
    config_path: PathBuf,
    name: Option<String>,
    adapter: Option<String>,
    rate: Option<u32>,
    grab: bool,
    wait_input: bool,
    devices: Vec<PathBuf>,
) -> Result<()> {
    info!("Loading config from {:?}", config_path);
    let mut config = ControllerConfig::load(&config_path)?;

    if let Some(name) = name {
        config.device_name = name;
    }
    if let Some(adapter) = adapter {
        config.adapter = adapter;
    }
    if let Some(rate) = rate {
        config.report_rate_hz = rate;
    }
    if grab {
        config.grab_input = true;
    }
    if !devices.is_empty() {
        config.input_devices = devices;
    }

    daemon::run(config, wait_input).await
}
