// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mouse-controller")]
#[command(author, version, about = "Native Bluetooth HID mouse controller")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/mouse-controller/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the controller daemon (default)
    #[command(visible_alias = "r")]
    Run {
        /// Device name shown to hosts (adapter alias + SDP service name)
        #[arg(long)]
        name: Option<String>,

        /// Bluetooth adapter (e.g. hci0)
        #[arg(long)]
        adapter: Option<String>,

        /// Input report rate in Hz (10-1000)
        #[arg(long, value_parser = clap::value_parser!(u32).range(10..=1000))]
        rate: Option<u32>,

        /// Grab source devices exclusively (local cursor stops moving)
        #[arg(long)]
        grab: bool,

        /// Keep running when no pointer device is present yet
        #[arg(long)]
        wait_input: bool,

        /// Capture only this evdev device (repeatable)
        #[arg(long = "device", value_name = "PATH")]
        devices: Vec<PathBuf>,
    },

    /// List detected pointer devices
    #[command(visible_aliases = ["inputs", "li"])]
    ListInputs,

    /// Print the SDP service record registered with BlueZ
    #[command(visible_alias = "sdp")]
    SdpRecord {
        /// Service name to embed
        #[arg(long, default_value = "HID Mouse")]
        name: String,
    },

    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_invocation() {
        let cli = Cli::try_parse_from(["mouse-controller"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "mouse-controller",
            "run",
            "--name",
            "Desk Mouse",
            "--rate",
            "125",
            "--grab",
            "--device",
            "/dev/input/event3",
            "--device",
            "/dev/input/event7",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run {
                name,
                rate,
                grab,
                devices,
                ..
            }) => {
                assert_eq!(name.as_deref(), Some("Desk Mouse"));
                assert_eq!(rate, Some(125));
                assert!(grab);
                assert_eq!(devices.len(), 2);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn rejects_out_of_range_rate() {
        assert!(Cli::try_parse_from(["mouse-controller", "run", "--rate", "4000"]).is_err());
    }

    #[test]
    fn alias_resolves() {
        let cli = Cli::try_parse_from(["mouse-controller", "sdp"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::SdpRecord { .. })));
    }
}
