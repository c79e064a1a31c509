//! Command handlers for the CLI application.
//!
//! The daemon itself lives in the library (`daemon::run`); this module
//! holds the small utility commands.

use mouse_controller::config::ControllerConfig;
use mouse_controller::{input, sdp};
use std::path::Path;

/// Result type for command handlers
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// List detected relative pointer devices
pub fn list_inputs() -> CommandResult {
    let devices = input::find_pointer_devices();
    if devices.is_empty() {
        println!("No pointer devices found. Running as root, or in the 'input' group?");
        return Ok(());
    }
    println!("Pointer devices:");
    for (path, name) in devices {
        println!("  {} {}", path.display(), name);
    }
    Ok(())
}

/// Print the SDP record that would be registered with BlueZ
pub fn sdp_record(name: &str) -> CommandResult {
    print!("{}", sdp::service_record(name));
    Ok(())
}

/// Write a default config file
pub fn init_config(path: &Path, force: bool) -> CommandResult {
    if path.exists() && !force {
        eprintln!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    ControllerConfig::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
