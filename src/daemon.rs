//! Controller daemon — BlueZ registration + input capture + report pump.

use crate::bluez::{self, Agent, Profile};
use crate::config::ControllerConfig;
use crate::input::{self, PointerState};
use crate::session::{ControlOutcome, SessionRegistry, SharedSessions};
use anyhow::Context;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Run the controller daemon (blocking until Ctrl-C).
///
/// This function:
/// - Serves the pairing agent and HID profile on the system bus
/// - Registers both with BlueZ and configures the adapter
/// - Captures pointer input from evdev sources
/// - Pumps input reports to the connected host at the configured rate
pub async fn run(config: ControllerConfig, wait_input: bool) -> anyhow::Result<()> {
    let pointer = PointerState::shared();
    let sessions: SharedSessions = SessionRegistry::shared();

    // Input capture first: failing on a missing mouse before touching
    // BlueZ gives the clearest error.
    match input::spawn_capture(Arc::clone(&pointer), &config.input_devices, config.grab_input) {
        Ok(count) => info!("Capturing {count} pointer device(s)"),
        Err(e) if wait_input && e.is_waitable() => {
            warn!("{e}; reports will be idle until a source appears");
            spawn_input_watch(
                Arc::clone(&pointer),
                config.input_devices.clone(),
                config.grab_input,
            );
        }
        Err(e) => return Err(e).context("input capture"),
    }

    let conn = zbus::connection::Builder::system()?
        .serve_at(bluez::AGENT_PATH, Agent)?
        .serve_at(bluez::PROFILE_PATH, Profile::new(Arc::clone(&sessions)))?
        .build()
        .await
        .context("connect to system bus")?;

    let adapter = bluez::adapter::prepare(&conn, &config)
        .await
        .context("prepare adapter")?;
    bluez::register_agent(&conn)
        .await
        .context("register pairing agent")?;
    bluez::register_profile(&conn, &config)
        .await
        .context("register HID profile")?;

    info!(
        "HID profile registered; pair a host with \"{}\"",
        config.device_name
    );
    info!("Report rate: {} Hz. Ctrl+C to stop.", config.effective_rate());

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("install Ctrl-C handler")?;

    let mut interval = tokio::time::interval(config.report_period());
    // The host needs one final zero-motion report after activity stops,
    // then silence until something moves again.
    let mut idle_sent = true;

    while running.load(Ordering::SeqCst) {
        interval.tick().await;

        let report = pointer.drain();
        let mut registry = sessions.lock().await;
        let drop_session = {
            let Some(session) = registry.active_mut() else {
                continue;
            };

            match session.poll_control() {
                Ok(ControlOutcome::Idle) if session.is_connected() => {
                    let result = if !report.is_idle() {
                        idle_sent = false;
                        session.send_report(&report)
                    } else if !idle_sent {
                        idle_sent = true;
                        session.send_report(&report)
                    } else {
                        Ok(())
                    };
                    match result {
                        Ok(()) => false,
                        Err(e) => {
                            // The host went away mid-send; keep running and
                            // wait for BlueZ to hand us the next connection.
                            warn!("Session lost: {e}");
                            true
                        }
                    }
                }
                // Control channel up, interrupt channel still connecting.
                Ok(ControlOutcome::Idle) => false,
                Ok(ControlOutcome::Disconnect) => true,
                Err(e) => {
                    warn!("Control channel failure: {e}");
                    true
                }
            }
        };

        if drop_session {
            registry.close();
            idle_sent = true;
        }
    }

    info!("Shutting down");
    sessions.lock().await.close();
    bluez::unregister_profile(&conn).await.ok();
    bluez::unregister_agent(&conn).await.ok();
    bluez::adapter::wind_down(&adapter).await;
    drop(conn);
    Ok(())
}

/// Poll for pointer devices appearing after startup (`--wait-input`)
///
/// Retries the same source selection as the startup attempt, so an
/// explicitly named device that shows up later is still picked up.
fn spawn_input_watch(pointer: Arc<PointerState>, devices: Vec<PathBuf>, grab: bool) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            match input::spawn_capture(Arc::clone(&pointer), &devices, grab) {
                Ok(count) => {
                    info!("Pointer device(s) appeared, capturing {count}");
                    return;
                }
                Err(e) if e.is_waitable() => continue,
                Err(e) => {
                    warn!("Input watch gave up: {e}");
                    return;
                }
            }
        }
    });
}
