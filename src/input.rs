// Pointer input capture via evdev
// Relative motion and button state are accumulated between reports

use crate::report::{clamp_axis, MouseButton, MouseReport};
use evdev::{Device, InputEventKind, Key, RelativeAxisType};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from input capture
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to grab input device {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start capture thread for {path}: {source}")]
    Thread {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No pointer devices found under /dev/input")]
    NoDevices,
}

impl CaptureError {
    /// Whether waiting for a device to appear can resolve this error
    ///
    /// Covers an empty autodetect scan and an explicit source path that
    /// does not exist yet (e.g. a mouse plugged in after startup).
    pub fn is_waitable(&self) -> bool {
        match self {
            CaptureError::NoDevices => true,
            CaptureError::Open { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct Accumulated {
    dx: i32,
    dy: i32,
    wheel: i32,
    buttons: u8,
}

/// Pointer state shared between capture threads and the report pump
///
/// Motion accumulates as i32 so fast movement between ticks is not lost;
/// `drain` clamps each axis to the report range and carries the remainder
/// into the next report.
#[derive(Debug, Default)]
pub struct PointerState {
    inner: Mutex<Accumulated>,
}

impl PointerState {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add relative motion on one axis
    pub fn motion(&self, axis: RelativeAxisType, value: i32) {
        let mut acc = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match axis {
            RelativeAxisType::REL_X => acc.dx = acc.dx.saturating_add(value),
            RelativeAxisType::REL_Y => acc.dy = acc.dy.saturating_add(value),
            RelativeAxisType::REL_WHEEL => acc.wheel = acc.wheel.saturating_add(value),
            _ => {}
        }
    }

    /// Update the button mask
    pub fn button(&self, button: MouseButton, pressed: bool) {
        let mut acc = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if pressed {
            acc.buttons |= button.mask();
        } else {
            acc.buttons &= !button.mask();
        }
    }

    /// Take one report's worth of accumulated state
    pub fn drain(&self) -> MouseReport {
        let mut acc = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let dx = clamp_axis(acc.dx);
        let dy = clamp_axis(acc.dy);
        let wheel = clamp_axis(acc.wheel);
        acc.dx -= dx as i32;
        acc.dy -= dy as i32;
        acc.wheel -= wheel as i32;
        MouseReport {
            buttons: acc.buttons,
            dx,
            dy,
            wheel,
        }
    }
}

/// Map an evdev key code to a report button
fn button_for_key(key: Key) -> Option<MouseButton> {
    match key {
        Key::BTN_LEFT => Some(MouseButton::Left),
        Key::BTN_RIGHT => Some(MouseButton::Right),
        Key::BTN_MIDDLE => Some(MouseButton::Middle),
        _ => None,
    }
}

/// A relative pointer device is one that reports REL_X/REL_Y and BTN_LEFT
fn is_pointer(device: &Device) -> bool {
    let has_rel = device
        .supported_relative_axes()
        .map(|axes| {
            axes.contains(RelativeAxisType::REL_X) && axes.contains(RelativeAxisType::REL_Y)
        })
        .unwrap_or(false);
    let has_button = device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_LEFT))
        .unwrap_or(false);
    has_rel && has_button
}

/// Scan /dev/input for relative pointer devices
pub fn find_pointer_devices() -> Vec<(PathBuf, String)> {
    let mut found: Vec<(PathBuf, String)> = evdev::enumerate()
        .filter(|(_, device)| is_pointer(device))
        .map(|(path, device)| {
            let name = device.name().unwrap_or("Unknown").to_string();
            (path, name)
        })
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

/// Spawn a capture thread per source device
///
/// Explicit paths are opened as given; an empty list autodetects. With
/// `grab` set the devices are grabbed exclusively so captured motion does
/// not also drive the local cursor.
///
/// Returns the number of devices being captured.
pub fn spawn_capture(
    state: Arc<PointerState>,
    explicit: &[PathBuf],
    grab: bool,
) -> Result<usize, CaptureError> {
    let paths: Vec<PathBuf> = if explicit.is_empty() {
        find_pointer_devices().into_iter().map(|(p, _)| p).collect()
    } else {
        explicit.to_vec()
    };

    if paths.is_empty() {
        return Err(CaptureError::NoDevices);
    }

    for path in &paths {
        let mut device = Device::open(path).map_err(|source| CaptureError::Open {
            path: path.clone(),
            source,
        })?;
        if grab {
            device.grab().map_err(|source| CaptureError::Grab {
                path: path.clone(),
                source,
            })?;
        }
        info!(
            "Capturing {} ({})",
            path.display(),
            device.name().unwrap_or("Unknown")
        );

        let state = Arc::clone(&state);
        let thread_path = path.clone();
        std::thread::Builder::new()
            .name("pointer-capture".into())
            .spawn(move || capture_loop(device, state, &thread_path))
            .map_err(|source| CaptureError::Thread {
                path: path.clone(),
                source,
            })?;
    }

    Ok(paths.len())
}

/// Blocking read loop for one source device
///
/// Ends when the device goes away (unplug); other sources keep feeding
/// the shared state.
fn capture_loop(mut device: Device, state: Arc<PointerState>, path: &Path) {
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Input device {} lost: {e}", path.display());
                return;
            }
        };
        for event in events {
            match event.kind() {
                InputEventKind::RelAxis(axis) => state.motion(axis, event.value()),
                InputEventKind::Key(key) => {
                    if let Some(button) = button_for_key(key) {
                        // value 2 is autorepeat, which buttons do not emit
                        state.button(button, event.value() != 0);
                    }
                }
                _ => {}
            }
        }
    }
}
