// Connected host session
// Owns the L2CAP control/interrupt fds BlueZ hands over per connection

use crate::hidp::{self, ControlMessage};
use crate::report::MouseReport;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Errors from session channel I/O
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Another host is already connected ({0})")]
    Busy(String),
    #[error("Session has no interrupt channel yet")]
    NotConnected,
    #[error("Control channel error: {0}")]
    Control(#[source] io::Error),
    #[error("Interrupt channel error: {0}")]
    Interrupt(#[source] io::Error),
}

/// What a control-channel poll decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Nothing session-ending happened
    Idle,
    /// Host requested virtual cable unplug or closed the channel
    Disconnect,
}

/// One bonded host, identified by its BlueZ device object path
///
/// The HID spec requires the control channel to connect before the
/// interrupt channel; fds are assigned to roles in arrival order.
pub struct HidSession {
    device: String,
    control: OwnedFd,
    interrupt: Option<OwnedFd>,
    protocol: u8,
}

impl HidSession {
    pub fn new(device: String, control: OwnedFd) -> Self {
        Self {
            device,
            control,
            interrupt: None,
            // HID devices start in report protocol after every connection.
            protocol: hidp::protocol_mode::REPORT,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Protocol mode negotiated via SET_PROTOCOL
    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    /// Both channels are up and input reports may flow
    pub fn is_connected(&self) -> bool {
        self.interrupt.is_some()
    }

    fn attach_interrupt(&mut self, fd: OwnedFd) {
        self.interrupt = Some(fd);
    }

    /// Send one input report on the interrupt channel
    ///
    /// Input reports are stateless, so a full socket buffer (EAGAIN)
    /// drops the frame rather than blocking the pump.
    pub fn send_report(&self, report: &MouseReport) -> Result<(), SessionError> {
        let interrupt = self.interrupt.as_ref().ok_or(SessionError::NotConnected)?;
        let result = if self.protocol == hidp::protocol_mode::BOOT {
            send_nonblocking(interrupt, &hidp::boot_input_report(report))
        } else {
            send_nonblocking(interrupt, &hidp::input_report(report))
        };
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!("interrupt channel full, dropping report");
                Ok(())
            }
            Err(e) => Err(SessionError::Interrupt(e)),
        }
    }

    /// Drain and answer pending control-channel messages
    pub fn poll_control(&mut self) -> Result<ControlOutcome, SessionError> {
        let mut buf = [0u8; 64];
        loop {
            let n = match recv_nonblocking(&self.control, &mut buf) {
                Ok(0) => {
                    info!("Control channel closed by {}", self.device);
                    return Ok(ControlOutcome::Disconnect);
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ControlOutcome::Idle)
                }
                Err(e) => return Err(SessionError::Control(e)),
            };

            match self.handle_control(&buf[..n])? {
                ControlOutcome::Idle => {}
                outcome => return Ok(outcome),
            }
        }
    }

    fn handle_control(&mut self, data: &[u8]) -> Result<ControlOutcome, SessionError> {
        let Some(message) = ControlMessage::parse(data) else {
            return Ok(ControlOutcome::Idle);
        };
        debug!("control message from {}: {message:?}", self.device);

        match message {
            ControlMessage::HidControl(hidp::control_op::VIRTUAL_CABLE_UNPLUG) => {
                info!("Virtual cable unplug from {}", self.device);
                return Ok(ControlOutcome::Disconnect);
            }
            ControlMessage::HidControl(_) => {
                // SUSPEND/EXIT_SUSPEND need no reply; the pump keeps running
                // and an idle host simply receives no frames.
            }
            ControlMessage::GetProtocol => {
                self.reply(&hidp::protocol_reply(self.protocol))?;
            }
            ControlMessage::SetProtocol(mode) => match mode {
                hidp::protocol_mode::BOOT | hidp::protocol_mode::REPORT => {
                    info!(
                        "Host {} switched to {} protocol",
                        self.device,
                        if mode == hidp::protocol_mode::BOOT {
                            "boot"
                        } else {
                            "report"
                        }
                    );
                    self.protocol = mode;
                    self.reply(&hidp::handshake_frame(hidp::handshake::SUCCESSFUL))?;
                }
                _ => {
                    self.reply(&hidp::handshake_frame(
                        hidp::handshake::ERR_INVALID_PARAMETER,
                    ))?;
                }
            },
            ControlMessage::SetReport(_) => {
                // A mouse has no output state to apply; acknowledge and move on.
                self.reply(&hidp::handshake_frame(hidp::handshake::SUCCESSFUL))?;
            }
            ControlMessage::GetReport(_) => {
                self.reply(&hidp::handshake_frame(
                    hidp::handshake::ERR_UNSUPPORTED_REQUEST,
                ))?;
            }
            ControlMessage::Handshake(result) => {
                debug!("handshake from host: 0x{result:x}");
            }
            ControlMessage::Data(_) => {}
            ControlMessage::Unknown(header) => {
                warn!("unsupported control transaction 0x{header:02x}");
                self.reply(&hidp::handshake_frame(
                    hidp::handshake::ERR_UNSUPPORTED_REQUEST,
                ))?;
            }
        }
        Ok(ControlOutcome::Idle)
    }

    fn reply(&self, frame: &[u8]) -> Result<(), SessionError> {
        match send_nonblocking(&self.control, frame) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(SessionError::Control(e)),
        }
    }
}

fn send_nonblocking(fd: &OwnedFd, buf: &[u8]) -> io::Result<usize> {
    let n = unsafe {
        libc::send(
            fd.as_raw_fd(),
            buf.as_ptr().cast(),
            buf.len(),
            libc::MSG_DONTWAIT,
        )
    };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

fn recv_nonblocking(fd: &OwnedFd, buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe {
        libc::recv(
            fd.as_raw_fd(),
            buf.as_mut_ptr().cast(),
            buf.len(),
            libc::MSG_DONTWAIT,
        )
    };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Single active session slot shared between the D-Bus profile handler
/// and the report pump
pub type SharedSessions = Arc<Mutex<SessionRegistry>>;

#[derive(Default)]
pub struct SessionRegistry {
    active: Option<HidSession>,
}

impl SessionRegistry {
    pub fn shared() -> SharedSessions {
        Arc::new(Mutex::new(SessionRegistry::default()))
    }

    /// Accept a channel fd delivered by BlueZ for `device`
    ///
    /// First fd for a device opens the session (control channel); the
    /// second completes it (interrupt channel). A reconnecting device
    /// replaces its old session; a different device is refused while a
    /// session is live.
    pub fn offer_channel(&mut self, device: &str, fd: OwnedFd) -> Result<(), SessionError> {
        match &mut self.active {
            None => {
                info!("Control channel connected: {device}");
                self.active = Some(HidSession::new(device.to_string(), fd));
                Ok(())
            }
            Some(session) if session.device() == device => {
                if session.is_connected() {
                    // Stale session from a host that reconnected without a
                    // clean teardown; start over with this fd as control.
                    info!("Replacing stale session for {device}");
                    self.active = Some(HidSession::new(device.to_string(), fd));
                } else {
                    info!("Interrupt channel connected: {device}");
                    session.attach_interrupt(fd);
                }
                Ok(())
            }
            Some(session) => Err(SessionError::Busy(session.device().to_string())),
        }
    }

    /// Drop the session for `device` if it is the active one
    pub fn disconnect(&mut self, device: &str) {
        if self
            .active
            .as_ref()
            .is_some_and(|s| s.device() == device)
        {
            info!("Disconnected: {device}");
            self.active = None;
        }
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&HidSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut HidSession> {
        self.active.as_mut()
    }
}
