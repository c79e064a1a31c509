//! HID profile handler (`org.bluez.Profile1`).
//!
//! BlueZ calls `NewConnection` with an L2CAP socket fd for every channel a
//! host opens on the registered PSMs. Per the HID spec the control channel
//! connects first, then the interrupt channel; the session registry assigns
//! roles in that order.

use crate::session::{SessionError, SharedSessions};
use std::collections::HashMap;
use std::os::fd::AsFd;
use tracing::{info, warn};
use zbus::interface;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use super::BluezError;

pub struct Profile {
    sessions: SharedSessions,
}

impl Profile {
    pub fn new(sessions: SharedSessions) -> Self {
        Self { sessions }
    }
}

#[interface(name = "org.bluez.Profile1")]
impl Profile {
    fn release(&self) {
        info!("Profile released by BlueZ");
    }

    async fn new_connection(
        &self,
        device: OwnedObjectPath,
        fd: zbus::zvariant::OwnedFd,
        fd_properties: HashMap<String, OwnedValue>,
    ) -> Result<(), BluezError> {
        if !fd_properties.is_empty() {
            info!("Channel properties from BlueZ: {fd_properties:?}");
        }

        let fd = fd
            .as_fd()
            .try_clone_to_owned()
            .map_err(|e| BluezError::Rejected(format!("cannot take channel fd: {e}")))?;

        let mut sessions = self.sessions.lock().await;
        match sessions.offer_channel(device.as_str(), fd) {
            Ok(()) => Ok(()),
            Err(SessionError::Busy(active)) => {
                warn!("Refusing {device}: session with {active} is live");
                Err(BluezError::Rejected(format!(
                    "already connected to {active}"
                )))
            }
            Err(e) => Err(BluezError::Rejected(e.to_string())),
        }
    }

    async fn request_disconnection(&self, device: OwnedObjectPath) {
        let mut sessions = self.sessions.lock().await;
        sessions.disconnect(device.as_str());
    }
}
