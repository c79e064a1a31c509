//! Pairing agent (`org.bluez.Agent1`).
//!
//! NoInputNoOutput capability: every pairing request from a host is
//! accepted without interaction, matching a cable-free mouse that has no
//! display or keypad to confirm with.

use tracing::{debug, info};
use zbus::interface;
use zbus::zvariant::OwnedObjectPath;

/// Fixed PIN for legacy hosts that insist on PIN pairing
const FALLBACK_PIN: &str = "0000";

#[derive(Debug, Default)]
pub struct Agent;

#[interface(name = "org.bluez.Agent1")]
impl Agent {
    fn release(&self) {
        info!("Agent released by BlueZ");
    }

    fn request_pin_code(&self, device: OwnedObjectPath) -> String {
        info!("PIN code requested by {device}");
        FALLBACK_PIN.to_string()
    }

    fn display_pin_code(&self, device: OwnedObjectPath, pincode: String) {
        info!("Display PIN {pincode} for {device}");
    }

    fn request_passkey(&self, device: OwnedObjectPath) -> u32 {
        info!("Passkey requested by {device}");
        0
    }

    fn display_passkey(&self, device: OwnedObjectPath, passkey: u32, entered: u16) {
        debug!("Display passkey {passkey:06} for {device} ({entered} entered)");
    }

    fn request_confirmation(&self, device: OwnedObjectPath, passkey: u32) {
        info!("Confirming passkey {passkey:06} for {device}");
    }

    fn request_authorization(&self, device: OwnedObjectPath) {
        info!("Authorizing pairing with {device}");
    }

    fn authorize_service(&self, device: OwnedObjectPath, uuid: String) {
        info!("Authorizing service {uuid} for {device}");
    }

    fn cancel(&self) {
        info!("Pairing request canceled");
    }
}
