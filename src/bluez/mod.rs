//! BlueZ integration: pairing agent, HID profile, adapter setup.
//!
//! All three talk to `org.bluez` on the system bus. The agent and profile
//! are objects we serve; the adapter is driven through a proxy.

pub mod adapter;
pub mod agent;
pub mod profile;

use crate::config::ControllerConfig;
use crate::sdp;
use std::collections::HashMap;
use zbus::zvariant::{ObjectPath, Value};

pub use adapter::Adapter1Proxy;
pub use agent::Agent;
pub use profile::Profile;

/// Object path our pairing agent is served at
pub const AGENT_PATH: &str = "/org/bluez/mouse_controller/agent";

/// Object path our HID profile handler is served at
pub const PROFILE_PATH: &str = "/org/bluez/mouse_controller/profile";

/// Agent capability: accept pairing without user interaction
pub const AGENT_CAPABILITY: &str = "NoInputNoOutput";

/// Errors carried back to BlueZ with its own error namespace
#[derive(Debug, zbus::DBusError)]
#[zbus(prefix = "org.bluez.Error")]
pub enum BluezError {
    #[zbus(error)]
    ZBus(zbus::Error),
    Rejected(String),
    Canceled(String),
}

#[zbus::proxy(
    interface = "org.bluez.AgentManager1",
    default_service = "org.bluez",
    default_path = "/org/bluez"
)]
pub trait AgentManager1 {
    fn register_agent(&self, agent: &ObjectPath<'_>, capability: &str) -> zbus::Result<()>;
    fn unregister_agent(&self, agent: &ObjectPath<'_>) -> zbus::Result<()>;
    fn request_default_agent(&self, agent: &ObjectPath<'_>) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.bluez.ProfileManager1",
    default_service = "org.bluez",
    default_path = "/org/bluez"
)]
pub trait ProfileManager1 {
    fn register_profile(
        &self,
        profile: &ObjectPath<'_>,
        uuid: &str,
        options: HashMap<&str, Value<'_>>,
    ) -> zbus::Result<()>;
    fn unregister_profile(&self, profile: &ObjectPath<'_>) -> zbus::Result<()>;
}

/// Register our agent and make it the default, so inbound pairing from
/// hosts succeeds without prompting
pub async fn register_agent(conn: &zbus::Connection) -> zbus::Result<()> {
    let manager = AgentManager1Proxy::new(conn).await?;
    let path = ObjectPath::try_from(AGENT_PATH)?;
    manager.register_agent(&path, AGENT_CAPABILITY).await?;
    manager.request_default_agent(&path).await?;
    Ok(())
}

pub async fn unregister_agent(conn: &zbus::Connection) -> zbus::Result<()> {
    let manager = AgentManager1Proxy::new(conn).await?;
    let path = ObjectPath::try_from(AGENT_PATH)?;
    manager.unregister_agent(&path).await
}

/// Register the HID profile with its SDP record
///
/// BlueZ publishes the record, listens on the HID PSMs, and hands each
/// incoming L2CAP connection to our `Profile1` object as an fd.
pub async fn register_profile(
    conn: &zbus::Connection,
    config: &ControllerConfig,
) -> zbus::Result<()> {
    let manager = ProfileManager1Proxy::new(conn).await?;
    let path = ObjectPath::try_from(PROFILE_PATH)?;

    let record = sdp::service_record(&config.device_name);
    let mut options: HashMap<&str, Value<'_>> = HashMap::new();
    options.insert("Name", Value::from(config.device_name.as_str()));
    options.insert("Role", Value::from("server"));
    options.insert("RequireAuthentication", Value::from(false));
    options.insert("RequireAuthorization", Value::from(false));
    options.insert("AutoConnect", Value::from(true));
    options.insert("PSM", Value::from(sdp::PSM_CONTROL));
    options.insert("ServiceRecord", Value::from(record));

    manager
        .register_profile(&path, sdp::HID_PROFILE_UUID, options)
        .await
}

pub async fn unregister_profile(conn: &zbus::Connection) -> zbus::Result<()> {
    let manager = ProfileManager1Proxy::new(conn).await?;
    let path = ObjectPath::try_from(PROFILE_PATH)?;
    manager.unregister_profile(&path).await
}
