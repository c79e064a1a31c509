//! Adapter setup via `org.bluez.Adapter1`.

use crate::config::ControllerConfig;
use tracing::info;

#[zbus::proxy(interface = "org.bluez.Adapter1", default_service = "org.bluez")]
pub trait Adapter1 {
    #[zbus(property)]
    fn address(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn powered(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn set_powered(&self, value: bool) -> zbus::Result<()>;

    #[zbus(property)]
    fn alias(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn set_alias(&self, value: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn pairable(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn set_pairable(&self, value: bool) -> zbus::Result<()>;

    #[zbus(property)]
    fn discoverable(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn set_discoverable(&self, value: bool) -> zbus::Result<()>;

    #[zbus(property)]
    fn discoverable_timeout(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn set_discoverable_timeout(&self, value: u32) -> zbus::Result<()>;
}

/// Power the adapter and make it pairable/discoverable under the
/// configured alias, so hosts can find and bond with the mouse
pub async fn prepare(
    conn: &zbus::Connection,
    config: &ControllerConfig,
) -> zbus::Result<Adapter1Proxy<'static>> {
    let adapter = Adapter1Proxy::builder(conn)
        .path(config.adapter_path())?
        .build()
        .await?;

    if !adapter.powered().await? {
        adapter.set_powered(true).await?;
    }
    adapter.set_alias(&config.device_name).await?;
    adapter.set_pairable(true).await?;
    // Timeout 0 keeps the adapter discoverable until we exit.
    adapter.set_discoverable_timeout(0u32).await?;
    adapter.set_discoverable(true).await?;

    info!(
        "Adapter {} ({}) ready as \"{}\"",
        config.adapter,
        adapter.address().await?,
        config.device_name
    );
    Ok(adapter)
}

/// Stop advertising on shutdown
pub async fn wind_down(adapter: &Adapter1Proxy<'_>) {
    adapter.set_discoverable(false).await.ok();
    adapter.set_pairable(false).await.ok();
}
