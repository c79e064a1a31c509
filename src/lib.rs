// mouse-controller - Shared Library
// Bluetooth HID mouse service: report model, HIDP framing, BlueZ glue

pub mod bluez;
pub mod config;
pub mod daemon;
pub mod hidp;
pub mod input;
pub mod report;
pub mod sdp;
pub mod session;

pub use config::ControllerConfig;
pub use input::PointerState;
pub use report::{MouseButton, MouseReport, REPORT_DESCRIPTOR};
pub use sdp::{HID_PROFILE_UUID, PSM_CONTROL, PSM_INTERRUPT};
pub use session::{HidSession, SessionRegistry};
