// Bluetooth HID Protocol (HIDP) framing
// Transaction headers exchanged on the L2CAP control/interrupt channels

use crate::report::{MouseReport, REPORT_SIZE};

/// Transaction types (high nibble of the header byte)
pub mod trans {
    pub const HANDSHAKE: u8 = 0x0;
    pub const HID_CONTROL: u8 = 0x1;
    pub const GET_REPORT: u8 = 0x4;
    pub const SET_REPORT: u8 = 0x5;
    pub const GET_PROTOCOL: u8 = 0x6;
    pub const SET_PROTOCOL: u8 = 0x7;
    pub const DATA: u8 = 0xA;
}

/// Handshake result codes (low nibble of a HANDSHAKE header)
pub mod handshake {
    pub const SUCCESSFUL: u8 = 0x0;
    pub const NOT_READY: u8 = 0x1;
    pub const ERR_INVALID_REPORT_ID: u8 = 0x2;
    pub const ERR_UNSUPPORTED_REQUEST: u8 = 0x3;
    pub const ERR_INVALID_PARAMETER: u8 = 0x4;
    pub const ERR_UNKNOWN: u8 = 0xE;
    pub const ERR_FATAL: u8 = 0xF;
}

/// Report types (low nibble of DATA and GET/SET_REPORT headers)
pub mod report_type {
    pub const OTHER: u8 = 0x0;
    pub const INPUT: u8 = 0x1;
    pub const OUTPUT: u8 = 0x2;
    pub const FEATURE: u8 = 0x3;
}

/// HID_CONTROL operations
pub mod control_op {
    pub const SUSPEND: u8 = 0x3;
    pub const EXIT_SUSPEND: u8 = 0x4;
    pub const VIRTUAL_CABLE_UNPLUG: u8 = 0x5;
}

/// Protocol modes for GET/SET_PROTOCOL
pub mod protocol_mode {
    pub const BOOT: u8 = 0x0;
    pub const REPORT: u8 = 0x1;
}

/// Header for an input report on the interrupt channel (DATA | INPUT)
pub const DATA_INPUT: u8 = (trans::DATA << 4) | report_type::INPUT;

/// Frame a mouse report for the interrupt channel
pub fn input_report(report: &MouseReport) -> [u8; REPORT_SIZE + 1] {
    let bytes = report.to_bytes();
    [DATA_INPUT, bytes[0], bytes[1], bytes[2], bytes[3]]
}

/// Frame a mouse report for a host in boot protocol
///
/// Boot hosts read the fixed 3-byte mouse report (buttons, dx, dy);
/// the wheel byte is report-protocol only.
pub fn boot_input_report(report: &MouseReport) -> [u8; 4] {
    let bytes = report.to_bytes();
    [DATA_INPUT, bytes[0], bytes[1], bytes[2]]
}

/// Build a HANDSHAKE reply frame for the control channel
pub fn handshake_frame(result: u8) -> [u8; 1] {
    [(trans::HANDSHAKE << 4) | (result & 0x0F)]
}

/// Build the DATA reply to a GET_PROTOCOL request
pub fn protocol_reply(mode: u8) -> [u8; 2] {
    [(trans::DATA << 4) | report_type::OTHER, mode]
}

/// A message received on the control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    /// HID_CONTROL operation (suspend, exit-suspend, virtual cable unplug)
    HidControl(u8),
    /// Host requests a report (report type in low nibble)
    GetReport(u8),
    /// Host sets a report (output/feature); payload follows the header
    SetReport(u8),
    /// Host asks which protocol mode is active
    GetProtocol,
    /// Host switches protocol mode (boot = 0, report = 1)
    SetProtocol(u8),
    /// DATA on the control channel (response to our GET_REPORT; unused here)
    Data(u8),
    /// Handshake from the host
    Handshake(u8),
    /// Anything else
    Unknown(u8),
}

impl ControlMessage {
    /// Classify a raw control-channel message by its header byte
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = *data.first()?;
        let param = header & 0x0F;
        Some(match header >> 4 {
            trans::HANDSHAKE => ControlMessage::Handshake(param),
            trans::HID_CONTROL => ControlMessage::HidControl(param),
            trans::GET_REPORT => ControlMessage::GetReport(param),
            trans::SET_REPORT => ControlMessage::SetReport(param),
            trans::GET_PROTOCOL => ControlMessage::GetProtocol,
            trans::SET_PROTOCOL => ControlMessage::SetProtocol(param),
            trans::DATA => ControlMessage::Data(param),
            _ => ControlMessage::Unknown(header),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MouseButton;

    #[test]
    fn input_report_frame() {
        let report = MouseReport {
            buttons: MouseButton::Left.mask(),
            dx: 10,
            dy: -10,
            wheel: 0,
        };
        assert_eq!(input_report(&report), [0xA1, 0x01, 0x0A, 0xF6, 0x00]);
    }

    #[test]
    fn boot_frame_drops_wheel_byte() {
        let report = MouseReport {
            buttons: MouseButton::Right.mask(),
            dx: -1,
            dy: 2,
            wheel: -3,
        };
        assert_eq!(boot_input_report(&report), [0xA1, 0x02, 0xFF, 0x02]);
        // Report protocol keeps the wheel.
        assert_eq!(input_report(&report), [0xA1, 0x02, 0xFF, 0x02, 0xFD]);
    }

    #[test]
    fn handshake_frames() {
        assert_eq!(handshake_frame(handshake::SUCCESSFUL), [0x00]);
        assert_eq!(handshake_frame(handshake::ERR_UNSUPPORTED_REQUEST), [0x03]);
        // Result codes beyond the nibble are masked, not smeared into the type.
        assert_eq!(handshake_frame(0x13), [0x03]);
    }

    #[test]
    fn protocol_reply_frame() {
        assert_eq!(protocol_reply(protocol_mode::REPORT), [0xA0, 0x01]);
        assert_eq!(protocol_reply(protocol_mode::BOOT), [0xA0, 0x00]);
    }

    #[test]
    fn parse_control_messages() {
        assert_eq!(
            ControlMessage::parse(&[0x15]),
            Some(ControlMessage::HidControl(control_op::VIRTUAL_CABLE_UNPLUG))
        );
        assert_eq!(ControlMessage::parse(&[0x60]), Some(ControlMessage::GetProtocol));
        assert_eq!(
            ControlMessage::parse(&[0x71]),
            Some(ControlMessage::SetProtocol(protocol_mode::REPORT))
        );
        assert_eq!(
            ControlMessage::parse(&[0x52, 0x00]),
            Some(ControlMessage::SetReport(report_type::OUTPUT))
        );
        assert_eq!(ControlMessage::parse(&[0x00]), Some(ControlMessage::Handshake(0)));
        assert_eq!(ControlMessage::parse(&[]), None);
        assert_eq!(ControlMessage::parse(&[0x30]), Some(ControlMessage::Unknown(0x30)));
    }
}
