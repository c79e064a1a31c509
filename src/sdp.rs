// SDP service record for the HID profile registration
// BlueZ parses this XML and publishes it on our behalf

use crate::report::REPORT_DESCRIPTOR;
use std::fmt::Write;

/// Bluetooth HID profile UUID (HumanInterfaceDeviceService)
pub const HID_PROFILE_UUID: &str = "00001124-0000-1000-8000-00805f9b34fb";

/// L2CAP PSM for the HID control channel
pub const PSM_CONTROL: u16 = 0x0011;

/// L2CAP PSM for the HID interrupt channel
pub const PSM_INTERRUPT: u16 = 0x0013;

/// HID parser version (bcdHID 1.11)
const HID_PARSER_VERSION: u16 = 0x0111;

/// Device subclass: pointing device (mouse)
const HID_SUBCLASS_MOUSE: u8 = 0x80;

/// Encode the report descriptor as the hex text SDP expects
fn descriptor_hex() -> String {
    let mut out = String::with_capacity(REPORT_DESCRIPTOR.len() * 2);
    for byte in REPORT_DESCRIPTOR {
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Build the SDP record XML advertised for the HID profile
///
/// Attributes:
/// - 0x0001 service class (HID)
/// - 0x0004 protocol descriptor list (L2CAP PSM 0x11 + HIDP)
/// - 0x0005 browse group
/// - 0x0006 language base
/// - 0x0009 profile descriptor list (HID v1.1)
/// - 0x000D additional protocol list (interrupt channel, PSM 0x13)
/// - 0x0100 service name
/// - 0x0200/0x0201/0x0202 parser version, subclass, country code
/// - 0x0203/0x0205 virtual cable / reconnect initiate
/// - 0x0206 HID descriptor list (report descriptor as hex text)
/// - 0x0207 language ID base
pub fn service_record(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<record>
    <attribute id="0x0001">
        <sequence>
            <uuid value="0x1124" />
        </sequence>
    </attribute>
    <attribute id="0x0004">
        <sequence>
            <sequence>
                <uuid value="0x0100" />
                <uint16 value="0x{psm_ctrl:04x}" />
            </sequence>
            <sequence>
                <uuid value="0x0011" />
            </sequence>
        </sequence>
    </attribute>
    <attribute id="0x0005">
        <sequence>
            <uuid value="0x1002" />
        </sequence>
    </attribute>
    <attribute id="0x0006">
        <sequence>
            <uint16 value="0x656e" />
            <uint16 value="0x006a" />
            <uint16 value="0x0100" />
        </sequence>
    </attribute>
    <attribute id="0x0009">
        <sequence>
            <sequence>
                <uuid value="0x1124" />
                <uint16 value="0x0100" />
            </sequence>
        </sequence>
    </attribute>
    <attribute id="0x000d">
        <sequence>
            <sequence>
                <sequence>
                    <uuid value="0x0100" />
                    <uint16 value="0x{psm_intr:04x}" />
                </sequence>
                <sequence>
                    <uuid value="0x0011" />
                </sequence>
            </sequence>
        </sequence>
    </attribute>
    <attribute id="0x0100">
        <text value="{name}" />
    </attribute>
    <attribute id="0x0101">
        <text value="Bluetooth HID mouse controller" />
    </attribute>
    <attribute id="0x0200">
        <uint16 value="0x{parser:04x}" />
    </attribute>
    <attribute id="0x0201">
        <uint8 value="0x{subclass:02x}" />
    </attribute>
    <attribute id="0x0202">
        <uint8 value="0x00" />
    </attribute>
    <attribute id="0x0203">
        <boolean value="true" />
    </attribute>
    <attribute id="0x0205">
        <boolean value="true" />
    </attribute>
    <attribute id="0x0206">
        <sequence>
            <sequence>
                <uint8 value="0x22" />
                <text encoding="hex" value="{descriptor}" />
            </sequence>
        </sequence>
    </attribute>
    <attribute id="0x0207">
        <sequence>
            <sequence>
                <uint16 value="0x0409" />
                <uint16 value="0x0100" />
            </sequence>
        </sequence>
    </attribute>
</record>
"#,
        psm_ctrl = PSM_CONTROL,
        psm_intr = PSM_INTERRUPT,
        name = name,
        parser = HID_PARSER_VERSION,
        subclass = HID_SUBCLASS_MOUSE,
        descriptor = descriptor_hex(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_hid_identity() {
        let record = service_record("HID Mouse");
        assert!(record.contains(r#"<uuid value="0x1124" />"#));
        assert!(record.contains(r#"<text value="HID Mouse" />"#));
        assert!(record.contains(r#"<uint16 value="0x0011" />"#));
        assert!(record.contains(r#"<uint16 value="0x0013" />"#));
    }

    #[test]
    fn record_embeds_report_descriptor() {
        let record = service_record("x");
        let hex = descriptor_hex();
        // Descriptor starts with Usage Page (Generic Desktop), Usage (Mouse).
        assert!(hex.starts_with("05010902"));
        assert_eq!(hex.len(), REPORT_DESCRIPTOR.len() * 2);
        assert!(record.contains(&hex));
    }

    #[test]
    fn record_name_is_substituted() {
        let record = service_record("Desk Mouse");
        assert!(record.contains(r#"<text value="Desk Mouse" />"#));
        assert!(!record.contains("{name}"));
    }
}
