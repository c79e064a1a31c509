// Bluetooth HID Mouse Report Model
// Boot-protocol compatible 3-button relative mouse with scroll wheel

use std::fmt;

/// Input report size in bytes (buttons, dx, dy, wheel)
pub const REPORT_SIZE: usize = 4;

/// Mouse buttons mapped to report bitfield positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Bitmask for this button in report byte 0
    pub const fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
            MouseButton::Middle => "Middle",
        }
    }
}

/// One HID input report
///
/// Wire layout:
/// - byte[0] = button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle)
/// - byte[1] = X displacement (signed, -127..127)
/// - byte[2] = Y displacement (signed, -127..127)
/// - byte[3] = wheel displacement (signed, -127..127)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseReport {
    pub buttons: u8,
    pub dx: i8,
    pub dy: i8,
    pub wheel: i8,
}

impl MouseReport {
    /// Report with no buttons and no motion
    pub const IDLE: MouseReport = MouseReport {
        buttons: 0,
        dx: 0,
        dy: 0,
        wheel: 0,
    };

    /// Serialize to the on-wire byte layout
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        [self.buttons, self.dx as u8, self.dy as u8, self.wheel as u8]
    }

    /// True when no buttons are held and there is no motion
    pub fn is_idle(&self) -> bool {
        self.buttons == 0 && self.dx == 0 && self.dy == 0 && self.wheel == 0
    }

    /// Check if a button bit is set
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }
}

impl fmt::Display for MouseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buttons={:03b} dx={} dy={} wheel={}",
            self.buttons & 0x07,
            self.dx,
            self.dy,
            self.wheel
        )
    }
}

/// Clamp an accumulated displacement to the report range
///
/// HID relative axes are 8-bit two's complement; per-report motion is
/// limited to -127..127 and the remainder stays in the accumulator.
pub const AXIS_MIN: i32 = -127;
pub const AXIS_MAX: i32 = 127;

pub fn clamp_axis(value: i32) -> i8 {
    value.clamp(AXIS_MIN, AXIS_MAX) as i8
}

/// HID report descriptor for a 3-button relative mouse with wheel
///
/// Usage Page Generic Desktop / Usage Mouse, one application collection
/// containing a pointer with 3 button bits (+5 padding), X/Y and wheel
/// as 8-bit relative axes. Boot protocol hosts read the first 3 bytes.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];
