//! Integration tests for the input-to-report pipeline.
//!
//! These test the full public API: accumulating evdev-style motion,
//! draining into HID reports, framing for the interrupt channel, and
//! delivering frames through a session — exercising the boundary between
//! `input`, `report`, `hidp`, and `session`.

use evdev::RelativeAxisType;
use mouse_controller::input::PointerState;
use mouse_controller::report::{MouseButton, MouseReport};
use mouse_controller::session::{ControlOutcome, SessionRegistry};
use mouse_controller::{hidp, sdp};
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixDatagram;

fn fd_pair() -> (OwnedFd, UnixDatagram) {
    let (ours, peer) = UnixDatagram::pair().unwrap();
    (OwnedFd::from(ours), peer)
}

// ── Full pipeline: motion → drain → frame → socket ──

#[test]
fn pipeline_drag_gesture_reaches_host() {
    let state = PointerState::default();

    // Simulates a small drag: press, move diagonally, release.
    state.button(MouseButton::Left, true);
    state.motion(RelativeAxisType::REL_X, 12);
    state.motion(RelativeAxisType::REL_Y, 7);

    let mut registry = SessionRegistry::default();
    let (control, control_peer) = fd_pair();
    let (interrupt, interrupt_peer) = fd_pair();
    registry
        .offer_channel("/org/bluez/hci0/dev_00_11_22_33_44_55", control)
        .unwrap();
    registry
        .offer_channel("/org/bluez/hci0/dev_00_11_22_33_44_55", interrupt)
        .unwrap();

    let session = registry.active_mut().unwrap();
    assert!(session.is_connected());
    assert_eq!(session.poll_control().unwrap(), ControlOutcome::Idle);

    // Tick 1: button held, motion flushed.
    session.send_report(&state.drain()).unwrap();
    let mut buf = [0u8; 16];
    let n = interrupt_peer.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[0xA1, 0x01, 12, 7, 0]);

    // Tick 2: release; the final report clears the button bit.
    state.button(MouseButton::Left, false);
    session.send_report(&state.drain()).unwrap();
    let n = interrupt_peer.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[0xA1, 0x00, 0x00, 0x00, 0x00]);

    drop(control_peer);
}

#[test]
fn pipeline_fast_motion_spreads_across_reports() {
    let state = PointerState::default();
    state.motion(RelativeAxisType::REL_X, 400);

    let frames: Vec<[u8; 5]> = std::iter::from_fn(|| {
        let report = state.drain();
        (!report.is_idle()).then(|| hidp::input_report(&report))
    })
    .collect();

    // 400 = 127 + 127 + 127 + 19, nothing dropped.
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0], [0xA1, 0x00, 0x7F, 0x00, 0x00]);
    assert_eq!(frames[3], [0xA1, 0x00, 19, 0x00, 0x00]);
    let total: i32 = frames.iter().map(|f| f[2] as i8 as i32).sum();
    assert_eq!(total, 400);
}

#[test]
fn pipeline_host_unplug_then_reconnect() {
    let mut registry = SessionRegistry::default();
    let (control, control_peer) = fd_pair();
    registry.offer_channel("/dev_AA", control).unwrap();

    // Host sends HID_CONTROL virtual cable unplug on the control channel.
    control_peer.send(&[0x15]).unwrap();
    assert_eq!(
        registry.active_mut().unwrap().poll_control().unwrap(),
        ControlOutcome::Disconnect
    );
    registry.close();
    assert!(registry.active().is_none());

    // The same host may come back; the registry accepts a fresh session.
    let (control2, _peer2) = fd_pair();
    registry.offer_channel("/dev_AA", control2).unwrap();
    assert!(registry.active().is_some());
}

#[test]
fn pipeline_boot_host_gets_three_byte_reports() {
    let state = PointerState::default();
    state.motion(RelativeAxisType::REL_X, 9);
    state.motion(RelativeAxisType::REL_WHEEL, 1);

    let mut registry = SessionRegistry::default();
    let (control, control_peer) = fd_pair();
    let (interrupt, interrupt_peer) = fd_pair();
    registry.offer_channel("/dev_AA", control).unwrap();
    registry.offer_channel("/dev_AA", interrupt).unwrap();

    // A BIOS-style host drops to boot protocol right after connecting.
    control_peer.send(&[0x70]).unwrap();
    let session = registry.active_mut().unwrap();
    assert_eq!(session.poll_control().unwrap(), ControlOutcome::Idle);

    let mut buf = [0u8; 16];
    let n = control_peer.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[0x00]);

    // Boot frames carry buttons/dx/dy only; wheel motion is not sent.
    session.send_report(&state.drain()).unwrap();
    let n = interrupt_peer.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[0xA1, 0x00, 9, 0x00]);
}

// ── Advertised record matches what the pump sends ──

#[test]
fn sdp_record_and_frames_agree_on_report_shape() {
    let record = sdp::service_record("HID Mouse");

    // The record advertises the descriptor whose report the pump emits:
    // header byte + 4 report bytes.
    let frame = hidp::input_report(&MouseReport {
        buttons: 0,
        dx: 1,
        dy: 1,
        wheel: 1,
    });
    assert_eq!(frame.len(), 1 + mouse_controller::report::REPORT_SIZE);

    // Control and interrupt PSMs from the record are the HID ones.
    assert!(record.contains("0x0011"));
    assert!(record.contains("0x0013"));
    assert!(record.contains(&format!("{:04x}", sdp::PSM_CONTROL)));
}
