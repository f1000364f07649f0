//! # Testbench Tests
//!
//! This module contains unit tests for the per-image run loop and whole-run sequencing:
//! message ordering on the transactor, diagnostic output, abort on load failure, and the
//! single shutdown handshake.

use std::collections::VecDeque;

use mockall::Sequence;
use pretty_assertions::assert_eq;
use testdriver_core::common::{LoadError, ProtocolError, RunError, TransportError};
use testdriver_core::config::Config;
use testdriver_core::sim::loader::load_vmh;
use testdriver_core::soc::{HostEvent, HostMessage, MemInit};
use testdriver_core::{Outcome, Testbench};

use crate::common::harness::{ImageDir, raw};
use crate::common::mocks::transactor::{MockDevice, ScriptedTransactor};

fn diag_text(diag: Vec<u8>) -> String {
    String::from_utf8(diag).unwrap()
}

#[test]
fn test_run_image_sends_reset_records_then_start() {
    let images = ImageDir::new();
    let path = images.write_records("two.vmh", 2);
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(0)]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let outcome = bench.run_image(&path).unwrap();
    assert_eq!(outcome, Outcome::Passed);

    let (device, _) = bench.into_parts();
    let mut expected = vec![HostMessage::Reset];
    expected.extend(load_vmh(&path).unwrap().into_iter().map(HostMessage::MemInit));
    expected.push(HostMessage::Start(0x200));
    assert_eq!(device.sent, expected);
}

#[test]
fn test_run_image_diagnostic_output() {
    let images = ImageDir::new();
    let path = images.write_records("hello.vmh", 1);
    let device = ScriptedTransactor::new(&[
        HostEvent::PrintChar(u16::from(b'O')),
        HostEvent::PrintChar(u16::from(b'K')),
        HostEvent::PrintIntLow(42),
        HostEvent::PrintIntHigh(0),
        HostEvent::ExitCode(0),
    ]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    bench.run_image(&path).unwrap();

    let (_, diag) = bench.into_parts();
    assert_eq!(
        diag_text(diag),
        format!("---- {} ----\nOK42PASSED\n\n", path.display())
    );
}

#[test]
fn test_run_image_uses_configured_start_pc() {
    let images = ImageDir::new();
    let path = images.write_records("pc.vmh", 1);
    let mut config = Config::default();
    config.general.start_pc = 0x8000_0000;
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(0)]);
    let mut bench = Testbench::new(device, &config, Vec::new());
    assert_eq!(bench.start_pc(), 0x8000_0000);

    bench.run_image(&path).unwrap();

    let (device, _) = bench.into_parts();
    assert_eq!(device.sent.last(), Some(&HostMessage::Start(0x8000_0000)));
}

#[test]
fn test_run_image_reports_failure_code() {
    let images = ImageDir::new();
    let path = images.write_records("fail.vmh", 1);
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(3)]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    assert_eq!(bench.run_image(&path).unwrap(), Outcome::Failed(3));
    let (_, diag) = bench.into_parts();
    assert!(diag_text(diag).contains("FAILED: exit code = 3\n"));
}

#[test]
fn test_run_image_stream_closed_before_exit() {
    let images = ImageDir::new();
    let path = images.write_records("hang.vmh", 1);
    let device = ScriptedTransactor::new(&[HostEvent::PrintChar(u16::from(b'x'))]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let err = bench.run_image(&path).unwrap_err();
    assert!(matches!(err, RunError::Protocol(ProtocolError::StreamClosed)));
}

#[test]
fn test_run_image_load_failure_sends_no_records() {
    let images = ImageDir::new();
    let path = images.write("bad.vmh", "00000000\n");
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(0)]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let err = bench.run_image(&path).unwrap_err();
    assert!(matches!(err, RunError::Load(LoadError::Format { .. })));

    let (device, diag) = bench.into_parts();
    assert_eq!(device.sent, vec![HostMessage::Reset]);
    assert!(diag_text(diag).ends_with("Failed to load memory\n"));
}

#[test]
fn test_run_all_shuts_down_once_after_last_image() {
    let images = ImageDir::new();
    let first = images.write_records("a.vmh", 1);
    let second = images.write_records("b.vmh", 3);
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(0), HostEvent::ExitCode(9)]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let summary = bench.run_all([&first, &second]).unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary.passed(), 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.results()[1].outcome, Outcome::Failed(9));

    let (device, _) = bench.into_parts();
    assert_eq!(device.count(|m| *m == HostMessage::Shutdown), 1);
    assert_eq!(device.sent.last(), Some(&HostMessage::Shutdown));
    assert_eq!(device.count(|m| *m == HostMessage::Reset), 2);
    assert_eq!(
        device.count(|m| *m == HostMessage::MemInit(MemInit::Done)),
        2
    );
}

#[test]
fn test_failed_images_do_not_fail_the_run_by_default() {
    let images = ImageDir::new();
    let path = images.write_records("fail.vmh", 1);
    let device = ScriptedTransactor::new(&[HostEvent::ExitCode(1)]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let summary = bench.run_all([&path]).unwrap();

    // Reference behaviour: only load failures change the process status.
    assert_eq!(summary.exit_status(false), 0);
    assert_eq!(summary.exit_status(true), 1);
}

#[test]
fn test_print_int_state_does_not_leak_between_images() {
    let images = ImageDir::new();
    let first = images.write_records("a.vmh", 1);
    let second = images.write_records("b.vmh", 1);
    let device = ScriptedTransactor::new(&[
        HostEvent::PrintIntLow(5),
        HostEvent::PrintIntHigh(0),
        HostEvent::ExitCode(0),
        HostEvent::PrintIntHigh(0),
        HostEvent::ExitCode(0),
    ]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    bench.run_all([&first, &second]).unwrap();

    let (_, diag) = bench.into_parts();
    let text = diag_text(diag);
    assert!(text.contains("\n5PASSED\n"));
    assert!(text.contains("\n0PASSED\n"));
}

#[test]
fn test_run_all_aborts_on_load_failure_and_shuts_down_once() {
    let images = ImageDir::new();
    let good = images.write_records("good.vmh", 2);
    let bad = images.missing("missing.vmh");
    let never = images.write_records("never.vmh", 1);

    let mut device = MockDevice::new();
    let mut script: VecDeque<_> = raw(&[HostEvent::ExitCode(0)]).into();
    device.expect_reset().times(2).returning(|| Ok(()));
    device.expect_send_mem_init().times(3).returning(|_| Ok(()));
    device.expect_start().times(1).returning(|_| Ok(()));
    device
        .expect_recv_tohost()
        .returning(move || Ok(script.pop_front()));
    device.expect_shutdown().times(1).returning(|| Ok(()));

    let mut bench = Testbench::new(device, &Config::default(), Vec::new());
    let err = bench.run_all([&good, &bad, &never]).unwrap_err();

    match err {
        RunError::Load(LoadError::Io { path, .. }) => assert_eq!(path, bad),
        other => panic!("expected load error, got {other:?}"),
    }
    let (_, diag) = bench.into_parts();
    let text = diag_text(diag);
    assert!(text.contains("Failed to load memory\nshutting down...\nfinished\n"));
    assert!(!text.contains("never.vmh"));
}

#[test]
fn test_run_all_orders_host_messages() {
    let images = ImageDir::new();
    let path = images.write_records("one.vmh", 1);

    let mut seq = Sequence::new();
    let mut device = MockDevice::new();
    device
        .expect_reset()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    device
        .expect_send_mem_init()
        .withf(|msg| matches!(msg, MemInit::Load { address: 0, .. }))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    device
        .expect_send_mem_init()
        .withf(|msg| *msg == MemInit::Done)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    device
        .expect_start()
        .withf(|pc| *pc == 0x200)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    device
        .expect_recv_tohost()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Some(HostEvent::ExitCode(0).into())));
    device
        .expect_shutdown()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));

    let mut bench = Testbench::new(device, &Config::default(), Vec::new());
    let summary = bench.run_all([&path]).unwrap();
    assert!(summary.all_passed());
}

#[test]
fn test_run_all_transport_failure_still_shuts_down() {
    let images = ImageDir::new();
    let path = images.write_records("one.vmh", 1);

    let mut device = MockDevice::new();
    device
        .expect_reset()
        .times(1)
        .returning(|| Err(TransportError::Disconnected));
    device.expect_send_mem_init().never();
    device.expect_shutdown().times(1).returning(|| Ok(()));

    let mut bench = Testbench::new(device, &Config::default(), Vec::new());
    let err = bench.run_all([&path]).unwrap_err();
    assert!(matches!(
        err,
        RunError::Transport(TransportError::Disconnected)
    ));
}

#[test]
fn test_run_all_reports_shutdown_failure_after_clean_run() {
    let images = ImageDir::new();
    let path = images.write_records("one.vmh", 1);

    let mut device = MockDevice::new();
    device.expect_reset().returning(|| Ok(()));
    device.expect_send_mem_init().returning(|_| Ok(()));
    device.expect_start().returning(|_| Ok(()));
    device
        .expect_recv_tohost()
        .returning(|| Ok(Some(HostEvent::ExitCode(0).into())));
    device
        .expect_shutdown()
        .times(1)
        .returning(|| Err(TransportError::Disconnected));

    let mut bench = Testbench::new(device, &Config::default(), Vec::new());
    assert!(matches!(
        bench.run_all([&path]),
        Err(RunError::Transport(TransportError::Disconnected))
    ));
}

#[test]
fn test_run_all_with_no_images_only_shuts_down() {
    let device = ScriptedTransactor::default();
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let summary = bench.run_all(Vec::<std::path::PathBuf>::new()).unwrap();
    assert!(summary.is_empty());

    let (device, diag) = bench.into_parts();
    assert_eq!(device.sent, vec![HostMessage::Shutdown]);
    assert!(diag.is_empty());
}

#[test]
fn test_decode_failure_mid_line_starts_abort_note_on_new_line() {
    let images = ImageDir::new();
    let path = images.write_records("partial.vmh", 1);
    let device = ScriptedTransactor::new(&[
        HostEvent::PrintChar(u16::from(b'o')),
        HostEvent::PrintChar(u16::from(b'k')),
    ]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    let err = bench.run_all([&path]).unwrap_err();
    assert!(matches!(
        err,
        RunError::Protocol(ProtocolError::StreamClosed)
    ));

    let (device, diag) = bench.into_parts();
    assert_eq!(device.sent.last(), Some(&HostMessage::Shutdown));
    assert_eq!(
        diag_text(diag),
        format!(
            "---- {} ----\nok\nshutting down...\nfinished\n",
            path.display()
        )
    );
}

#[test]
fn test_decode_failure_without_output_adds_no_blank_line() {
    let images = ImageDir::new();
    let path = images.write_records("silent.vmh", 1);
    let device = ScriptedTransactor::new(&[]);
    let mut bench = Testbench::new(device, &Config::default(), Vec::new());

    assert!(bench.run_all([&path]).is_err());

    let (_, diag) = bench.into_parts();
    assert_eq!(
        diag_text(diag),
        format!("---- {} ----\nshutting down...\nfinished\n", path.display())
    );
}
