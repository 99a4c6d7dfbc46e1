//! Tests for LogDevice / LogFile
//!
//! These tests verify:
//! - std::io Read / Write / Seek behaviour of a handle
//! - seek_to_command positioning
//! - Handle close and drop discard partial writes
//! - Handles share one log but keep separate positions

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cmdlog::config::Config;
use cmdlog::device::LogDevice;
use cmdlog::log::SeekError;
use cmdlog::CmdlogError;

// =============================================================================
// Helper Functions
// =============================================================================

fn device_with_capacity(capacity: usize) -> LogDevice {
    let config = Config::builder().capacity(capacity).build();
    LogDevice::new(&config).unwrap()
}

fn read_to_string_from_start(device: &LogDevice) -> String {
    let mut file = device.open();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_returns_full_count() {
    let device = device_with_capacity(10);
    let mut file = device.open();

    assert_eq!(file.write(b"partial").unwrap(), 7);
    assert_eq!(file.pending_len(), 7);
    assert_eq!(file.write(b" done\n").unwrap(), 6);
    assert_eq!(file.pending_len(), 0);

    assert_eq!(read_to_string_from_start(&device), "partial done\n");
}

#[test]
fn test_write_all_with_many_lines() {
    let device = device_with_capacity(10);
    let mut file = device.open();

    file.write_all(b"one\ntwo\nthree\n").unwrap();

    assert_eq!(device.guard().record_count(), 3);
    assert_eq!(read_to_string_from_start(&device), "one\ntwo\nthree\n");
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_advances_position() {
    let device = device_with_capacity(10);
    device.open().write_all(b"abc\ndef\n").unwrap();

    let mut file = device.open();
    let mut buf = [0u8; 3];

    assert_eq!(file.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf, b"abc");
    assert_eq!(file.position(), 3);

    assert_eq!(file.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf, b"\nde");
    assert_eq!(file.position(), 6);
}

#[test]
fn test_read_at_end_returns_zero() {
    let device = device_with_capacity(10);
    device.open().write_all(b"abc\n").unwrap();

    let mut file = device.open();
    file.seek(SeekFrom::End(0)).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(file.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_reader_sees_records_committed_later() {
    let device = device_with_capacity(10);
    let mut reader = device.open();
    let mut writer = device.open();

    let mut out = String::new();
    reader.read_to_string(&mut out).unwrap();
    assert!(out.is_empty());

    writer.write_all(b"late\n").unwrap();
    reader.read_to_string(&mut out).unwrap();
    assert_eq!(out, "late\n");
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_seek_variants() {
    let device = device_with_capacity(10);
    device.open().write_all(b"0123456789\n").unwrap();

    let mut file = device.open();
    assert_eq!(file.seek(SeekFrom::Start(4)).unwrap(), 4);
    assert_eq!(file.seek(SeekFrom::Current(2)).unwrap(), 6);
    assert_eq!(file.seek(SeekFrom::End(-1)).unwrap(), 10);

    let mut buf = [0u8; 1];
    file.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"\n");
}

#[test]
fn test_seek_out_of_range_is_invalid_input() {
    let device = device_with_capacity(10);
    device.open().write_all(b"abc\n").unwrap();

    let mut file = device.open();
    let err = file.seek(SeekFrom::Start(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = file.seek(SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    // A failed seek leaves the position alone
    assert_eq!(file.position(), 0);
}

#[test]
fn test_seek_to_command() {
    let device = device_with_capacity(3);
    device.open().write_all(b"aa\nbb\ncc\ndd\n").unwrap();

    let mut file = device.open();
    assert_eq!(file.seek_to_command(1, 1).unwrap(), 4);

    let mut rest = String::new();
    file.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "c\ndd\n");
}

#[test]
fn test_seek_to_missing_command_fails() {
    let device = device_with_capacity(3);
    device.open().write_all(b"aa\n").unwrap();

    let mut file = device.open();
    assert!(matches!(file.seek_to_command(3, 0), Err(CmdlogError::Seek(_))));
    assert_eq!(file.position(), 0);
}

#[test]
fn test_seek_to_command_under_concurrent_eviction() {
    let device = device_with_capacity(1);
    let stop = Arc::new(AtomicBool::new(false));

    // Capacity 1: the only retained command flips between 20 and 2 bytes
    let writer = {
        let device = device.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut file = device.open();
            while !stop.load(Ordering::Relaxed) {
                file.write_all(b"0123456789abcdefghi\n").unwrap();
                file.write_all(b"x\n").unwrap();
            }
        })
    };

    let mut file = device.open();
    for _ in 0..5000 {
        match file.seek_to_command(0, 15) {
            Ok(position) => {
                assert_eq!(position, 15);
                assert_eq!(file.position(), 15);
            }
            Err(CmdlogError::Seek(SeekError::InvalidOffset { .. })) => {}
            Err(e) => panic!("seek_to_command failed after resolving: {}", e),
        }
    }

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    // Once the writer stops on the short command, the seek is rejected cleanly
    assert!(matches!(
        file.seek_to_command(0, 15),
        Err(CmdlogError::Seek(SeekError::InvalidOffset { .. }))
    ));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_close_discards_partial_write() {
    let device = device_with_capacity(3);
    let mut file = device.open();
    file.write_all(b"done\nhalf").unwrap();

    assert_eq!(file.close(), 4);
    assert_eq!(device.guard().session_count(), 0);
    assert_eq!(read_to_string_from_start(&device), "done\n");
}

#[test]
fn test_drop_closes_session() {
    let device = device_with_capacity(3);
    {
        let mut file = device.open();
        file.write_all(b"half").unwrap();
        assert_eq!(device.guard().session_count(), 1);
    }
    assert_eq!(device.guard().session_count(), 0);
    assert_eq!(device.guard().record_count(), 0);
}

#[test]
fn test_handles_have_independent_positions() {
    let device = device_with_capacity(3);
    device.open().write_all(b"abcdef\n").unwrap();

    let mut a = device.open();
    let mut b = device.open();
    a.seek(SeekFrom::Start(3)).unwrap();

    let mut buf = [0u8; 1];
    a.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"d");
    b.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"a");
}

#[test]
fn test_teardown_releases_records() {
    let device = device_with_capacity(3);
    device.open().write_all(b"a\nb\n").unwrap();

    assert_eq!(device.teardown(), 2);
    assert_eq!(read_to_string_from_start(&device), "");
}
