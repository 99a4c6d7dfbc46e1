//! CircularLog Tests
//!
//! Tests verify:
//! - Fill and eviction order (FIFO)
//! - Ownership hand-back of evicted records
//! - Flat offset lookup and record boundaries
//! - Command index lookup
//! - Teardown

use std::num::NonZeroUsize;

use cmdlog::log::{CircularLog, Record};

// =============================================================================
// Helper Functions
// =============================================================================

fn log_with_capacity(capacity: usize) -> CircularLog {
    CircularLog::new(NonZeroUsize::new(capacity).unwrap())
}

fn record(data: &str) -> Record {
    Record::new(data.as_bytes().to_vec()).unwrap()
}

fn contents(log: &CircularLog) -> Vec<String> {
    log.iter()
        .map(|r| String::from_utf8(r.data().to_vec()).unwrap())
        .collect()
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_empty_record_is_rejected() {
    assert!(Record::new(Vec::new()).is_err());
}

#[test]
fn test_record_length_matches_data() {
    let r = record("hello\n");
    assert_eq!(r.len(), 6);
    assert_eq!(r.as_ref(), b"hello\n");
}

// =============================================================================
// Insert / Eviction Tests
// =============================================================================

#[test]
fn test_new_log_is_empty() {
    let log = log_with_capacity(10);
    assert!(log.is_empty());
    assert!(!log.is_full());
    assert_eq!(log.len(), 0);
    assert_eq!(log.capacity(), 10);
    assert_eq!(log.total_length(), 0);
}

#[test]
fn test_insert_without_eviction() {
    let mut log = log_with_capacity(3);

    assert!(log.insert(record("aa\n")).is_none());
    assert!(log.insert(record("bb\n")).is_none());

    assert_eq!(log.len(), 2);
    assert!(!log.is_full());
    assert_eq!(contents(&log), vec!["aa\n", "bb\n"]);
}

#[test]
fn test_log_becomes_full_after_one_pass() {
    let mut log = log_with_capacity(3);

    log.insert(record("aa\n"));
    log.insert(record("bb\n"));
    assert!(!log.is_full());

    assert!(log.insert(record("cc\n")).is_none());
    assert!(log.is_full());
    assert_eq!(log.len(), 3);
    assert_eq!(log.total_length(), 9);
}

#[test]
fn test_insert_when_full_evicts_oldest() {
    let mut log = log_with_capacity(3);
    log.insert(record("aa\n"));
    log.insert(record("bb\n"));
    log.insert(record("cc\n"));

    let evicted = log.insert(record("dd\n"));

    assert_eq!(evicted, Some(record("aa\n")));
    assert_eq!(contents(&log), vec!["bb\n", "cc\n", "dd\n"]);
    assert_eq!(log.len(), 3);
    assert_eq!(log.total_length(), 9);

    let (first, within) = log.find_by_flat_offset(0).unwrap();
    assert_eq!(first.as_ref(), b"bb\n");
    assert_eq!(within, 0);
}

#[test]
fn test_eviction_is_fifo_over_many_wraps() {
    let mut log = log_with_capacity(4);
    let mut evicted = Vec::new();

    for i in 0..23 {
        if let Some(old) = log.insert(record(&format!("cmd{}\n", i))) {
            evicted.push(String::from_utf8(old.data().to_vec()).unwrap());
        }
    }

    let expected_evicted: Vec<String> = (0..19).map(|i| format!("cmd{}\n", i)).collect();
    assert_eq!(evicted, expected_evicted);

    let expected_kept: Vec<String> = (19..23).map(|i| format!("cmd{}\n", i)).collect();
    assert_eq!(contents(&log), expected_kept);
}

#[test]
fn test_total_length_tracks_most_recent_records() {
    let mut log = log_with_capacity(3);
    let lines = ["a\n", "bbbb\n", "cc\n", "dddddd\n", "e\n"];

    for line in lines {
        log.insert(record(line));
    }

    let expected: usize = lines[2..].iter().map(|l| l.len()).sum();
    assert_eq!(log.total_length(), expected);
}

#[test]
fn test_capacity_one_always_holds_newest() {
    let mut log = log_with_capacity(1);

    assert!(log.insert(record("x\n")).is_none());
    assert!(log.is_full());
    assert_eq!(log.insert(record("y\n")), Some(record("x\n")));
    assert_eq!(contents(&log), vec!["y\n"]);
}

// =============================================================================
// Flat Offset Tests
// =============================================================================

#[test]
fn test_find_by_flat_offset_on_empty_log() {
    let log = log_with_capacity(5);
    assert!(log.find_by_flat_offset(0).is_none());
}

#[test]
fn test_find_by_flat_offset_boundary_belongs_to_next_record() {
    let mut log = log_with_capacity(5);
    log.insert(record("abc\n"));
    log.insert(record("de\n"));

    let (r, within) = log.find_by_flat_offset(3).unwrap();
    assert_eq!(r.as_ref(), b"abc\n");
    assert_eq!(within, 3);

    // Offset 4 equals the first record's length
    let (r, within) = log.find_by_flat_offset(4).unwrap();
    assert_eq!(r.as_ref(), b"de\n");
    assert_eq!(within, 0);
}

#[test]
fn test_find_by_flat_offset_at_end_is_none() {
    let mut log = log_with_capacity(3);
    log.insert(record("aa\n"));
    log.insert(record("bb\n"));

    let total = log.total_length();
    assert!(log.find_by_flat_offset(total).is_none());

    let (last, within) = log.find_by_flat_offset(total - 1).unwrap();
    assert_eq!(last.as_ref(), b"bb\n");
    assert_eq!(last.as_ref()[within], b'\n');
}

#[test]
fn test_find_by_flat_offset_after_wrap() {
    let mut log = log_with_capacity(3);
    for line in ["aa\n", "bb\n", "cc\n", "dd\n", "ee\n"] {
        log.insert(record(line));
    }

    // Retained: cc dd ee
    let (r, within) = log.find_by_flat_offset(7).unwrap();
    assert_eq!(r.as_ref(), b"ee\n");
    assert_eq!(within, 1);
    assert!(log.find_by_flat_offset(9).is_none());
}

#[test]
fn test_find_by_flat_offset_huge_offset_is_none() {
    let mut log = log_with_capacity(3);
    for line in ["aa\n", "bb\n", "cc\n", "dd\n"] {
        log.insert(record(line));
    }

    assert!(log.find_by_flat_offset(usize::MAX).is_none());
}

#[test]
fn test_every_flat_offset_maps_to_concatenation() {
    let mut log = log_with_capacity(4);
    for line in ["one\n", "two\n", "three\n", "four\n", "five\n", "six\n"] {
        log.insert(record(line));
    }

    let concatenated: Vec<u8> = log.iter().flat_map(|r| r.as_ref().to_vec()).collect();
    assert_eq!(concatenated.len(), log.total_length());

    for (offset, expected) in concatenated.iter().enumerate() {
        let (r, within) = log.find_by_flat_offset(offset).unwrap();
        assert_eq!(r.as_ref()[within], *expected, "offset {}", offset);
    }
}

// =============================================================================
// Command Index Tests
// =============================================================================

#[test]
fn test_nth_occupied() {
    let mut log = log_with_capacity(3);
    for line in ["aa\n", "bb\n", "cc\n", "dd\n"] {
        log.insert(record(line));
    }

    assert_eq!(log.nth_occupied(0).unwrap().as_ref(), b"bb\n");
    assert_eq!(log.nth_occupied(2).unwrap().as_ref(), b"dd\n");
    assert!(log.nth_occupied(3).is_none());
    assert!(log.nth_occupied(u32::MAX).is_none());
}

#[test]
fn test_nth_occupied_on_partial_log() {
    let mut log = log_with_capacity(5);
    log.insert(record("aa\n"));

    assert_eq!(log.nth_occupied(0).unwrap().as_ref(), b"aa\n");
    assert!(log.nth_occupied(1).is_none());
}

// =============================================================================
// Teardown Tests
// =============================================================================

#[test]
fn test_clear_returns_records_oldest_first() {
    let mut log = log_with_capacity(2);
    for line in ["aa\n", "bb\n", "cc\n"] {
        log.insert(record(line));
    }

    let drained = log.clear();

    assert_eq!(drained, vec![record("bb\n"), record("cc\n")]);
    assert!(log.is_empty());
    assert_eq!(log.total_length(), 0);

    // The log is usable again after teardown
    assert!(log.insert(record("dd\n")).is_none());
    assert_eq!(contents(&log), vec!["dd\n"]);
}
