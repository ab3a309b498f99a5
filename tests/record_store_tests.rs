use checkout_index::RecordStore;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_reads_line_at_offset_without_newline() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("Data2005.csv");
    fs::write(&path, "first,line\nsecond,line\r\nthird").expect("Failed to write dataset");

    let mut store = RecordStore::open(&path).expect("Failed to open dataset");

    assert_eq!(store.read_line_at(0).expect("Read failed"), Some(b"first,line".to_vec()));
    assert_eq!(
        store.read_line_at(11).expect("Read failed"),
        Some(b"second,line\r".to_vec())
    );
    // Last line without a trailing newline.
    assert_eq!(store.read_line_at(24).expect("Read failed"), Some(b"third".to_vec()));
    // Offsets need not sit on a line boundary.
    assert_eq!(store.read_line_at(6).expect("Read failed"), Some(b"line".to_vec()));
    assert_eq!(store.reads(), 4);
}

#[test]
fn test_lines_longer_than_initial_buffer() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("Data2005.csv");

    let long_line = format!("1,{},BOOK", "x".repeat(10_000));
    fs::write(&path, format!("{long_line}\nshort\n")).expect("Failed to write dataset");

    let mut store = RecordStore::open(&path).expect("Failed to open dataset");
    let line = store.read_line_at(0).expect("Read failed").expect("Line missing");

    assert_eq!(line.len(), long_line.len());
    assert_eq!(line, long_line.as_bytes());

    let next = store
        .read_line_at(long_line.len() as i64 + 1)
        .expect("Read failed");
    assert_eq!(next, Some(b"short".to_vec()));
}

#[test]
fn test_out_of_range_offsets_yield_none() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("Data2005.csv");
    fs::write(&path, "a,b\n").expect("Failed to write dataset");

    let mut store = RecordStore::open(&path).expect("Failed to open dataset");

    assert_eq!(store.len(), 4);
    assert_eq!(store.read_line_at(-1).expect("Read failed"), None);
    assert_eq!(store.read_line_at(4).expect("Read failed"), None);
    assert_eq!(store.read_line_at(1_000).expect("Read failed"), None);
}

#[test]
fn test_empty_line_is_distinct_from_end_of_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("Data2005.csv");
    fs::write(&path, "a\n\nb\n").expect("Failed to write dataset");

    let mut store = RecordStore::open(&path).expect("Failed to open dataset");
    assert_eq!(store.read_line_at(2).expect("Read failed"), Some(Vec::new()));
}
