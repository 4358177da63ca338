// src/tests/filesink_tests.rs

//! Tests for [`src/sinks/file.rs`].
//!
//! [`src/sinks/file.rs`]: ../../sinks/file.rs

use crate::common::{FileSz, FPath};
use crate::data::level::LogLevel;
use crate::debug::helpers::{tempdir, TempDir};
use crate::format::factory::ComponentFactory;
use crate::format::formatter::Formatter;
use crate::sinks::file::FileSink;
use crate::sinks::Sink;
use crate::tests::common::new_test_event;

use std::path::PathBuf;

use ::more_asserts::{assert_gt, assert_lt};

/// a sink whose formatter renders only the message, so file contents are
/// predictable
fn new_msg_sink(
    path: &FPath,
    truncate: bool,
    buffer_capacity: usize,
) -> FileSink {
    FileSink::new(path, truncate, buffer_capacity)
        .unwrap()
        .with_formatter(Formatter::new(ComponentFactory::from_pattern("%m")))
}

fn fpath_in(
    dir: &TempDir,
    name: &str,
) -> FPath {
    FPath::from(
        dir.path()
            .join(name)
            .to_str()
            .unwrap(),
    )
}

fn append_msg(
    sink: &FileSink,
    msg: &str,
) {
    sink.append(&new_test_event(LogLevel::Info, msg))
        .unwrap();
}

#[test]
fn test_append_flush_writes_newline_terminated() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    append_msg(&sink, "one");
    append_msg(&sink, "two");
    sink.flush().unwrap();

    let contents: String = std::fs::read_to_string(&fpath).unwrap();
    assert_eq!(contents, "one\ntwo\n");
}

#[test]
fn test_buffered_bytes_stay_in_userspace_until_flush() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    append_msg(&sink, "buffered");

    // on disk: nothing yet; accounted: the pending bytes
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 0);
    assert_eq!(sink.file_size(), "buffered\n".len() as FileSz);

    sink.flush().unwrap();
    assert_eq!(
        std::fs::metadata(&fpath).unwrap().len(),
        "buffered\n".len() as u64
    );
}

#[test]
fn test_unbuffered_writes_directly() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 0);
    append_msg(&sink, "direct");
    assert_eq!(
        std::fs::metadata(&fpath).unwrap().len(),
        "direct\n".len() as u64
    );
}

#[test]
fn test_buffer_overflow_flushes_first() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    // room for two 10-byte records, not three
    let sink: FileSink = new_msg_sink(&fpath, true, 25);
    append_msg(&sink, "aaaaaaaaa");
    append_msg(&sink, "bbbbbbbbb");
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 0);
    append_msg(&sink, "ccccccccc");
    // the first two flushed to make room
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 20);
}

#[test]
fn test_append_mode_resyncs_file_size() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    std::fs::write(&fpath, "previous contents\n").unwrap();

    let sink: FileSink = new_msg_sink(&fpath, false, 4096);
    assert_eq!(sink.file_size(), "previous contents\n".len() as FileSz);
    append_msg(&sink, "more");
    sink.flush().unwrap();
    let contents: String = std::fs::read_to_string(&fpath).unwrap();
    assert_eq!(contents, "previous contents\nmore\n");
}

#[test]
fn test_truncate_mode_zeroes_file_size() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    std::fs::write(&fpath, "previous contents\n").unwrap();

    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    assert_eq!(sink.file_size(), 0);
    sink.flush().unwrap();
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 0);
}

#[test]
fn test_missing_parent_directories_created() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = FPath::from(
        dir.path()
            .join("a")
            .join("b")
            .join("t.log")
            .to_str()
            .unwrap(),
    );
    let sink: FileSink = new_msg_sink(&fpath, true, 0);
    append_msg(&sink, "deep");
    assert!(PathBuf::from(&fpath).exists());
}

#[test]
fn test_drop_flushes() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    {
        let sink: FileSink = new_msg_sink(&fpath, true, 4096);
        append_msg(&sink, "at drop");
    }
    let contents: String = std::fs::read_to_string(&fpath).unwrap();
    assert_eq!(contents, "at drop\n");
}

#[test]
fn test_reopen_append_resyncs() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    append_msg(&sink, "first");
    sink.reopen(false).unwrap();
    assert_eq!(sink.file_size(), "first\n".len() as FileSz);

    append_msg(&sink, "second");
    sink.flush().unwrap();
    assert_eq!(
        std::fs::read_to_string(&fpath).unwrap(),
        "first\nsecond\n"
    );
}

#[test]
fn test_reopen_truncate_discards() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    append_msg(&sink, "first");
    sink.flush().unwrap();
    sink.reopen(true).unwrap();
    assert_eq!(sink.file_size(), 0);
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// rotation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 200 events of 20 bytes after formatting, max size 1024, two backups:
/// the on-disk set ends as `{t.log, t_backup1.log, t_backup2.log}` with
/// the active file below the limit and the oldest content gone.
#[test]
fn test_rotation_keeps_max_backup_count() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 4096);
    sink.set_max_file_size(1024);
    sink.set_max_backup_count(2);

    // 19 chars + newline = 20 bytes post-format
    for index in 0..200usize {
        append_msg(&sink, &format!("record-{:012}", index));
    }
    sink.flush().unwrap();

    let active: u64 = std::fs::metadata(&fpath).unwrap().len();
    assert_lt!(active, 1024);
    let backup1: PathBuf = dir.path().join("t_backup1.log");
    let backup2: PathBuf = dir.path().join("t_backup2.log");
    let backup3: PathBuf = dir.path().join("t_backup3.log");
    assert!(backup1.exists(), "t_backup1.log missing");
    assert!(backup2.exists(), "t_backup2.log missing");
    assert!(!backup3.exists(), "t_backup3.log must not exist");

    // `_backup1` holds the most recent rotated content, and the oldest
    // records are gone entirely
    let backup1_contents: String = std::fs::read_to_string(&backup1).unwrap();
    let backup2_contents: String = std::fs::read_to_string(&backup2).unwrap();
    assert!(!backup2_contents.contains("record-000000000000"));
    let newest_rotated: usize = backup1_contents
        .lines()
        .filter_map(|line| {
            line.strip_prefix("record-")
                .and_then(|digits| digits.parse::<usize>().ok())
        })
        .max()
        .unwrap();
    let oldest_rotated: usize = backup2_contents
        .lines()
        .filter_map(|line| {
            line.strip_prefix("record-")
                .and_then(|digits| digits.parse::<usize>().ok())
        })
        .min()
        .unwrap();
    assert_gt!(newest_rotated, oldest_rotated);
}

#[test]
fn test_rotation_zero_backups_unlinks() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 0);
    sink.set_max_file_size(64);
    sink.set_max_backup_count(0);

    for index in 0..20usize {
        append_msg(&sink, &format!("record-{:012}", index));
    }
    sink.flush().unwrap();

    assert!(!dir
        .path()
        .join("t_backup1.log")
        .exists());
    // only the young tail survives
    assert_lt!(std::fs::metadata(&fpath).unwrap().len(), 64);
}

#[test]
fn test_rotation_unbounded_when_max_file_size_zero() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "t.log");
    let sink: FileSink = new_msg_sink(&fpath, true, 0);
    // max_file_size defaults to 0: no rotation ever
    for index in 0..100usize {
        append_msg(&sink, &format!("record-{:012}", index));
    }
    sink.flush().unwrap();
    assert!(!dir
        .path()
        .join("t_backup1.log")
        .exists());
    assert_eq!(std::fs::metadata(&fpath).unwrap().len(), 20 * 100);
}

#[test]
fn test_backup_path_naming_without_extension() {
    let dir: TempDir = tempdir().unwrap();
    let fpath: FPath = fpath_in(&dir, "tracelog");
    let sink: FileSink = new_msg_sink(&fpath, true, 0);
    sink.set_max_file_size(8);
    sink.set_max_backup_count(1);
    append_msg(&sink, "0123456789");
    sink.flush().unwrap();
    assert!(dir
        .path()
        .join("tracelog_backup1")
        .exists());
}
