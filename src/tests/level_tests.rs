// src/tests/level_tests.rs

//! Tests for [`src/data/level.rs`].
//!
//! [`src/data/level.rs`]: ../../data/level.rs

use crate::data::level::{AtomicLogLevel, LogLevel};

use std::str::FromStr;

use ::more_asserts::assert_lt;
use ::test_case::test_case;

#[test]
fn test_total_order_by_position() {
    assert_lt!(LogLevel::Debug, LogLevel::Info);
    assert_lt!(LogLevel::Info, LogLevel::Notice);
    assert_lt!(LogLevel::Notice, LogLevel::Warn);
    assert_lt!(LogLevel::Warn, LogLevel::Error);
    assert_lt!(LogLevel::Error, LogLevel::Fatal);
}

#[test_case("debug", LogLevel::Debug; "debug lower")]
#[test_case("DEBUG", LogLevel::Debug; "debug upper")]
#[test_case("Debug", LogLevel::Debug; "debug mixed")]
#[test_case("info", LogLevel::Info; "info lower")]
#[test_case("NOTICE", LogLevel::Notice; "notice upper")]
#[test_case("warn", LogLevel::Warn; "warn lower")]
#[test_case("eRRoR", LogLevel::Error; "error mixed")]
#[test_case("fatal", LogLevel::Fatal; "fatal lower")]
fn test_from_str_case_insensitive(
    input: &str,
    expect: LogLevel,
) {
    assert_eq!(LogLevel::from_str(input).unwrap(), expect);
}

#[test_case(""; "empty string")]
#[test_case("warning"; "syslog alias")]
#[test_case("critical"; "foreign level")]
#[test_case("debu"; "truncated")]
fn test_from_str_unknown_rejected(input: &str) {
    let result = LogLevel::from_str(input);
    assert!(result.is_err());
    assert!(result
        .err()
        .unwrap()
        .is_invalid_parameter());
}

#[test_case(LogLevel::Debug, "DEBUG", "debug")]
#[test_case(LogLevel::Info, "INFO", "info")]
#[test_case(LogLevel::Notice, "NOTICE", "notice")]
#[test_case(LogLevel::Warn, "WARN", "warn")]
#[test_case(LogLevel::Error, "ERROR", "error")]
#[test_case(LogLevel::Fatal, "FATAL", "fatal")]
fn test_render_upper_and_lower(
    level: LogLevel,
    upper: &str,
    lower: &str,
) {
    assert_eq!(level.as_str(), upper);
    assert_eq!(level.as_lower_str(), lower);
    assert_eq!(level.to_string(), upper);
}

#[test]
fn test_parse_render_round_trip() {
    for level in LogLevel::ALL.iter() {
        assert_eq!(LogLevel::from_str(level.as_str()).unwrap(), *level);
        assert_eq!(LogLevel::from_str(level.as_lower_str()).unwrap(), *level);
    }
}

#[test]
fn test_atomic_store_load() {
    let atomic: AtomicLogLevel = AtomicLogLevel::new(LogLevel::Debug);
    assert_eq!(atomic.load(), LogLevel::Debug);
    atomic.store(LogLevel::Error);
    assert_eq!(atomic.load(), LogLevel::Error);
    atomic.store(LogLevel::Fatal);
    assert_eq!(atomic.load(), LogLevel::Fatal);
}
