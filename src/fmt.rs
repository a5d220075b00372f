//! Shared formatting helpers for panel lines.
//!
//! All functions are pure. Unit scaling is decimal (1 GB = 1e9 bytes,
//! 1 MB = 1e6 bytes, 1 GHz = 1e9 Hz).

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Placeholder for values a sensor could not report.
pub const UNKNOWN: &str = "unknown";

/// Formats a value, or [`UNKNOWN`] when absent.
pub fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

/// Format a frequency in GHz with the shortest exact decimal.
///
/// `3_600_000_000` → `"3.6 GHz"`, `4_000_000_000` → `"4.0 GHz"`
pub fn format_ghz(hz: u64) -> String {
    let mut value = (hz as f64 / 1e9).to_string();
    if !value.contains('.') {
        value.push_str(".0");
    }
    format!("{} GHz", value)
}

/// Format bytes as gigabytes with three decimals: `"16.000 GB"`.
///
/// Ties round up: 1_500_000 bytes is `"0.002 GB"`.
pub fn format_gb(bytes: u64) -> String {
    format!("{:.3} GB", (bytes as f64 / 1e6).round() / 1e3)
}

/// Format a used/total pair as whole megabytes: `"512/2048 MB"`.
///
/// Ties round up, unlike `{:.0}` which rounds them to even.
pub fn format_mb_pair(used: u64, total: u64) -> String {
    format!(
        "{}/{} MB",
        (used as f64 / 1e6).round() as u64,
        (total as f64 / 1e6).round() as u64
    )
}

/// Format minutes: `"42 min"`.
pub fn format_minutes(minutes: u64) -> String {
    format!("{} min", minutes)
}

/// Format a timestamp as `"2026-10-19 14:03:07 UTC"`.
pub fn format_clock(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
