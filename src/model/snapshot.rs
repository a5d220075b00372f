//! Point-in-time host metrics.
//!
//! A [`Snapshot`] is produced fresh by a metrics source on every tick and is
//! never mutated afterwards. Every sensor field is optional: `None` means the
//! sensor could not report it on this host and is rendered as a placeholder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collector::Field;

/// Processor identity and topology.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Vendor identifier, e.g. `GenuineIntel`.
    pub vendor: Option<String>,
    /// Model identifier as reported by the CPU (numeric on x86).
    pub model: Option<String>,
    /// Marketing name, e.g. `Intel(R) Core(TM) i7-7700 CPU @ 3.60GHz`.
    pub name: Option<String>,
    /// Maximum clock frequency in Hz.
    pub max_freq_hz: Option<u64>,
    pub physical_cores: Option<u32>,
    pub logical_cores: Option<u32>,
}

/// Physical memory and swap, in bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_bytes: Option<u64>,
    pub available_bytes: Option<u64>,
    pub swap_used_bytes: Option<u64>,
    pub swap_total_bytes: Option<u64>,
}

/// Operating system identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    /// Kernel family, e.g. `Linux`.
    pub family: Option<String>,
    /// Distribution or vendor, e.g. `Ubuntu`.
    pub manufacturer: Option<String>,
    /// Version string, e.g. `22.04`.
    pub version: Option<String>,
    pub process_count: Option<u32>,
}

/// One immutable sample of host metrics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub os: OsInfo,
    /// Whole minutes the sampling service has been running.
    pub uptime_minutes: u64,
    pub sampled_at: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a snapshot with every sensor field unknown.
    pub fn empty(sampled_at: DateTime<Utc>) -> Self {
        Self {
            cpu: CpuInfo::default(),
            memory: MemoryInfo::default(),
            os: OsInfo::default(),
            uptime_minutes: 0,
            sampled_at,
        }
    }

    /// Lists the fields that are unknown in this snapshot, in display order.
    pub fn missing_fields(&self) -> Vec<Field> {
        let checks = [
            (Field::CpuVendor, self.cpu.vendor.is_none()),
            (Field::CpuModel, self.cpu.model.is_none()),
            (Field::CpuName, self.cpu.name.is_none()),
            (Field::CpuMaxFreq, self.cpu.max_freq_hz.is_none()),
            (Field::CpuPhysicalCores, self.cpu.physical_cores.is_none()),
            (Field::CpuLogicalCores, self.cpu.logical_cores.is_none()),
            (Field::MemoryTotal, self.memory.total_bytes.is_none()),
            (Field::MemoryAvailable, self.memory.available_bytes.is_none()),
            (Field::SwapUsed, self.memory.swap_used_bytes.is_none()),
            (Field::SwapTotal, self.memory.swap_total_bytes.is_none()),
            (Field::OsFamily, self.os.family.is_none()),
            (Field::OsManufacturer, self.os.manufacturer.is_none()),
            (Field::OsVersion, self.os.version.is_none()),
            (Field::ProcessCount, self.os.process_count.is_none()),
        ];
        checks
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_misses_everything() {
        let snapshot = Snapshot::empty(Utc::now());
        assert_eq!(snapshot.missing_fields().len(), 14);
    }

    #[test]
    fn test_missing_fields_only_reports_none() {
        let mut snapshot = Snapshot::empty(Utc::now());
        snapshot.cpu = CpuInfo {
            vendor: Some("GenuineIntel".into()),
            model: Some("158".into()),
            name: Some("i7".into()),
            max_freq_hz: Some(3_600_000_000),
            physical_cores: Some(4),
            logical_cores: Some(8),
        };
        snapshot.memory = MemoryInfo {
            total_bytes: Some(1),
            available_bytes: Some(1),
            swap_used_bytes: None,
            swap_total_bytes: None,
        };
        snapshot.os = OsInfo {
            family: Some("Linux".into()),
            manufacturer: Some("Ubuntu".into()),
            version: Some("22.04".into()),
            process_count: Some(1),
        };

        assert_eq!(
            snapshot.missing_fields(),
            vec![Field::SwapUsed, Field::SwapTotal]
        );
    }
}
