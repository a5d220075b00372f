//! Host metrics sources.
//!
//! A [`MetricsSource`] produces one [`Snapshot`] per call. The scheduler only
//! depends on this trait; the `/proc` reader is one implementation of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                MetricsSource                 │ (trait)
//! │  ┌────────────────────────────────────────┐  │
//! │  │             ProcfsSource               │  │
//! │  │  - /proc/cpuinfo, cpufreq              │  │
//! │  │  - /proc/meminfo                       │  │
//! │  │  - ostype, os-release, /proc/[pid]     │  │
//! │  └───────────────────┬────────────────────┘  │
//! │               ┌──────▼──────┐                │
//! │               │  FileSystem │ (trait)        │
//! │               └──────┬──────┘                │
//! └──────────────────────┼───────────────────────┘
//!               ┌────────┴────────┐
//!        ┌──────▼──────┐   ┌──────▼──────┐
//!        │   RealFs    │   │   MockFs    │
//!        │  (Linux)    │   │  (Testing)  │
//!        └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use hostpanel::collector::{MetricsSource, MockFs, ProcfsSource};
//!
//! let source = ProcfsSource::new(MockFs::typical_system(), "/proc");
//! let snapshot = source.sample().unwrap();
//! assert_eq!(snapshot.cpu.vendor.as_deref(), Some("GenuineIntel"));
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

use std::fmt;

use crate::model::Snapshot;

pub use mock::MockFs;
pub use procfs::ProcfsSource;
pub use traits::{FileSystem, RealFs};

/// Something that can take a point-in-time sample of host metrics.
///
/// Implementations must be safe to call from several loops at once.
pub trait MetricsSource: Send + Sync {
    /// Takes one sample.
    ///
    /// Returns [`SourceError::PartialRead`] with a degraded snapshot when only
    /// some sensors could be read, and [`SourceError::Unavailable`] when the
    /// provider cannot be reached at all.
    fn sample(&self) -> Result<Snapshot, SourceError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Individual sensor fields of a [`Snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    CpuVendor,
    CpuModel,
    CpuName,
    CpuMaxFreq,
    CpuPhysicalCores,
    CpuLogicalCores,
    MemoryTotal,
    MemoryAvailable,
    SwapUsed,
    SwapTotal,
    OsFamily,
    OsManufacturer,
    OsVersion,
    ProcessCount,
}

impl Field {
    /// Stable snake_case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::CpuVendor => "cpu_vendor",
            Field::CpuModel => "cpu_model",
            Field::CpuName => "cpu_name",
            Field::CpuMaxFreq => "cpu_max_freq",
            Field::CpuPhysicalCores => "cpu_physical_cores",
            Field::CpuLogicalCores => "cpu_logical_cores",
            Field::MemoryTotal => "memory_total",
            Field::MemoryAvailable => "memory_available",
            Field::SwapUsed => "swap_used",
            Field::SwapTotal => "swap_total",
            Field::OsFamily => "os_family",
            Field::OsManufacturer => "os_manufacturer",
            Field::OsVersion => "os_version",
            Field::ProcessCount => "process_count",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`MetricsSource::sample`].
#[derive(Debug, Clone)]
pub enum SourceError {
    /// The sensor provider cannot be reached (missing `/proc`, permissions,
    /// timeout). Fatal for the loop that hit it.
    Unavailable { reason: String },
    /// Some fields could not be read. `snapshot` holds everything that was
    /// read, with the `missing` fields set to `None`.
    PartialRead {
        snapshot: Box<Snapshot>,
        missing: Vec<Field>,
    },
}

impl SourceError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            reason: reason.into(),
        }
    }

    /// Wraps a degraded snapshot, deriving the missing fields from it.
    pub fn partial(snapshot: Snapshot) -> Self {
        let missing = snapshot.missing_fields();
        SourceError::PartialRead {
            snapshot: Box::new(snapshot),
            missing,
        }
    }

    /// Returns the degraded snapshot of a partial read.
    pub fn degraded(self) -> Option<Snapshot> {
        match self {
            SourceError::PartialRead { snapshot, .. } => Some(*snapshot),
            SourceError::Unavailable { .. } => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable { reason } => write!(f, "source unavailable: {}", reason),
            SourceError::PartialRead { missing, .. } => {
                let names: Vec<&str> = missing.iter().map(|m| m.as_str()).collect();
                write!(f, "partial read, missing: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Turns a sample result into the snapshot to render, if any.
///
/// Full and partial reads both yield a snapshot; `Unavailable` is returned
/// as the error.
pub fn usable(result: Result<Snapshot, SourceError>) -> Result<Snapshot, SourceError> {
    match result {
        Ok(snapshot) => Ok(snapshot),
        Err(SourceError::PartialRead { snapshot, .. }) => Ok(*snapshot),
        Err(e) => Err(e),
    }
}
