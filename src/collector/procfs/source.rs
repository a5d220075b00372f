//! Metrics source backed by the Linux `/proc` and `/sys` filesystems.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use crate::collector::procfs::parser::{
    CpuInfoData, MemInfo, parse_cpuinfo, parse_meminfo, parse_os_release, parse_single_u64,
};
use crate::collector::traits::FileSystem;
use crate::collector::{MetricsSource, SourceError};
use crate::model::{CpuInfo, MemoryInfo, OsInfo, Snapshot};

const KB: u64 = 1024;

/// A value too large to express in bytes counts as unreadable.
fn kb_to_bytes(kb: u64) -> Option<u64> {
    kb.checked_mul(KB)
}

/// Reads host metrics from `/proc`, `/sys` and `os-release`.
///
/// Holds no mutable state, so one instance can serve any number of loops.
pub struct ProcfsSource<F: FileSystem> {
    fs: F,
    proc_path: String,
    sys_path: String,
    etc_path: String,
    usr_lib_path: String,
    started_at: Instant,
}

impl<F: FileSystem> ProcfsSource<F> {
    /// Creates a new source.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    ///
    /// The reported uptime counts from this call.
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: "/sys".to_string(),
            etc_path: "/etc".to_string(),
            usr_lib_path: "/usr/lib".to_string(),
            started_at: Instant::now(),
        }
    }

    /// Overrides the sysfs root (default `/sys`).
    pub fn with_sys_path(mut self, path: impl Into<String>) -> Self {
        self.sys_path = path.into();
        self
    }

    /// Overrides the directory holding `os-release` (default `/etc`).
    ///
    /// The `usr/lib` fallback moves with it: `/host/etc` falls back to
    /// `/host/usr/lib/os-release`.
    pub fn with_etc_path(mut self, path: impl Into<String>) -> Self {
        self.etc_path = path.into();
        let root = Path::new(&self.etc_path).parent().unwrap_or(Path::new("/"));
        self.usr_lib_path = root.join("usr/lib").to_string_lossy().into_owned();
        self
    }

    /// Overrides the fallback directory for `os-release` (default `/usr/lib`).
    pub fn with_usr_lib_path(mut self, path: impl Into<String>) -> Self {
        self.usr_lib_path = path.into();
        self
    }

    /// Sets the instant uptime is counted from.
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    fn read(&self, path: &str) -> Option<String> {
        match self.fs.read_to_string(Path::new(path)) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(path, error = %e, "sensor file unreadable");
                None
            }
        }
    }

    fn read_cpuinfo(&self) -> Result<CpuInfoData, String> {
        let path = format!("{}/cpuinfo", self.proc_path);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|e| format!("{}: {}", path, e))?;
        parse_cpuinfo(&content).map_err(|e| format!("{}: {}", path, e))
    }

    fn read_meminfo(&self) -> Result<MemInfo, String> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|e| format!("{}: {}", path, e))?;
        parse_meminfo(&content).map_err(|e| format!("{}: {}", path, e))
    }

    /// Maximum frequency from cpufreq (kHz), falling back to the highest
    /// `cpu MHz` in cpuinfo.
    fn max_freq_hz(&self, cpuinfo: Option<&CpuInfoData>) -> Option<u64> {
        let path = format!(
            "{}/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq",
            self.sys_path
        );
        let from_sysfs = self
            .read(&path)
            .and_then(|content| parse_single_u64(&content).ok())
            .and_then(|khz| khz.checked_mul(1000));

        from_sysfs.or_else(|| {
            cpuinfo
                .and_then(|c| c.max_mhz)
                .map(|mhz| (mhz * 1_000_000.0).round() as u64)
        })
    }

    fn cpu(&self, cpuinfo: Option<CpuInfoData>) -> CpuInfo {
        let max_freq_hz = self.max_freq_hz(cpuinfo.as_ref());
        match cpuinfo {
            Some(c) => CpuInfo {
                vendor: c.vendor,
                model: c.model,
                name: c.model_name,
                max_freq_hz,
                physical_cores: c.physical_cores.or(Some(c.logical_cores)),
                logical_cores: Some(c.logical_cores),
            },
            None => CpuInfo {
                max_freq_hz,
                ..CpuInfo::default()
            },
        }
    }

    fn memory(meminfo: Option<MemInfo>) -> MemoryInfo {
        let Some(m) = meminfo else {
            return MemoryInfo::default();
        };
        let swap_used = match (m.swap_total, m.swap_free) {
            (Some(total), Some(free)) => total.saturating_sub(free).checked_mul(KB),
            _ => None,
        };
        MemoryInfo {
            total_bytes: m.mem_total.and_then(kb_to_bytes),
            available_bytes: m.mem_available.and_then(kb_to_bytes),
            swap_used_bytes: swap_used,
            swap_total_bytes: m.swap_total.and_then(kb_to_bytes),
        }
    }

    fn os(&self) -> OsInfo {
        let family = self
            .read(&format!("{}/sys/kernel/ostype", self.proc_path))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let release = self
            .read(&format!("{}/os-release", self.etc_path))
            .or_else(|| self.read(&format!("{}/os-release", self.usr_lib_path)))
            .map(|content| parse_os_release(&content))
            .unwrap_or_default();

        let version = release.get("VERSION_ID").cloned().or_else(|| {
            self.read(&format!("{}/sys/kernel/osrelease", self.proc_path))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        });

        OsInfo {
            family,
            manufacturer: release.get("NAME").cloned(),
            version,
            process_count: self.process_count(),
        }
    }

    fn process_count(&self) -> Option<u32> {
        let entries = match self.fs.read_dir(Path::new(&self.proc_path)) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %self.proc_path, error = %e, "cannot list processes");
                return None;
            }
        };
        let count = entries
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|n| n.to_str())
            .filter(|n| n.parse::<u32>().is_ok())
            .count();
        Some(count as u32)
    }
}

impl<F: FileSystem> MetricsSource for ProcfsSource<F> {
    fn sample(&self) -> Result<Snapshot, SourceError> {
        if !self.fs.exists(Path::new(&self.proc_path)) {
            return Err(SourceError::unavailable(format!(
                "{} does not exist",
                self.proc_path
            )));
        }

        let cpuinfo = self.read_cpuinfo();
        let meminfo = self.read_meminfo();
        if let (Err(cpu_err), Err(mem_err)) = (&cpuinfo, &meminfo) {
            return Err(SourceError::unavailable(format!(
                "{}; {}",
                cpu_err, mem_err
            )));
        }

        let cpuinfo = cpuinfo
            .inspect_err(|e| debug!(error = %e, "cpuinfo unavailable"))
            .ok();
        let meminfo = meminfo
            .inspect_err(|e| debug!(error = %e, "meminfo unavailable"))
            .ok();

        let snapshot = Snapshot {
            cpu: self.cpu(cpuinfo),
            memory: Self::memory(meminfo),
            os: self.os(),
            uptime_minutes: self.started_at.elapsed().as_secs() / 60,
            sampled_at: Utc::now(),
        };

        if snapshot.missing_fields().is_empty() {
            Ok(snapshot)
        } else {
            Err(SourceError::partial(snapshot))
        }
    }

    fn name(&self) -> &str {
        "procfs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Field;
    use crate::collector::mock::MockFs;
    use crate::collector::traits::RealFs;
    use std::time::Duration;

    #[test]
    fn test_typical_system_is_complete() {
        let source = ProcfsSource::new(MockFs::typical_system(), "/proc");
        let snapshot = source.sample().unwrap();

        assert_eq!(snapshot.cpu.vendor.as_deref(), Some("GenuineIntel"));
        assert_eq!(snapshot.cpu.model.as_deref(), Some("158"));
        assert_eq!(snapshot.cpu.max_freq_hz, Some(3_600_000_000));
        assert_eq!(snapshot.cpu.physical_cores, Some(4));
        assert_eq!(snapshot.cpu.logical_cores, Some(8));
        assert_eq!(snapshot.memory.total_bytes, Some(16_000_000_000));
        assert_eq!(snapshot.memory.available_bytes, Some(8_000_000_000));
        assert_eq!(snapshot.memory.swap_used_bytes, Some(0));
        assert_eq!(snapshot.memory.swap_total_bytes, Some(0));
        assert_eq!(snapshot.os.family.as_deref(), Some("Linux"));
        assert_eq!(snapshot.os.manufacturer.as_deref(), Some("Ubuntu"));
        assert_eq!(snapshot.os.version.as_deref(), Some("22.04"));
        assert_eq!(snapshot.os.process_count, Some(210));
        assert_eq!(snapshot.uptime_minutes, 0);
    }

    #[test]
    fn test_missing_swap_is_partial_read() {
        let source = ProcfsSource::new(MockFs::no_swap(), "/proc");
        let err = source.sample().unwrap_err();

        match err {
            SourceError::PartialRead { snapshot, missing } => {
                assert_eq!(missing, vec![Field::SwapUsed, Field::SwapTotal]);
                assert_eq!(snapshot.memory.total_bytes, Some(16_000_000_000));
            }
            other => panic!("expected partial read, got {other}"),
        }
    }

    #[test]
    fn test_swap_used_is_total_minus_free() {
        let source = ProcfsSource::new(MockFs::swapping(), "/proc");
        let snapshot = source.sample().unwrap();
        assert_eq!(snapshot.memory.swap_total_bytes, Some(2_097_152 * 1024));
        assert_eq!(snapshot.memory.swap_used_bytes, Some(524_288 * 1024));
    }

    #[test]
    fn test_minimal_system_falls_back() {
        let source = ProcfsSource::new(MockFs::minimal(), "/proc");
        let err = source.sample().unwrap_err();
        let SourceError::PartialRead { snapshot, missing } = err else {
            panic!("expected partial read");
        };

        // cpu MHz fallback, logical count stands in for physical
        assert_eq!(snapshot.cpu.max_freq_hz, Some(2_994_372_000));
        assert_eq!(snapshot.cpu.physical_cores, Some(2));
        assert_eq!(snapshot.os.process_count, Some(3));
        assert!(missing.contains(&Field::OsFamily));
        assert!(missing.contains(&Field::OsManufacturer));
        assert!(missing.contains(&Field::OsVersion));
        assert!(!missing.contains(&Field::MemoryTotal));
    }

    #[test]
    fn test_kernel_release_used_without_os_release() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/etc/os-release");
        let source = ProcfsSource::new(fs, "/proc");

        let snapshot = source.sample().unwrap_err().degraded().unwrap();
        assert_eq!(snapshot.os.version.as_deref(), Some("5.15.0-91-generic"));
        assert_eq!(snapshot.os.manufacturer, None);
    }

    #[test]
    fn test_os_release_fallback_follows_etc_root() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/etc/os-release");
        fs.add_file("/usr/lib/os-release", "NAME=\"Ubuntu\"\n");
        fs.add_file("/host/usr/lib/os-release", "NAME=\"Fedora Linux\"\nVERSION_ID=40\n");

        let source = ProcfsSource::new(fs, "/proc").with_etc_path("/host/etc");
        let snapshot = source.sample().unwrap();
        assert_eq!(snapshot.os.manufacturer.as_deref(), Some("Fedora Linux"));
        assert_eq!(snapshot.os.version.as_deref(), Some("40"));
    }

    #[test]
    fn test_empty_etc_root_reports_no_manufacturer() {
        let root = tempfile::tempdir().unwrap();
        let proc = root.path().join("proc");
        let etc = root.path().join("etc");
        std::fs::create_dir_all(&proc).unwrap();
        std::fs::create_dir_all(&etc).unwrap();
        std::fs::write(proc.join("meminfo"), "MemTotal: 1000 kB\n").unwrap();

        let source = ProcfsSource::new(RealFs::new(), proc.to_string_lossy())
            .with_sys_path(root.path().join("sys").to_string_lossy())
            .with_etc_path(etc.to_string_lossy());
        let snapshot = source.sample().unwrap_err().degraded().unwrap();
        assert_eq!(snapshot.os.manufacturer, None);
    }

    #[test]
    fn test_oversized_values_are_unreadable() {
        let mut fs = MockFs::typical_system();
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       18446744073709551615 kB
MemAvailable:    7812500 kB
SwapTotal:             0 kB
SwapFree:              0 kB
",
        );
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq",
            "18446744073709551615\n",
        );
        let source = ProcfsSource::new(fs, "/proc");

        let SourceError::PartialRead { snapshot, missing } = source.sample().unwrap_err() else {
            panic!("expected partial read");
        };
        assert_eq!(missing, vec![Field::MemoryTotal]);
        assert_eq!(snapshot.memory.available_bytes, Some(8_000_000_000));
        // cpu MHz from cpuinfo takes over
        assert_eq!(snapshot.cpu.max_freq_hz, Some(800_000_000));
    }

    #[test]
    fn test_missing_proc_is_unavailable() {
        let source = ProcfsSource::new(MockFs::new(), "/proc");
        let err = source.sample().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("/proc does not exist"));
    }

    #[test]
    fn test_unreadable_cpu_and_memory_is_unavailable() {
        let mut fs = MockFs::new();
        fs.add_pids("/proc", 2);
        let source = ProcfsSource::new(fs, "/proc");
        assert!(source.sample().unwrap_err().is_fatal());
    }

    #[test]
    fn test_uptime_counts_whole_minutes() {
        let started = Instant::now()
            .checked_sub(Duration::from_secs(42 * 60 + 59))
            .unwrap();
        let source = ProcfsSource::new(MockFs::typical_system(), "/proc").with_started_at(started);
        assert_eq!(source.sample().unwrap().uptime_minutes, 42);
    }

    #[test]
    fn test_real_fs_layout() {
        let root = tempfile::tempdir().unwrap();
        let proc = root.path().join("proc");
        let etc = root.path().join("etc");
        std::fs::create_dir_all(proc.join("sys/kernel")).unwrap();
        std::fs::create_dir_all(proc.join("1")).unwrap();
        std::fs::create_dir_all(proc.join("self")).unwrap();
        std::fs::create_dir_all(&etc).unwrap();
        std::fs::write(
            proc.join("cpuinfo"),
            "processor\t: 0\nvendor_id\t: GenuineIntel\nmodel\t\t: 1\nmodel name\t: Test CPU\ncpu MHz\t\t: 1000.000\n",
        )
        .unwrap();
        std::fs::write(
            proc.join("meminfo"),
            "MemTotal: 1000 kB\nMemAvailable: 500 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
        )
        .unwrap();
        std::fs::write(proc.join("sys/kernel/ostype"), "Linux\n").unwrap();
        std::fs::write(etc.join("os-release"), "NAME=Debian\nVERSION_ID=\"12\"\n").unwrap();

        let source = ProcfsSource::new(RealFs::new(), proc.to_string_lossy())
            .with_sys_path(root.path().join("sys").to_string_lossy())
            .with_etc_path(etc.to_string_lossy());
        let snapshot = source.sample().unwrap();

        assert_eq!(snapshot.cpu.max_freq_hz, Some(1_000_000_000));
        assert_eq!(snapshot.memory.total_bytes, Some(1_024_000));
        assert_eq!(snapshot.os.manufacturer.as_deref(), Some("Debian"));
        assert_eq!(snapshot.os.version.as_deref(), Some("12"));
        // "self" is not a pid
        assert_eq!(snapshot.os.process_count, Some(1));
    }
}
