//! Snapshot to panel rendering.
//!
//! [`render`] is a pure function: equal snapshots always produce equal
//! panels, line for line. The four sections and their line order are fixed.

use std::fmt;

use crate::fmt::{
    UNKNOWN, format_clock, format_gb, format_ghz, format_mb_pair, format_minutes, or_unknown,
};
use crate::model::{PanelModel, Section, Snapshot};

pub const PROCESSOR: &str = "Processor";
pub const MEMORY: &str = "Memory";
pub const OPERATING_SYSTEM: &str = "Operating System";
pub const UPTIME: &str = "Uptime";

/// Section titles in display order.
pub const SECTION_TITLES: [&str; 4] = [PROCESSOR, MEMORY, OPERATING_SYSTEM, UPTIME];

/// Snapshot values that cannot describe a real host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    AvailableExceedsTotal { available: u64, total: u64 },
    SwapUsedExceedsTotal { used: u64, total: u64 },
    ThreadsBelowCores { logical: u32, physical: u32 },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::AvailableExceedsTotal { available, total } => write!(
                f,
                "available memory {} exceeds total {}",
                available, total
            ),
            RenderError::SwapUsedExceedsTotal { used, total } => {
                write!(f, "swap used {} exceeds swap total {}", used, total)
            }
            RenderError::ThreadsBelowCores { logical, physical } => write!(
                f,
                "{} logical cores is fewer than {} physical cores",
                logical, physical
            ),
        }
    }
}

impl std::error::Error for RenderError {}

/// Checks a snapshot for internally inconsistent values.
///
/// Unknown fields never fail validation.
pub fn validate(snapshot: &Snapshot) -> Result<(), RenderError> {
    let mem = &snapshot.memory;
    if let (Some(available), Some(total)) = (mem.available_bytes, mem.total_bytes)
        && available > total
    {
        return Err(RenderError::AvailableExceedsTotal { available, total });
    }
    if let (Some(used), Some(total)) = (mem.swap_used_bytes, mem.swap_total_bytes)
        && used > total
    {
        return Err(RenderError::SwapUsedExceedsTotal { used, total });
    }
    let cpu = &snapshot.cpu;
    if let (Some(logical), Some(physical)) = (cpu.logical_cores, cpu.physical_cores)
        && logical < physical
    {
        return Err(RenderError::ThreadsBelowCores { logical, physical });
    }
    Ok(())
}

/// Renders a snapshot into the four-section panel.
pub fn render(snapshot: &Snapshot) -> PanelModel {
    PanelModel {
        sections: vec![
            processor_section(snapshot),
            memory_section(snapshot),
            os_section(snapshot),
            uptime_section(snapshot),
        ],
    }
}

fn processor_section(snapshot: &Snapshot) -> Section {
    let cpu = &snapshot.cpu;
    Section::new(
        PROCESSOR,
        vec![
            format!("Vendor: {}", or_unknown(cpu.vendor.as_deref())),
            format!(
                "Model: {} {}",
                or_unknown(cpu.model.as_deref()),
                or_unknown(cpu.name.as_deref())
            ),
            format!(
                "Clock speed: {}",
                cpu.max_freq_hz.map_or_else(|| UNKNOWN.to_string(), format_ghz)
            ),
            format!("Cores: {}", or_unknown(cpu.physical_cores)),
            format!("Threads: {}", or_unknown(cpu.logical_cores)),
        ],
    )
}

fn memory_section(snapshot: &Snapshot) -> Section {
    let mem = &snapshot.memory;
    let swap = match (mem.swap_used_bytes, mem.swap_total_bytes) {
        (Some(used), Some(total)) => format_mb_pair(used, total),
        _ => UNKNOWN.to_string(),
    };
    Section::new(
        MEMORY,
        vec![
            format!(
                "Total: {}",
                mem.total_bytes.map_or_else(|| UNKNOWN.to_string(), format_gb)
            ),
            format!(
                "Available: {}",
                mem.available_bytes
                    .map_or_else(|| UNKNOWN.to_string(), format_gb)
            ),
            format!("Swap: {}", swap),
        ],
    )
}

fn os_section(snapshot: &Snapshot) -> Section {
    let os = &snapshot.os;
    Section::new(
        OPERATING_SYSTEM,
        vec![
            format!(
                "Name: {} {} {}",
                or_unknown(os.family.as_deref()),
                or_unknown(os.manufacturer.as_deref()),
                or_unknown(os.version.as_deref())
            ),
            format!("Processes: {}", or_unknown(os.process_count)),
        ],
    )
}

fn uptime_section(snapshot: &Snapshot) -> Section {
    Section::new(
        UPTIME,
        vec![
            format!("Uptime: {}", format_minutes(snapshot.uptime_minutes)),
            format!("Current time: {}", format_clock(&snapshot.sampled_at)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CpuInfo, MemoryInfo, OsInfo};
    use chrono::{TimeZone, Utc};

    fn reference_snapshot() -> Snapshot {
        Snapshot {
            cpu: CpuInfo {
                vendor: Some("GenuineIntel".into()),
                model: Some("X".into()),
                name: Some("Core i7".into()),
                max_freq_hz: Some(3_600_000_000),
                physical_cores: Some(4),
                logical_cores: Some(8),
            },
            memory: MemoryInfo {
                total_bytes: Some(16_000_000_000),
                available_bytes: Some(8_000_000_000),
                swap_used_bytes: Some(0),
                swap_total_bytes: Some(0),
            },
            os: OsInfo {
                family: Some("Linux".into()),
                manufacturer: Some("Ubuntu".into()),
                version: Some("22.04".into()),
                process_count: Some(210),
            },
            uptime_minutes: 42,
            sampled_at: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
        }
    }

    fn lines<'a>(panel: &'a PanelModel, title: &str) -> &'a [String] {
        &panel.section(title).unwrap().lines
    }

    #[test]
    fn test_render_reference_host() {
        let panel = render(&reference_snapshot());

        let titles: Vec<&str> = panel.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, SECTION_TITLES);

        assert_eq!(
            lines(&panel, PROCESSOR),
            [
                "Vendor: GenuineIntel",
                "Model: X Core i7",
                "Clock speed: 3.6 GHz",
                "Cores: 4",
                "Threads: 8",
            ]
        );
        assert_eq!(
            lines(&panel, MEMORY),
            ["Total: 16.000 GB", "Available: 8.000 GB", "Swap: 0/0 MB"]
        );
        let os = panel.section(OPERATING_SYSTEM).unwrap();
        assert!(os.line("Name").unwrap().contains("Linux Ubuntu 22.04"));
        assert_eq!(os.line("Processes"), Some("Processes: 210"));
        assert_eq!(
            lines(&panel, UPTIME),
            ["Uptime: 42 min", "Current time: 2026-10-19 12:00:00 UTC"]
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = reference_snapshot();
        let b = a.clone();
        let first = render(&a);
        assert_eq!(first, render(&a));
        assert_eq!(first, render(&b));
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&render(&b)).unwrap()
        );
    }

    #[test]
    fn test_unknown_swap_only_changes_swap_line() {
        let full = render(&reference_snapshot());

        let mut degraded = reference_snapshot();
        degraded.memory.swap_used_bytes = None;
        degraded.memory.swap_total_bytes = None;
        let partial = render(&degraded);

        for (a, b) in full.sections.iter().zip(&partial.sections) {
            for (line_a, line_b) in a.lines.iter().zip(&b.lines) {
                if line_a.starts_with("Swap:") {
                    assert_eq!(line_b, "Swap: unknown");
                } else {
                    assert_eq!(line_a, line_b);
                }
            }
        }
    }

    #[test]
    fn test_all_unknown_renders_placeholders() {
        let snapshot = Snapshot::empty(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let panel = render(&snapshot);

        assert_eq!(
            lines(&panel, PROCESSOR),
            [
                "Vendor: unknown",
                "Model: unknown unknown",
                "Clock speed: unknown",
                "Cores: unknown",
                "Threads: unknown",
            ]
        );
        assert_eq!(
            lines(&panel, OPERATING_SYSTEM),
            ["Name: unknown unknown unknown", "Processes: unknown"]
        );
        assert!(validate(&snapshot).is_ok());
    }

    #[test]
    fn test_swap_in_use() {
        let mut snapshot = reference_snapshot();
        snapshot.memory.swap_used_bytes = Some(512_000_000);
        snapshot.memory.swap_total_bytes = Some(2_048_000_000);
        let panel = render(&snapshot);
        assert_eq!(
            panel.section(MEMORY).unwrap().line("Swap"),
            Some("Swap: 512/2048 MB")
        );
    }

    #[test]
    fn test_validate_rejects_inconsistent_values() {
        let mut snapshot = reference_snapshot();
        snapshot.memory.available_bytes = Some(20_000_000_000);
        assert_eq!(
            validate(&snapshot),
            Err(RenderError::AvailableExceedsTotal {
                available: 20_000_000_000,
                total: 16_000_000_000
            })
        );

        let mut snapshot = reference_snapshot();
        snapshot.memory.swap_used_bytes = Some(1);
        assert!(matches!(
            validate(&snapshot),
            Err(RenderError::SwapUsedExceedsTotal { .. })
        ));

        let mut snapshot = reference_snapshot();
        snapshot.cpu.logical_cores = Some(2);
        assert_eq!(
            validate(&snapshot).unwrap_err().to_string(),
            "2 logical cores is fewer than 4 physical cores"
        );

        assert!(validate(&reference_snapshot()).is_ok());
    }
}
