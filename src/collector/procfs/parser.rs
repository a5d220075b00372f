//! Parsers for `/proc` and `/etc` files.
//!
//! These are pure functions that parse file content into structured data.
//! They are designed to be easily testable with string inputs.

use std::collections::{HashMap, HashSet};

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parsed data from `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfoData {
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub model_name: Option<String>,
    /// Number of `processor` entries.
    pub logical_cores: u32,
    /// Distinct `(physical id, core id)` pairs, or `cpu cores` per package
    /// when the topology keys are absent.
    pub physical_cores: Option<u32>,
    /// Highest `cpu MHz` seen across processors.
    pub max_mhz: Option<f64>,
}

/// Parses `/proc/cpuinfo` content.
///
/// Identity fields are taken from the first processor block. Blocks are
/// separated by blank lines; keys and values are separated by the first `:`.
pub fn parse_cpuinfo(content: &str) -> Result<CpuInfoData, ParseError> {
    let mut info = CpuInfoData::default();
    let mut cores: HashSet<(String, String)> = HashSet::new();
    let mut cores_per_package: HashMap<String, u32> = HashMap::new();

    let mut physical_id: Option<String> = None;
    let mut core_id: Option<String> = None;
    let mut cpu_cores: Option<u32> = None;

    let mut flush = |physical_id: &mut Option<String>,
                     core_id: &mut Option<String>,
                     cpu_cores: &mut Option<u32>| {
        let package = physical_id.take().unwrap_or_default();
        if let Some(core) = core_id.take() {
            cores.insert((package.clone(), core));
        }
        if let Some(n) = cpu_cores.take() {
            cores_per_package.insert(package, n);
        }
    };

    for line in content.lines() {
        if line.trim().is_empty() {
            flush(&mut physical_id, &mut core_id, &mut cpu_cores);
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "processor" => info.logical_cores += 1,
            "vendor_id" | "CPU implementer" if info.vendor.is_none() => {
                info.vendor = Some(value.to_string());
            }
            "model" if info.model.is_none() => info.model = Some(value.to_string()),
            "model name" if info.model_name.is_none() => {
                info.model_name = Some(value.to_string());
            }
            "cpu MHz" => {
                if let Ok(mhz) = value.parse::<f64>() {
                    info.max_mhz = Some(info.max_mhz.map_or(mhz, |m| m.max(mhz)));
                }
            }
            "physical id" => physical_id = Some(value.to_string()),
            "core id" => core_id = Some(value.to_string()),
            "cpu cores" => cpu_cores = value.parse().ok(),
            _ => {}
        }
    }
    flush(&mut physical_id, &mut core_id, &mut cpu_cores);

    if info.logical_cores == 0 {
        return Err(ParseError::new("no processor entries in cpuinfo"));
    }

    info.physical_cores = if !cores.is_empty() {
        Some(cores.len() as u32)
    } else if !cores_per_package.is_empty() {
        Some(cores_per_package.values().sum())
    } else {
        None
    };

    Ok(info)
}

/// Memory figures from `/proc/meminfo`, in kB.
///
/// Keys that are absent from the file stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: Option<u64>,
    pub mem_available: Option<u64>,
    pub swap_total: Option<u64>,
    pub swap_free: Option<u64>,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();

    let parse_kb = |line: &str| -> Result<u64, ParseError> {
        line.split_whitespace()
            .nth(1)
            .ok_or_else(|| ParseError::new(format!("missing value: {}", line)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid value: {}", line)))
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = Some(parse_kb(line)?);
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = Some(parse_kb(line)?);
        } else if line.starts_with("SwapTotal:") {
            info.swap_total = Some(parse_kb(line)?);
        } else if line.starts_with("SwapFree:") {
            info.swap_free = Some(parse_kb(line)?);
        }
    }

    if info.mem_total.is_none() {
        return Err(ParseError::new("MemTotal missing from meminfo"));
    }

    Ok(info)
}

/// Parses an `os-release` file into a key/value map with quotes removed.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Parses a single integer file such as `cpuinfo_max_freq`.
pub fn parse_single_u64(content: &str) -> Result<u64, ParseError> {
    let trimmed = content.trim();
    trimmed
        .parse()
        .map_err(|_| ParseError::new(format!("invalid integer: {:?}", trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPUINFO_2C4T: &str = "\
processor\t: 0
vendor_id\t: GenuineIntel
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 1800.000
physical id\t: 0
core id\t\t: 0
cpu cores\t: 2

processor\t: 1
vendor_id\t: GenuineIntel
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 3400.125
physical id\t: 0
core id\t\t: 1
cpu cores\t: 2

processor\t: 2
vendor_id\t: GenuineIntel
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 900.000
physical id\t: 0
core id\t\t: 0
cpu cores\t: 2

processor\t: 3
vendor_id\t: GenuineIntel
model\t\t: 142
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 900.000
physical id\t: 0
core id\t\t: 1
cpu cores\t: 2
";

    #[test]
    fn test_parse_cpuinfo_topology() {
        let info = parse_cpuinfo(CPUINFO_2C4T).unwrap();

        assert_eq!(info.vendor.as_deref(), Some("GenuineIntel"));
        assert_eq!(info.model.as_deref(), Some("142"));
        assert_eq!(
            info.model_name.as_deref(),
            Some("Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz")
        );
        assert_eq!(info.logical_cores, 4);
        assert_eq!(info.physical_cores, Some(2));
        assert_eq!(info.max_mhz, Some(3400.125));
    }

    #[test]
    fn test_parse_cpuinfo_without_topology() {
        let content = "processor\t: 0\nvendor_id\t: AuthenticAMD\n\nprocessor\t: 1\n";
        let info = parse_cpuinfo(content).unwrap();

        assert_eq!(info.logical_cores, 2);
        assert_eq!(info.physical_cores, None);
        assert_eq!(info.model_name, None);
        assert_eq!(info.max_mhz, None);
    }

    #[test]
    fn test_parse_cpuinfo_empty() {
        assert!(parse_cpuinfo("").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
SwapTotal:       4096000 kB
SwapFree:        1024000 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, Some(16384000));
        assert_eq!(info.mem_available, Some(12000000));
        assert_eq!(info.swap_total, Some(4096000));
        assert_eq!(info.swap_free, Some(1024000));
    }

    #[test]
    fn test_parse_meminfo_without_swap() {
        let info = parse_meminfo("MemTotal: 1024 kB\nMemAvailable: 512 kB\n").unwrap();
        assert_eq!(info.swap_total, None);
        assert_eq!(info.swap_free, None);
    }

    #[test]
    fn test_parse_meminfo_rejects_garbage() {
        assert!(parse_meminfo("MemTotal: lots kB\n").is_err());
        assert!(parse_meminfo("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn test_parse_os_release() {
        let content = "\
# comment
NAME=\"Fedora Linux\"
VERSION_ID=39
PRETTY_NAME='Fedora Linux 39 (Workstation Edition)'
";
        let map = parse_os_release(content);
        assert_eq!(map.get("NAME").map(String::as_str), Some("Fedora Linux"));
        assert_eq!(map.get("VERSION_ID").map(String::as_str), Some("39"));
        assert_eq!(
            map.get("PRETTY_NAME").map(String::as_str),
            Some("Fedora Linux 39 (Workstation Edition)")
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_parse_single_u64() {
        assert_eq!(parse_single_u64("3600000\n").unwrap(), 3600000);
        assert!(parse_single_u64("n/a").is_err());
    }
}
