//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` states for the sources.

use super::filesystem::MockFs;

/// Builds `/proc/cpuinfo` for one socket with `cores` cores and two
/// hyper-threads per core.
fn cpuinfo_ht(cores: u32, vendor: &str, model: &str, model_name: &str, mhz: &str) -> String {
    let mut out = String::new();
    for thread in 0..cores * 2 {
        out.push_str(&format!(
            "processor\t: {thread}\n\
             vendor_id\t: {vendor}\n\
             cpu family\t: 6\n\
             model\t\t: {model}\n\
             model name\t: {model_name}\n\
             cpu MHz\t\t: {mhz}\n\
             physical id\t: 0\n\
             siblings\t: {siblings}\n\
             core id\t\t: {core}\n\
             cpu cores\t: {cores}\n\
             \n",
            siblings = cores * 2,
            core = thread % cores,
        ));
    }
    out
}

impl MockFs {
    /// Creates a typical Ubuntu host: 4 cores / 8 threads at 3.6 GHz,
    /// 16 GB of memory with 8 GB available, no swap and 210 processes.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/cpuinfo",
            cpuinfo_ht(
                4,
                "GenuineIntel",
                "158",
                "Intel(R) Core(TM) i7-7700 CPU @ 3.60GHz",
                "800.000",
            ),
        );
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq",
            "3600000\n",
        );

        // 16e9 and 8e9 bytes expressed in kB
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       15625000 kB
MemFree:         2000000 kB
MemAvailable:    7812500 kB
Buffers:          512000 kB
Cached:          4096000 kB
SwapCached:            0 kB
SwapTotal:             0 kB
SwapFree:              0 kB
",
        );

        fs.add_file("/proc/sys/kernel/ostype", "Linux\n");
        fs.add_file("/proc/sys/kernel/osrelease", "5.15.0-91-generic\n");
        fs.add_file(
            "/etc/os-release",
            "\
PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"
NAME=\"Ubuntu\"
VERSION_ID=\"22.04\"
VERSION=\"22.04.3 LTS (Jammy Jellyfish)\"
ID=ubuntu
ID_LIKE=debian
",
        );

        fs.add_pids("/proc", 210);
        fs
    }

    /// Same host as [`MockFs::typical_system`] but with a kernel that does not
    /// report swap at all (no `SwapTotal`/`SwapFree` lines).
    pub fn no_swap() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       15625000 kB
MemFree:         2000000 kB
MemAvailable:    7812500 kB
",
        );
        fs
    }

    /// A host with swap in use: 2 GiB total, 512 MiB used.
    pub fn swapping() -> Self {
        let mut fs = Self::typical_system();
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       15625000 kB
MemFree:          100000 kB
MemAvailable:     300000 kB
SwapTotal:       2097152 kB
SwapFree:        1572864 kB
",
        );
        fs
    }

    /// A stripped-down container-like `/proc`: cpuinfo and meminfo only,
    /// no cpufreq, no os-release and no kernel identity files.
    pub fn minimal() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            "/proc/cpuinfo",
            "\
processor\t: 0
vendor_id\t: AuthenticAMD
model\t\t: 1
model name\t: AMD EPYC Processor
cpu MHz\t\t: 2994.372

processor\t: 1
vendor_id\t: AuthenticAMD
model\t\t: 1
model name\t: AMD EPYC Processor
cpu MHz\t\t: 2994.372
",
        );
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:        2048000 kB
MemAvailable:    1024000 kB
SwapTotal:             0 kB
SwapFree:              0 kB
",
        );
        fs.add_pids("/proc", 3);
        fs
    }
}
