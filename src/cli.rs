//! Command-line arguments shared by the binaries.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[cfg(not(target_os = "linux"))]
use crate::collector::MockFs;
#[cfg(target_os = "linux")]
use crate::collector::RealFs;
use crate::collector::{MetricsSource, ProcfsSource};
use crate::config::{ConfigError, LoopConfig};

/// Where sensor data is read from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc", env = "HOSTPANEL_PROC_PATH")]
    pub proc_path: String,

    /// Path to /sys filesystem (CPU frequency).
    #[arg(long, default_value = "/sys", env = "HOSTPANEL_SYS_PATH")]
    pub sys_path: String,

    /// Directory holding os-release.
    #[arg(long, default_value = "/etc", env = "HOSTPANEL_ETC_PATH")]
    pub etc_path: String,
}

impl SourceArgs {
    /// Builds the `/proc` source. Off Linux there is no `/proc`, so the
    /// source reports itself unavailable.
    pub fn build(&self) -> Arc<dyn MetricsSource> {
        #[cfg(target_os = "linux")]
        let fs = RealFs::new();
        #[cfg(not(target_os = "linux"))]
        let fs = MockFs::new();

        Arc::new(
            ProcfsSource::new(fs, &self.proc_path)
                .with_sys_path(&self.sys_path)
                .with_etc_path(&self.etc_path),
        )
    }
}

/// Loop timing.
#[derive(Args, Debug, Clone)]
pub struct TimingArgs {
    /// Refresh interval in milliseconds.
    #[arg(
        short,
        long = "interval",
        value_name = "MS",
        default_value_t = 1000,
        env = "HOSTPANEL_INTERVAL"
    )]
    pub interval_ms: u64,

    /// Delay before the first sample, in milliseconds.
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 100,
        env = "HOSTPANEL_INITIAL_DELAY_MS"
    )]
    pub initial_delay_ms: u64,

    /// Give up on a sensor read after this many milliseconds.
    #[arg(
        long,
        value_name = "MS",
        default_value_t = 2000,
        env = "HOSTPANEL_SAMPLE_TIMEOUT_MS"
    )]
    pub sample_timeout_ms: u64,
}

impl TimingArgs {
    pub fn loop_config(&self) -> Result<LoopConfig, ConfigError> {
        let config = LoopConfig::default()
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
            .with_sample_timeout(Duration::from_millis(self.sample_timeout_ms));
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct Verbosity {
    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Verbosity {
    pub fn level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        }
    }

    /// `RUST_LOG` wins; otherwise other crates log at `warn` and ours at
    /// the selected level.
    pub fn env_filter(&self) -> EnvFilter {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        match format!("hostpanel={}", self.level()).parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    }
}
