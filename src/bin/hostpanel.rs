//! hostpanel - interactive terminal viewer for the host panel.
//!
//! Usage:
//!   hostpanel                    # refresh every second
//!   hostpanel -i 250             # refresh every 250 ms
//!   hostpanel --log-file ./hp.log -v

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{error, info};

use hostpanel::cli::{SourceArgs, TimingArgs, Verbosity};
use hostpanel::scheduler::{ClientId, Scheduler};
use hostpanel::tui::App;

/// Interactive host panel viewer.
#[derive(Parser)]
#[command(name = "hostpanel", about = "Host metrics panel viewer", version = hostpanel::VERSION)]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    timing: TimingArgs,

    /// Write logs to this file. The terminal is owned by the viewer, so
    /// nothing is logged without it.
    #[arg(long, value_name = "PATH", env = "HOSTPANEL_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    verbosity: Verbosity,
}

fn init_logging(path: &Path, verbosity: Verbosity) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(verbosity.env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file
        && let Err(e) = init_logging(path, args.verbosity)
    {
        eprintln!("Error: cannot open log file {}: {}", path.display(), e);
        process::exit(1);
    }

    let config = match args.timing.loop_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to build tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let source = args.source.build();
    info!(
        version = hostpanel::VERSION,
        source = source.name(),
        interval_ms = config.interval.as_millis() as u64,
        "hostpanel starting"
    );
    let scheduler = match Scheduler::new(source, config, runtime.handle().clone()) {
        Ok(scheduler) => Arc::new(scheduler),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let app = App::new(scheduler.clone(), ClientId::from("terminal"), config.interval);
    let result = app.run();

    scheduler.shutdown();
    runtime.shutdown_timeout(config.sample_timeout);

    if let Err(e) = result {
        error!(error = %e, "terminal error");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
