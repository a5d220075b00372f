//! hostpaneld - headless host panel daemon.
//!
//! Subscribes one loop and writes every panel to stdout, either as JSON
//! lines or as log lines. Stops on Ctrl-C, when stdout is closed or when
//! the metrics source becomes unavailable.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use hostpanel::cli::{SourceArgs, TimingArgs, Verbosity};
use hostpanel::scheduler::Scheduler;
use hostpanel::sink::{JsonLinesSink, LogSink, Sink};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// One JSON object per panel on stdout.
    Json,
    /// One log line per section.
    Log,
}

/// Host panel daemon.
#[derive(Parser)]
#[command(name = "hostpaneld", about = "Headless host panel daemon", version = hostpanel::VERSION)]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    timing: TimingArgs,

    /// Output format.
    #[arg(long, value_enum, default_value = "json", env = "HOSTPANEL_FORMAT")]
    format: Format,

    /// Client name used in logs.
    #[arg(long, default_value = "hostpaneld")]
    client: String,

    #[command(flatten)]
    verbosity: Verbosity,
}

fn init_logging(verbosity: Verbosity) {
    // stdout carries the panels; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(verbosity.env_filter())
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbosity);

    let config = match args.timing.loop_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    let source = args.source.build();
    info!(
        version = hostpanel::VERSION,
        source = source.name(),
        proc = %args.source.proc_path,
        interval_ms = config.interval.as_millis() as u64,
        format = ?args.format,
        "hostpaneld starting"
    );

    let scheduler = match Scheduler::new(source, config, runtime.handle().clone()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(2);
        }
    };

    let sink: Arc<dyn Sink> = match args.format {
        Format::Json => Arc::new(JsonLinesSink::new(io::stdout())),
        Format::Log => Arc::new(LogSink),
    };
    let handle = scheduler.subscribe(args.client.clone(), config.interval, sink.clone());

    let interrupted = Arc::new(AtomicBool::new(false));
    let on_signal = handle.clone();
    let flag = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        on_signal.cancel();
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }

    runtime.block_on(handle.closed());
    scheduler.shutdown();
    drop(scheduler);
    runtime.shutdown_timeout(config.sample_timeout);

    if interrupted.load(Ordering::SeqCst) {
        info!(client = %args.client, "hostpaneld stopped");
    } else if sink.is_closed() {
        info!(client = %args.client, "output closed, hostpaneld stopped");
    } else {
        // otherwise the loop only ends when metrics became unavailable
        error!(client = %args.client, "metrics loop stopped, exiting");
        process::exit(1);
    }
}
