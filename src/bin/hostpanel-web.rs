//! hostpanel-web - HTTP server streaming host panels over SSE.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Handle;
use tracing::{error, info};

use hostpanel::cli::{SourceArgs, TimingArgs, Verbosity};
use hostpanel::scheduler::Scheduler;
use hostpanel::web::{WebState, router};

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "hostpanel-web",
    about = "Host panel web API server",
    version = hostpanel::VERSION
)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "HOSTPANEL_LISTEN")]
    listen: SocketAddr,

    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    timing: TimingArgs,

    #[command(flatten)]
    verbosity: Verbosity,
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.verbosity.env_filter())
        .init();

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

    if let Err(code) = runtime.block_on(async_main(args)) {
        process::exit(code);
    }
}

async fn async_main(args: Args) -> Result<(), i32> {
    let config = args.timing.loop_config().map_err(|e| {
        error!(error = %e, "invalid configuration");
        2
    })?;

    let source = args.source.build();
    info!(
        version = hostpanel::VERSION,
        source = source.name(),
        proc = %args.source.proc_path,
        interval_ms = config.interval.as_millis() as u64,
        "starting"
    );

    let scheduler = Scheduler::new(source, config, Handle::current()).map_err(|e| {
        error!(error = %e, "invalid configuration");
        2
    })?;
    let scheduler = Arc::new(scheduler);
    let app = router(Arc::new(WebState::new(scheduler.clone())));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .map_err(|e| {
            error!(addr = %args.listen, error = %e, "failed to bind");
            1
        })?;
    info!(addr = %args.listen, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.shutdown();
    served.map_err(|e| {
        error!(error = %e, "server error");
        1
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
