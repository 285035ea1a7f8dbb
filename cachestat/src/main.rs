//! # cachestat - Main Entry Point
//!
//! Startup order matters:
//! 1. pre-flight checks, PID file lock and probe attachment run while still
//!    attached to the terminal, so failures are visible
//! 2. daemon mode forks before the async runtime exists
//! 3. the sampler runs on a tokio runtime until SIGTERM/SIGINT; both are
//!    blocked from the start and released once the handlers exist

use anyhow::{Context, Result};
use aya::Ebpf;
use clap::Parser;
use log::{info, warn};

use cachestat::cli::Args;
use cachestat::counters::KernelCounters;
use cachestat::domain::ExecutionMode;
use cachestat::lifecycle::{detach, termination, DeferredSignals, PidFile};
use cachestat::logging::init_logging;
use cachestat::preflight::run_preflight_checks;
use cachestat::probes::{attach_all, load_ebpf_program, EbpfAttacher, TraceFs};
use cachestat::report::{Reporter, StatsdReporter, StdoutReporter};
use cachestat::sampler::Sampler;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_level.into(), args.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_ERROR);
    }

    let code = match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            code
        }
    };

    log::logger().flush();
    std::process::exit(code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

fn run(args: &Args) -> Result<()> {
    let mode = args.mode();
    info!("Starting cachestat in {mode} mode...");

    let deferred = DeferredSignals::block().context("Failed to block termination signals")?;

    run_preflight_checks()?;

    // Locked before forking; the flock is inherited by the daemon
    let mut pid_file = match mode {
        ExecutionMode::Daemon => Some(PidFile::acquire(&args.pid_file)?),
        ExecutionMode::Foreground => None,
    };

    let mut bpf = attach_probes()?;

    if mode == ExecutionMode::Daemon {
        if args.log_file.is_none() {
            warn!("Running as daemon without --log-file: logs will be discarded");
        }
        if !args.send_metrics {
            warn!("Running as daemon without --send-metrics: samples will be discarded");
        }
        detach()?;
        if let Some(pid_file) = pid_file.as_mut() {
            pid_file.write_pid()?;
        }
        info!("Detached, pid {}", std::process::id());
    }

    let counters = KernelCounters::from_ebpf(&mut bpf)?;
    let reporter = build_reporter(args)?;

    sample(args, mode, deferred, counters, reporter)?;

    // Probes stay attached until the eBPF object is dropped
    drop(bpf);
    drop(pid_file);
    Ok(())
}

/// Load the counting programs and bind every event class
fn attach_probes() -> Result<Ebpf> {
    let mut bpf = load_ebpf_program().context("Failed to load eBPF program")?;
    let tracefs = TraceFs::discover()?;

    let bindings = attach_all(&tracefs, &mut EbpfAttacher::new(&mut bpf))
        .context("Failed to attach page-cache probes")?;
    for binding in bindings.iter() {
        info!("✓ Attached {binding}");
    }
    info!("✓ All event classes attached (tracefs at {})", tracefs.root().display());

    Ok(bpf)
}

fn build_reporter(args: &Args) -> Result<Box<dyn Reporter>> {
    if args.send_metrics {
        let reporter =
            StatsdReporter::connect((args.statsd_host.as_str(), args.statsd_port), &args.metric_name)
                .with_context(|| {
                    format!("Failed to set up statsd at {}:{}", args.statsd_host, args.statsd_port)
                })?;
        info!(
            "Sending {} to statsd at {}:{}",
            args.metric_name, args.statsd_host, args.statsd_port
        );
        Ok(Box::new(reporter))
    } else {
        Ok(Box::new(StdoutReporter::new(args.format)))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn sample(
    args: &Args,
    mode: ExecutionMode,
    deferred: DeferredSignals,
    counters: KernelCounters,
    reporter: Box<dyn Reporter>,
) -> Result<()> {
    let shutdown = termination(mode).context("Failed to install signal handlers")?;
    drop(deferred);

    let mut sampler = Sampler::new(args.interval(), counters, reporter);
    sampler.run(shutdown).await?;
    Ok(())
}
