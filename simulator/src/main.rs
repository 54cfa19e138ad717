use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::DriverConfig;
use workflow::runner::Runner;

mod generator;
mod surface;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the sonar visualization pipeline")]
struct Args {
    /// Number of sensor ticks to drive through the pipeline
    #[arg(long, default_value_t = 600)]
    ticks: usize,
    /// Load a driver config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 128)]
    range_bins: usize,
    #[arg(long, default_value_t = 128)]
    azimuth_bins: usize,
    /// Reconstruct frames from single-beam range profiles
    #[arg(long, default_value_t = false)]
    scan: bool,
    /// Keep driving synthetic frames until Ctrl+C
    #[arg(long, default_value_t = false)]
    live: bool,
    /// Where to write the JSON run summary
    #[arg(long, default_value = "tools/data/run_summary.json")]
    report: PathBuf,
    /// Dump the last presented frame as a PGM image
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let driver_config = if let Some(path) = args.config {
        DriverConfig::load(path)?
    } else {
        DriverConfig::from_args(args.range_bins, args.azimuth_bins, args.scan)
    };
    let runner = Runner::new(driver_config);

    let summary = if args.live {
        println!("Live run (Ctrl+C to stop)...");
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_loop = stop.clone();
        let driver = thread::spawn(move || runner.run_until(stop_for_loop));

        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        stop.store(true, Ordering::Relaxed);
        driver
            .join()
            .map_err(|_| anyhow::anyhow!("driver thread panicked"))??
    } else {
        runner.run(args.ticks, args.snapshot)?
    };

    println!(
        "Run -> ticks {}, presented {}, processed {}, dropped {}, sweeps {}",
        summary.ticks,
        summary.frames_presented,
        summary.frames_processed,
        summary.frames_dropped,
        summary.sweeps_completed
    );

    if let Some(parent) = args.report.parent() {
        fs::create_dir_all(parent)?;
    }
    let report = serde_json::to_string_pretty(&summary).context("serializing run summary")?;
    fs::write(&args.report, report)
        .with_context(|| format!("writing run summary {}", args.report.display()))?;

    Ok(())
}
