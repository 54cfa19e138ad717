use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;
use serde::Serialize;
use sonarcore::pipeline::SonarViewer;
use sonarcore::processing::BeamAccumulator;

use crate::generator::profile::EchoGenerator;
use crate::surface::HeadlessSurface;
use crate::workflow::config::DriverConfig;

/// Simulated sensor cadence, matching the demo scenarios.
const TICKS_PER_SEC: f64 = 30.0;

/// Summary of a driver run, serialized into the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub sweeps_completed: usize,
    pub frames_processed: usize,
    pub frames_dropped: usize,
    pub frames_rejected: usize,
    pub frames_presented: usize,
}

pub struct Runner {
    config: DriverConfig,
}

impl Runner {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Drives `ticks` synthetic sensor ticks through the pipeline as fast
    /// as the worker can keep up, then drains and shuts down.
    pub fn run(&self, ticks: usize, snapshot: Option<PathBuf>) -> anyhow::Result<RunSummary> {
        let never = Arc::new(AtomicBool::new(false));
        self.drive(Some(ticks), snapshot, never)
    }

    /// Drives the pipeline at the simulated sensor cadence until `stop`
    /// is raised.
    pub fn run_until(&self, stop: Arc<AtomicBool>) -> anyhow::Result<RunSummary> {
        self.drive(None, None, stop)
    }

    fn drive(
        &self,
        ticks: Option<usize>,
        snapshot: Option<PathBuf>,
        stop: Arc<AtomicBool>,
    ) -> anyhow::Result<RunSummary> {
        let (surface, handle) = HeadlessSurface::new(snapshot);
        let mut viewer = SonarViewer::new(self.config.viewer.clone(), Box::new(surface));
        let mut generator = EchoGenerator::new(&self.config.scan, self.config.seed);
        let mut accumulator = if self.config.scan_mode {
            Some(BeamAccumulator::new(self.config.scan.clone()))
        } else {
            None
        };

        // Offline runs pace lightly so the worker sees frames; live runs
        // hold the simulated sensor cadence.
        let pace = match ticks {
            Some(_) => Duration::from_millis(2),
            None => Duration::from_secs_f64(1.0 / TICKS_PER_SEC),
        };

        let mut sweeps_completed = 0usize;
        let mut tick = 0usize;
        while ticks.map_or(true, |limit| tick < limit) && !stop.load(Ordering::Relaxed) {
            let timestamp = tick as f64 / TICKS_PER_SEC;
            match accumulator.as_mut() {
                Some(accumulator) => {
                    let profile = generator.next_profile();
                    if let Some(frame) = accumulator.step(&profile, timestamp) {
                        sweeps_completed += 1;
                        viewer.submit(frame);
                    }
                }
                None => viewer.submit(generator.next_frame(timestamp)),
            }
            viewer.update();
            if viewer.is_closed() {
                break;
            }
            thread::sleep(pace);
            tick += 1;
        }

        // Let the worker finish the last frame before shutdown.
        thread::sleep(Duration::from_millis(120));
        viewer.update();
        let metrics = viewer.metrics();
        viewer.close();

        let summary = RunSummary {
            ticks: tick,
            sweeps_completed,
            frames_processed: metrics.processed,
            frames_dropped: metrics.dropped,
            frames_rejected: metrics.rejected,
            frames_presented: handle.presents(),
        };
        info!(
            "run complete: {} ticks, {} presented, {} dropped",
            summary.ticks, summary.frames_presented, summary.frames_dropped
        );
        Ok(summary)
    }
}
