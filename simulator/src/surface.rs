use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{info, warn};
use sonarcore::display::{DisplaySurface, PolarGeometry};
use sonarcore::prelude::{PipelineResult, ProcessedFrame};

#[derive(Default)]
struct SurfaceState {
    presents: usize,
    geometry: Option<(usize, usize)>,
    last_frame: Option<ProcessedFrame>,
}

/// Shared view into a headless surface, used by the runner to report how
/// many frames actually reached the display.
#[derive(Clone)]
pub struct SurfaceHandle {
    state: Arc<Mutex<SurfaceState>>,
}

impl SurfaceHandle {
    pub fn presents(&self) -> usize {
        self.state.lock().map(|state| state.presents).unwrap_or(0)
    }
}

/// Display surface for offline runs: records presented frames and can
/// dump the last one as a PGM snapshot on close.
pub struct HeadlessSurface {
    state: Arc<Mutex<SurfaceState>>,
    snapshot: Option<PathBuf>,
}

impl HeadlessSurface {
    pub fn new(snapshot: Option<PathBuf>) -> (Self, SurfaceHandle) {
        let state = Arc::new(Mutex::new(SurfaceState::default()));
        let handle = SurfaceHandle {
            state: state.clone(),
        };
        (Self { state, snapshot }, handle)
    }
}

impl DisplaySurface for HeadlessSurface {
    fn init(&mut self, geometry: &PolarGeometry) -> PipelineResult<()> {
        info!(
            "display geometry: {} range bins x {} azimuth bins",
            geometry.range_bins, geometry.azimuth_bins
        );
        if let Ok(mut state) = self.state.lock() {
            state.geometry = Some(geometry.shape());
        }
        Ok(())
    }

    fn present(&mut self, frame: &ProcessedFrame) -> PipelineResult<()> {
        if let Ok(mut state) = self.state.lock() {
            state.presents += 1;
            state.last_frame = Some(frame.clone());
        }
        Ok(())
    }

    fn close(&mut self) {
        let Some(path) = self.snapshot.take() else {
            return;
        };
        let last = match self.state.lock() {
            Ok(mut state) => state.last_frame.take(),
            Err(_) => None,
        };
        match last {
            Some(frame) => {
                if let Err(err) = write_pgm(&path, &frame) {
                    warn!("failed to write snapshot {}: {}", path.display(), err);
                } else {
                    info!("snapshot written to {}", path.display());
                }
            }
            None => warn!("no frame presented; skipping snapshot"),
        }
    }
}

fn write_pgm(path: &PathBuf, frame: &ProcessedFrame) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let (rows, cols) = frame.shape();
    let mut file = File::create(path)?;
    write!(file, "P5\n{} {}\n255\n", cols, rows)?;
    let bytes: Vec<u8> = frame.data.iter().copied().collect();
    file.write_all(&bytes)
}
