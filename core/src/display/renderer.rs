use std::time::{Duration, Instant};

use crate::display::geometry::PolarGeometry;
use crate::prelude::{PipelineResult, ProcessedFrame, ViewerConfig};
use crate::telemetry::log::LogManager;
use crate::transport::FrameSlot;

/// Paint target for processed frames.
///
/// The renderer only prepares byte buffers and bounds the update rate;
/// whatever actually puts pixels on screen lives behind this trait.
pub trait DisplaySurface: Send {
    /// One-time geometry setup, called with the first frame's mesh.
    fn init(&mut self, geometry: &PolarGeometry) -> PipelineResult<()>;

    /// Hands the display-ready byte buffer to the surface.
    fn present(&mut self, frame: &ProcessedFrame) -> PipelineResult<()>;

    /// Releases whatever the surface holds. Called once, on shutdown.
    fn close(&mut self) {}
}

/// Cooperative renderer polling the processed-frame slot at a bounded
/// rate. Runs on the caller's own loop so it can live inside a GUI event
/// loop that must stay on one thread.
pub struct SonarRenderer {
    config: ViewerConfig,
    slot: FrameSlot<ProcessedFrame>,
    surface: Box<dyn DisplaySurface>,
    geometry: Option<PolarGeometry>,
    last_present: Option<Instant>,
    closed: bool,
    logger: LogManager,
}

impl SonarRenderer {
    pub fn new(
        config: ViewerConfig,
        slot: FrameSlot<ProcessedFrame>,
        surface: Box<dyn DisplaySurface>,
    ) -> Self {
        Self {
            config,
            slot,
            surface,
            geometry: None,
            last_present: None,
            closed: false,
            logger: LogManager::new(),
        }
    }

    /// One cooperative tick: a no-op unless the rate gate opens and a new
    /// frame is pending. A surface failure or a mid-stream shape change is
    /// terminal and closes the renderer.
    pub fn update(&mut self) {
        if self.closed {
            return;
        }
        if let Some(last) = self.last_present {
            if last.elapsed() < self.min_interval() {
                return;
            }
        }
        let frame = match self.slot.try_take() {
            Some(frame) => frame,
            // Keep showing the last presented frame rather than blanking.
            None => return,
        };

        match &self.geometry {
            None => {
                let geometry = PolarGeometry::from_shape(frame.shape(), &self.config);
                if let Err(err) = self.surface.init(&geometry) {
                    self.logger
                        .record_warning(&format!("surface init failed: {}", err));
                    self.close();
                    return;
                }
                self.geometry = Some(geometry);
            }
            Some(geometry) if geometry.shape() != frame.shape() => {
                self.logger
                    .record_warning("frame shape changed mid-stream; closing display");
                self.close();
                return;
            }
            Some(_) => {}
        }

        if let Err(err) = self.surface.present(&frame) {
            self.logger
                .record_warning(&format!("present failed: {}", err));
            self.close();
            return;
        }
        self.last_present = Some(Instant::now());
    }

    /// Releases the surface. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.surface.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn min_interval(&self) -> Duration {
        if self.config.plot_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.config.plot_hz)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::PipelineError;
    use ndarray::Array2;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct SurfaceLog {
        inits: usize,
        presents: usize,
        closes: usize,
        geometry: Option<(usize, usize)>,
    }

    struct RecordingSurface {
        log: Arc<Mutex<SurfaceLog>>,
        fail_present: bool,
    }

    impl RecordingSurface {
        fn new(fail_present: bool) -> (Self, Arc<Mutex<SurfaceLog>>) {
            let log = Arc::new(Mutex::new(SurfaceLog::default()));
            (
                Self {
                    log: log.clone(),
                    fail_present,
                },
                log,
            )
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn init(&mut self, geometry: &PolarGeometry) -> PipelineResult<()> {
            let mut log = self.log.lock().unwrap();
            log.inits += 1;
            log.geometry = Some(geometry.shape());
            Ok(())
        }

        fn present(&mut self, _frame: &ProcessedFrame) -> PipelineResult<()> {
            if self.fail_present {
                return Err(PipelineError::Surface("window closed".into()));
            }
            self.log.lock().unwrap().presents += 1;
            Ok(())
        }

        fn close(&mut self) {
            self.log.lock().unwrap().closes += 1;
        }
    }

    fn processed(shape: (usize, usize)) -> ProcessedFrame {
        ProcessedFrame {
            data: Array2::zeros(shape),
            timestamp: 0.0,
        }
    }

    fn renderer_with(
        plot_hz: f64,
        fail_present: bool,
    ) -> (SonarRenderer, FrameSlot<ProcessedFrame>, Arc<Mutex<SurfaceLog>>) {
        let slot = FrameSlot::new();
        let (surface, log) = RecordingSurface::new(fail_present);
        let config = ViewerConfig {
            plot_hz,
            ..Default::default()
        };
        (
            SonarRenderer::new(config, slot.clone(), Box::new(surface)),
            slot,
            log,
        )
    }

    #[test]
    fn rate_gate_allows_at_most_one_present_per_interval() {
        let (mut renderer, slot, log) = renderer_with(1.0, false);
        for _ in 0..100 {
            slot.submit(processed((4, 4)));
            renderer.update();
        }
        assert_eq!(log.lock().unwrap().presents, 1);
    }

    #[test]
    fn empty_slot_is_a_no_op() {
        let (mut renderer, _slot, log) = renderer_with(1000.0, false);
        renderer.update();
        let log = log.lock().unwrap();
        assert_eq!(log.inits, 0);
        assert_eq!(log.presents, 0);
    }

    #[test]
    fn first_frame_initializes_geometry_once() {
        let (mut renderer, slot, log) = renderer_with(0.0, false);
        slot.submit(processed((6, 8)));
        renderer.update();
        slot.submit(processed((6, 8)));
        renderer.update();
        let log = log.lock().unwrap();
        assert_eq!(log.inits, 1);
        assert_eq!(log.geometry, Some((6, 8)));
        assert_eq!(log.presents, 2);
    }

    #[test]
    fn shape_change_is_terminal() {
        let (mut renderer, slot, log) = renderer_with(0.0, false);
        slot.submit(processed((6, 8)));
        renderer.update();
        slot.submit(processed((6, 9)));
        renderer.update();
        assert!(renderer.is_closed());
        assert_eq!(log.lock().unwrap().closes, 1);

        // Further updates stay no-ops.
        slot.submit(processed((6, 8)));
        renderer.update();
        assert_eq!(log.lock().unwrap().presents, 1);
    }

    #[test]
    fn surface_failure_closes_the_renderer() {
        let (mut renderer, slot, log) = renderer_with(0.0, true);
        slot.submit(processed((4, 4)));
        renderer.update();
        assert!(renderer.is_closed());
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[test]
    fn close_is_idempotent() {
        let (mut renderer, _slot, log) = renderer_with(0.0, false);
        renderer.close();
        renderer.close();
        assert_eq!(log.lock().unwrap().closes, 1);
    }
}
