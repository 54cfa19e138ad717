use std::sync::Arc;

use crate::display::renderer::{DisplaySurface, SonarRenderer};
use crate::prelude::{RawFrame, ViewerConfig};
use crate::processing::normalizer::NormalizerWorker;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};
use crate::transport::FrameSlot;

/// The assembled pipeline: raw slot -> normalizer worker -> processed
/// slot -> renderer.
///
/// `submit` is called from the sensor-polling loop and never blocks;
/// `update` is called from the owner's display loop. `close` stops the
/// worker with a bounded join before releasing the surface, so no shared
/// state is touched once it returns.
pub struct SonarViewer {
    raw: FrameSlot<RawFrame>,
    worker: NormalizerWorker,
    renderer: SonarRenderer,
    metrics: Arc<MetricsRecorder>,
    closed: bool,
}

impl SonarViewer {
    pub fn new(config: ViewerConfig, surface: Box<dyn DisplaySurface>) -> Self {
        let raw = FrameSlot::new();
        let processed = FrameSlot::new();
        let metrics = Arc::new(MetricsRecorder::new());
        let worker = NormalizerWorker::spawn(
            config.ema_alpha,
            config.device,
            raw.clone(),
            processed.clone(),
            metrics.clone(),
        );
        let renderer = SonarRenderer::new(config, processed, surface);
        Self {
            raw,
            worker,
            renderer,
            metrics,
            closed: false,
        }
    }

    /// Non-blocking hand-off of the newest raw frame. Empty frames and
    /// frames arriving after shutdown are dropped.
    pub fn submit(&self, frame: RawFrame) {
        if self.closed || frame.data.is_empty() {
            return;
        }
        if self.raw.submit(frame) {
            self.metrics.record_dropped();
        }
    }

    /// Cooperative display tick. If the renderer hit its terminal
    /// condition (surface gone, shape change), the whole pipeline closes.
    pub fn update(&mut self) {
        self.renderer.update();
        if self.renderer.is_closed() && !self.closed {
            self.close();
        }
    }

    /// Scoped shutdown: joins the worker, then releases the surface.
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.worker.close();
        self.renderer.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Drop for SonarViewer {
    fn drop(&mut self) {
        self.close();
    }
}
