use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::prelude::{Device, ProcessedFrame, RawFrame};
use crate::processing::backend::ExecutionBackend;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use crate::transport::FrameSlot;

/// Floor for `hi - lo` so a uniform frame never divides by zero.
const SCALE_EPSILON: f32 = 1e-6;
/// Bounded wait on the raw-frame slot; also the worst-case shutdown latency.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// EMA memory of the display scale, persisting across frames.
///
/// Seeded from the first frame's min/max; every later frame blends in
/// with weight `alpha` so the display does not flicker when a single
/// bright return distorts the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleState {
    bounds: Option<(f32, f32)>,
}

impl ScaleState {
    /// Folds one frame's min/max into the estimate and returns the bounds
    /// to scale by, with the denominator floored at `SCALE_EPSILON`.
    pub fn update(&mut self, min: f32, max: f32, alpha: f32) -> (f32, f32) {
        let (lo, hi) = match self.bounds {
            None => (min, max),
            Some((lo, hi)) => (
                (1.0 - alpha) * lo + alpha * min,
                (1.0 - alpha) * hi + alpha * max,
            ),
        };
        self.bounds = Some((lo, hi));
        if hi - lo < SCALE_EPSILON {
            (lo, lo + SCALE_EPSILON)
        } else {
            (lo, hi)
        }
    }

    pub fn bounds(&self) -> Option<(f32, f32)> {
        self.bounds
    }
}

/// Maps arbitrary-range raw frames into display-ready 8-bit frames using
/// smoothed min/max scaling.
pub struct Normalizer {
    alpha: f32,
    state: ScaleState,
    backend: Box<dyn ExecutionBackend>,
}

impl Normalizer {
    pub fn new(alpha: f32, backend: Box<dyn ExecutionBackend>) -> Self {
        Self {
            alpha,
            state: ScaleState::default(),
            backend,
        }
    }

    /// Produces the processed frame, or `None` for a malformed input.
    /// A rejected frame leaves the scale estimate untouched, so one bad
    /// tick cannot corrupt the running bounds.
    pub fn normalize(&mut self, frame: &RawFrame) -> Option<ProcessedFrame> {
        if frame.data.is_empty() {
            return None;
        }
        let (min, max) = self.backend.reduce_min_max(frame.data.view());
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let (lo, hi) = self.state.update(min, max, self.alpha);
        let unit = self.backend.affine_clamp(frame.data.view(), lo, hi);
        Some(ProcessedFrame {
            data: self.backend.cast_to_u8(&unit),
            timestamp: frame.timestamp,
        })
    }

    /// Current (lo, hi) estimate, if any frame has seeded it.
    pub fn scale(&self) -> Option<(f32, f32)> {
        self.state.bounds()
    }
}

/// Background stage that drains the raw-frame slot and republishes
/// normalized frames with the same newest-wins discipline.
///
/// The loop wakes at least every `RECV_TIMEOUT` to observe the shutdown
/// flag; `close` is idempotent and joins the thread so the caller knows
/// no shared state is touched afterwards.
pub struct NormalizerWorker {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NormalizerWorker {
    pub fn spawn(
        alpha: f32,
        device: Device,
        raw: FrameSlot<RawFrame>,
        processed: FrameSlot<ProcessedFrame>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = shutdown.clone();
        let handle = thread::spawn(move || {
            let logger = LogManager::new();
            let mut normalizer = Normalizer::new(alpha, device.backend());
            logger.record("normalizer worker started");
            while !stop.load(Ordering::Relaxed) {
                let frame = match raw.take_timeout(RECV_TIMEOUT) {
                    Some(frame) => frame,
                    None => continue,
                };
                match normalizer.normalize(&frame) {
                    Some(done) => {
                        if processed.submit(done) {
                            metrics.record_dropped();
                        }
                        metrics.record_processed();
                    }
                    None => metrics.record_rejected(),
                }
            }
            logger.record("normalizer worker stopped");
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops the loop at its next wake (bounded by `RECV_TIMEOUT`) and
    /// joins the thread. Safe to call more than once.
    pub fn close(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NormalizerWorker {
    fn drop(&mut self) {
        self.close();
    }
}
