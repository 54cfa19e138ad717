use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Raw intensity image produced once per sensor tick (range bins x azimuth bins).
///
/// Values are in an arbitrary numeric range; the frame is moved by value
/// into the pipeline and never referenced again by the producer.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub data: Array2<f32>,
    pub timestamp: f64,
}

impl RawFrame {
    pub fn new(data: Array2<f32>, timestamp: f64) -> Self {
        Self { data, timestamp }
    }

    /// (range_bins, azimuth_bins)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Display-ready frame with values quantized to [0, 255].
///
/// Produced exclusively by the normalizer stage; same spatial shape as
/// the raw frame it derives from.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub data: Array2<u8>,
    pub timestamp: f64,
}

impl ProcessedFrame {
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Common error type for the visualization pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("display surface failure: {0}")]
    Surface(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Execution device for the normalization stage.
///
/// Only the portable CPU backend ships here; an accelerator-backed
/// implementation slots in behind the same `ExecutionBackend` trait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Cpu,
}

/// Viewer configuration, set once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Azimuth field of view in degrees (display geometry only).
    pub azimuth_deg: f32,
    /// Minimum display range in meters.
    pub range_min: f32,
    /// Maximum display range in meters.
    pub range_max: f32,
    /// Ceiling rate for display updates.
    pub plot_hz: f64,
    /// Smoothing factor for the min/max scale estimate.
    pub ema_alpha: f32,
    /// Execution device for the normalization stage.
    pub device: Device,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            azimuth_deg: 120.0,
            range_min: 1.0,
            range_max: 40.0,
            plot_hz: 3.0,
            ema_alpha: 0.1,
            device: Device::Cpu,
        }
    }
}

/// Scanning-reconstruction configuration for single-beam sensors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub azimuth_bins: usize,
    pub range_bins: usize,
    /// Maximum physical range in meters, used for time-varying gain.
    pub range_max: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            azimuth_bins: 256,
            range_bins: 512,
            range_max: 50.0,
        }
    }
}
