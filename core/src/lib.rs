//! Sonar-frame visualization core for the Rust ROV platform.
//!
//! Turns raw, arbitrary-range acoustic frames produced by a sensor-polling
//! loop into rate-limited, display-ready 8-bit intensity images without
//! ever blocking the producer. The pipeline is latest-value end to end:
//! single-slot frame transport, a background normalizer worker, and a
//! cooperative renderer that the owning event loop ticks at its leisure.

pub mod display;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod transport;

pub use display::{DisplaySurface, PolarGeometry, SonarRenderer};
pub use pipeline::SonarViewer;
pub use prelude::{
    Device, PipelineError, PipelineResult, ProcessedFrame, RawFrame, ScanConfig, ViewerConfig,
};
pub use processing::{BeamAccumulator, ExecutionBackend, Normalizer, NormalizerWorker};
pub use transport::FrameSlot;
