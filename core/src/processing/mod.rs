pub mod accumulator;
pub mod backend;
pub mod normalizer;

pub use accumulator::BeamAccumulator;
pub use backend::{CpuBackend, ExecutionBackend};
pub use normalizer::{Normalizer, NormalizerWorker, ScaleState};
