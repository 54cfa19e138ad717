use ndarray::{Array2, ArrayView2};

use crate::prelude::Device;

/// Numeric kernels of the normalization stage, behind a seam so the
/// reduction and elementwise map can be offloaded to an accelerator.
/// Any implementation must match the CPU reference within floating-point
/// tolerance.
pub trait ExecutionBackend: Send + Sync {
    /// Full min/max reduction over the frame.
    fn reduce_min_max(&self, frame: ArrayView2<f32>) -> (f32, f32);

    /// Elementwise `clamp((x - lo) / (hi - lo), 0, 1)`. Callers floor the
    /// denominator before handing bounds in.
    fn affine_clamp(&self, frame: ArrayView2<f32>, lo: f32, hi: f32) -> Array2<f32>;

    /// `x * 255`, truncated to unsigned 8-bit.
    fn cast_to_u8(&self, frame: &Array2<f32>) -> Array2<u8>;
}

/// Portable reference implementation.
pub struct CpuBackend;

impl ExecutionBackend for CpuBackend {
    fn reduce_min_max(&self, frame: ArrayView2<f32>) -> (f32, f32) {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &value in frame.iter() {
            lo = lo.min(value);
            hi = hi.max(value);
        }
        (lo, hi)
    }

    fn affine_clamp(&self, frame: ArrayView2<f32>, lo: f32, hi: f32) -> Array2<f32> {
        let span = hi - lo;
        frame.mapv(|value| ((value - lo) / span).clamp(0.0, 1.0))
    }

    fn cast_to_u8(&self, frame: &Array2<f32>) -> Array2<u8> {
        frame.mapv(|value| (value * 255.0) as u8)
    }
}

impl Device {
    /// Instantiates the backend this device selects.
    pub fn backend(&self) -> Box<dyn ExecutionBackend> {
        match self {
            Device::Cpu => Box::new(CpuBackend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn reduce_min_max_scans_the_whole_frame() {
        let frame = array![[3.0, -1.0], [0.5, 8.0]];
        let (lo, hi) = CpuBackend.reduce_min_max(frame.view());
        assert_eq!(lo, -1.0);
        assert_eq!(hi, 8.0);
    }

    #[test]
    fn affine_clamp_bounds_output_to_unit_interval() {
        let frame = array![[-10.0, 0.0], [5.0, 20.0]];
        let unit = CpuBackend.affine_clamp(frame.view(), 0.0, 10.0);
        assert_eq!(unit, array![[0.0, 0.0], [0.5, 1.0]]);
    }

    #[test]
    fn cast_to_u8_truncates_scaled_values() {
        let frame = array![[0.0, 0.5], [0.999, 1.0]];
        let bytes = CpuBackend.cast_to_u8(&frame);
        assert_eq!(bytes, array![[0u8, 127], [254, 255]]);
    }
}
