use ndarray::{Array1, Array2, ArrayView1};

use crate::prelude::{RawFrame, ScanConfig};

/// Guard added to the sweep maximum before normalizing, matching the
/// degenerate-scale floor used elsewhere in the pipeline.
const PEAK_EPSILON: f32 = 1e-6;

/// Rebuilds a full 2-D sonar image from per-tick range profiles.
///
/// Used when the sensor physically scans one bearing per tick: profiles
/// are stacked column by column, and once every azimuth bin has been
/// written the buffer is compensated for spreading loss, log-compressed,
/// normalized against its own peak, and emitted. Partial sweeps are
/// never emitted.
pub struct BeamAccumulator {
    config: ScanConfig,
    buffer: Array2<f32>,
    /// Per-range-bin time-varying gain, range squared.
    gains: Array1<f32>,
    cursor: usize,
}

impl BeamAccumulator {
    pub fn new(config: ScanConfig) -> Self {
        let buffer = Array2::zeros((config.range_bins, config.azimuth_bins));
        let range_max = config.range_max;
        let bins = config.range_bins;
        let gains = Array1::from_shape_fn(bins, |bin| {
            let range = if bins > 1 {
                1.0 + (range_max - 1.0) * bin as f32 / (bins - 1) as f32
            } else {
                range_max
            };
            range * range
        });
        Self {
            config,
            buffer,
            gains,
            cursor: 0,
        }
    }

    /// Writes one profile into the cursor column. Returns the assembled
    /// frame once a full sweep has been collected, after which the cursor
    /// wraps and the next call begins a fresh sweep.
    ///
    /// Profiles of the wrong length are dropped without moving the cursor.
    pub fn step(&mut self, profile: &[f32], timestamp: f64) -> Option<RawFrame> {
        if profile.len() != self.config.range_bins {
            return None;
        }
        self.buffer
            .column_mut(self.cursor)
            .assign(&ArrayView1::from(profile));
        self.cursor += 1;
        if self.cursor < self.config.azimuth_bins {
            return None;
        }
        self.cursor = 0;
        Some(self.build_frame(timestamp))
    }

    /// Next column to be written, in [0, azimuth_bins).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Discards a partially collected sweep.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.buffer.fill(0.0);
    }

    fn build_frame(&self, timestamp: f64) -> RawFrame {
        let mut image = self.buffer.clone();
        // TVG then log compression, row by row (rows are range bins).
        for (bin, mut beams) in image.outer_iter_mut().enumerate() {
            let gain = self.gains[bin];
            beams.mapv_inplace(|echo| (echo * gain).ln_1p());
        }
        let peak = image
            .iter()
            .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v))
            .max(0.0)
            + PEAK_EPSILON;
        image.mapv_inplace(|v| ((v / peak) * 255.0).trunc());
        RawFrame::new(image, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulator(azimuth_bins: usize, range_bins: usize, range_max: f32) -> BeamAccumulator {
        BeamAccumulator::new(ScanConfig {
            azimuth_bins,
            range_bins,
            range_max,
        })
    }

    #[test]
    fn sweep_completes_only_on_the_last_column() {
        let mut acc = accumulator(4, 3, 3.0);
        for step in 0..3 {
            assert!(acc.step(&[1.0, 1.0, 1.0], 0.0).is_none(), "step {}", step);
        }
        let frame = acc.step(&[1.0, 1.0, 1.0], 4.0).unwrap();
        assert_eq!(frame.shape(), (3, 4));
        assert_eq!(frame.timestamp, 4.0);
        assert_eq!(acc.cursor(), 0);
        // The fifth step begins a fresh sweep.
        assert!(acc.step(&[1.0, 1.0, 1.0], 5.0).is_none());
        assert_eq!(acc.cursor(), 1);
    }

    #[test]
    fn assembly_applies_tvg_log_compression_and_peak_normalization() {
        // Uniform echoes with ranges [1, 2, 3]: gains are [1, 4, 9], so a
        // finished frame carries trunc(255 * ln(1 + g) / ln(10)) per row.
        let mut acc = accumulator(4, 3, 3.0);
        let mut emitted = None;
        for _ in 0..4 {
            emitted = acc.step(&[1.0, 1.0, 1.0], 0.0);
        }
        let frame = emitted.unwrap();
        for column in 0..4 {
            assert_eq!(frame.data[[0, column]], 76.0);
            assert_eq!(frame.data[[1, column]], 178.0);
            assert!(frame.data[[2, column]] >= 254.0);
        }
    }

    #[test]
    fn wrong_length_profile_is_dropped_without_moving_the_cursor() {
        let mut acc = accumulator(4, 3, 3.0);
        assert!(acc.step(&[1.0, 1.0], 0.0).is_none());
        assert_eq!(acc.cursor(), 0);
        assert!(acc.step(&[1.0, 1.0, 1.0], 0.0).is_none());
        assert_eq!(acc.cursor(), 1);
    }

    #[test]
    fn reset_discards_a_partial_sweep() {
        let mut acc = accumulator(4, 2, 2.0);
        acc.step(&[9.0, 9.0], 0.0);
        acc.step(&[9.0, 9.0], 0.0);
        acc.reset();
        assert_eq!(acc.cursor(), 0);

        // A full sweep of silence after the reset shows no leftovers.
        let mut emitted = None;
        for _ in 0..4 {
            emitted = acc.step(&[0.0, 0.0], 0.0);
        }
        let frame = emitted.unwrap();
        assert!(frame.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn all_zero_sweep_stays_finite() {
        let mut acc = accumulator(2, 2, 2.0);
        acc.step(&[0.0, 0.0], 0.0);
        let frame = acc.step(&[0.0, 0.0], 0.0).unwrap();
        assert!(frame.data.iter().all(|v| v.is_finite()));
    }
}
