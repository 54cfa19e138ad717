use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sonarcore::prelude::{RawFrame, ScanConfig};

/// Deterministic synthetic echo source for offline runs.
///
/// Produces either full imaging frames or single-beam range profiles:
/// a target arc that drifts with the tick counter, attenuated by
/// spherical spreading loss, over a noise floor.
pub struct EchoGenerator {
    rng: StdRng,
    range_bins: usize,
    azimuth_bins: usize,
    range_max: f32,
    noise: f32,
    tick: usize,
}

impl EchoGenerator {
    pub fn new(scan: &ScanConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range_bins: scan.range_bins.max(1),
            azimuth_bins: scan.azimuth_bins.max(1),
            range_max: scan.range_max,
            noise: 0.02,
            tick: 0,
        }
    }

    /// One full 2-D intensity frame (imaging mode).
    pub fn next_frame(&mut self, timestamp: f64) -> RawFrame {
        let range_bins = self.range_bins;
        let azimuth_bins = self.azimuth_bins;
        let range_max = self.range_max;
        let noise = self.noise;
        let drift = (self.tick as f32 * 0.05).sin();
        let rng = &mut self.rng;

        let data = Array2::from_shape_fn((range_bins, azimuth_bins), |(bin, beam)| {
            let target_bin = Self::target_bin(range_bins, azimuth_bins, beam, drift);
            let range = Self::bin_range(range_bins, range_max, bin);
            let spreading = 1.0 / (range * range);
            let echo = if bin == target_bin { 1.0 } else { 0.01 };
            echo * spreading + rng.gen_range(0.0..noise)
        });

        self.tick += 1;
        RawFrame::new(data, timestamp)
    }

    /// One single-beam range profile (scanning mode). The beam index
    /// advances with the tick counter, one bearing per call.
    pub fn next_profile(&mut self) -> Vec<f32> {
        let beam = self.tick % self.azimuth_bins;
        let drift = (self.tick as f32 * 0.05).sin();
        let target_bin = Self::target_bin(self.range_bins, self.azimuth_bins, beam, drift);
        let range_bins = self.range_bins;
        let range_max = self.range_max;
        let noise = self.noise;
        let rng = &mut self.rng;

        let profile = (0..range_bins)
            .map(|bin| {
                let range = Self::bin_range(range_bins, range_max, bin);
                let spreading = 1.0 / (range * range);
                let echo = if bin == target_bin { 1.0 } else { 0.01 };
                echo * spreading + rng.gen_range(0.0..noise)
            })
            .collect();

        self.tick += 1;
        profile
    }

    fn bin_range(range_bins: usize, range_max: f32, bin: usize) -> f32 {
        if range_bins > 1 {
            1.0 + (range_max - 1.0) * bin as f32 / (range_bins - 1) as f32
        } else {
            range_max
        }
    }

    fn target_bin(range_bins: usize, azimuth_bins: usize, beam: usize, drift: f32) -> usize {
        let center = range_bins as f32 * 0.5;
        let sweep = (beam as f32 / azimuth_bins as f32 - 0.5) * range_bins as f32 * 0.3;
        let bin = center + sweep + drift * range_bins as f32 * 0.1;
        (bin.max(0.0) as usize).min(range_bins - 1)
    }
}
