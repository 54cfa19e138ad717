use std::f32::consts::PI;

use crate::prelude::ViewerConfig;

/// One-time polar mesh axes, sized to the first frame's shape.
///
/// The frame shape is assumed constant afterwards; a shape change means
/// the owning display must be rebuilt, not resized.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarGeometry {
    pub range_bins: usize,
    pub azimuth_bins: usize,
    /// Bearing per azimuth bin in radians, centered on zero.
    pub theta_rad: Vec<f32>,
    /// Range per range bin in meters.
    pub ranges_m: Vec<f32>,
}

impl PolarGeometry {
    pub fn from_shape(shape: (usize, usize), config: &ViewerConfig) -> Self {
        let (range_bins, azimuth_bins) = shape;
        let half_fov = config.azimuth_deg / 2.0;
        let theta_rad = linspace(-half_fov, half_fov, azimuth_bins)
            .into_iter()
            .map(|deg| deg * PI / 180.0)
            .collect();
        let ranges_m = linspace(config.range_min, config.range_max, range_bins);
        Self {
            range_bins,
            azimuth_bins,
            theta_rad,
            ranges_m,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.range_bins, self.azimuth_bins)
    }
}

fn linspace(start: f32, end: f32, count: usize) -> Vec<f32> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![start];
    }
    (0..count)
        .map(|i| start + (end - start) * i as f32 / (count - 1) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_span_the_configured_field_of_view() {
        let config = ViewerConfig {
            azimuth_deg: 90.0,
            range_min: 1.0,
            range_max: 21.0,
            ..Default::default()
        };
        let geometry = PolarGeometry::from_shape((5, 3), &config);
        assert_eq!(geometry.shape(), (5, 3));
        assert!((geometry.theta_rad[0] + PI / 4.0).abs() < 1e-6);
        assert!((geometry.theta_rad[2] - PI / 4.0).abs() < 1e-6);
        assert_eq!(geometry.ranges_m, vec![1.0, 6.0, 11.0, 16.0, 21.0]);
    }
}
