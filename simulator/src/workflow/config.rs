use anyhow::Context;
use serde::{Deserialize, Serialize};
use sonarcore::prelude::{ScanConfig, ViewerConfig};
use std::fs;
use std::path::Path;

/// Full driver configuration: viewer settings, frame geometry, and the
/// acquisition mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub viewer: ViewerConfig,
    pub scan: ScanConfig,
    /// Reconstruct frames from single-beam range profiles instead of
    /// consuming full imaging frames.
    pub scan_mode: bool,
    /// Seed for the synthetic echo generator.
    pub seed: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            viewer: ViewerConfig::default(),
            scan: ScanConfig::default(),
            scan_mode: false,
            seed: 0,
        }
    }
}

impl DriverConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading driver config {}", path_ref.display()))?;
        let config: DriverConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing driver config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(range_bins: usize, azimuth_bins: usize, scan_mode: bool) -> Self {
        Self {
            scan: ScanConfig {
                range_bins,
                azimuth_bins,
                ..ScanConfig::default()
            },
            scan_mode,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_frame_geometry() {
        let cfg = DriverConfig::from_args(128, 64, true);
        assert_eq!(cfg.scan.range_bins, 128);
        assert_eq!(cfg.scan.azimuth_bins, 64);
        assert!(cfg.scan_mode);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"scan_mode: true\nseed: 7\nscan:\n  azimuth_bins: 32\n  range_bins: 64\n  range_max: 25.0\nviewer:\n  plot_hz: 10.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = DriverConfig::load(&path).unwrap();
        assert!(cfg.scan_mode);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.scan.azimuth_bins, 32);
        assert!((cfg.viewer.plot_hz - 10.0).abs() < f64::EPSILON);
    }
}
