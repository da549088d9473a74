//! Block power and peak extractor.

use crate::descriptor::{OutputDescriptor, SampleType};
use crate::extractor::{FeatureExtractor, FeatureSet};
use crate::feature::Feature;

/// RMS power and absolute peak per block, across all channels.
pub struct PowerExtractor {
    sample_rate: f64,
}

impl PowerExtractor {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl FeatureExtractor for PowerExtractor {
    fn identifier(&self) -> &str {
        "power"
    }

    fn name(&self) -> &str {
        "Power"
    }

    fn maker(&self) -> &str {
        "sonoscope"
    }

    fn category(&self) -> &str {
        "Energy"
    }

    fn output_descriptors(&self) -> Vec<OutputDescriptor> {
        vec![
            OutputDescriptor::new("power", "RMS Power")
                .unit("V")
                .bins(1)
                .extents(0.0, 1.0)
                .sample_type(SampleType::OneSamplePerStep),
            OutputDescriptor::new("peak", "Peak Level")
                .unit("V")
                .bins(1)
                .extents(0.0, 1.0)
                .sample_type(SampleType::OneSamplePerStep),
        ]
    }

    fn initialise(&mut self, channels: usize, _step_size: usize, block_size: usize) -> bool {
        channels > 0 && block_size > 0
    }

    fn process(&mut self, block: &[&[f32]], _timestamp: f64) -> FeatureSet {
        let mut sum_sq = 0.0f64;
        let mut peak = 0.0f32;
        let mut count = 0usize;

        for channel in block {
            for &sample in channel.iter() {
                sum_sq += (sample as f64) * (sample as f64);
                peak = peak.max(sample.abs());
                count += 1;
            }
        }

        let rms = if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64).sqrt() as f32
        };

        let mut set = FeatureSet::new();
        set.insert(0, vec![Feature::unstamped().with_value(rms)]);
        set.insert(1, vec![Feature::unstamped().with_value(peak)]);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rms_of_constant_signal() {
        let mut extractor = PowerExtractor::new(44100.0);
        assert!(extractor.initialise(1, 512, 512));

        let samples = vec![0.5f32; 512];
        let set = extractor.process(&[&samples], 0.0);

        assert_relative_eq!(set[&0][0].values[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(set[&1][0].values[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_peak_tracks_negative_excursions() {
        let mut extractor = PowerExtractor::new(44100.0);
        assert!(extractor.initialise(1, 4, 4));

        let samples = vec![0.1f32, -0.9, 0.2, 0.0];
        let set = extractor.process(&[&samples], 0.0);

        assert_relative_eq!(set[&1][0].values[0], 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_zero_channels() {
        let mut extractor = PowerExtractor::new(44100.0);
        assert!(!extractor.initialise(0, 512, 512));
    }

    #[test]
    fn test_features_are_unstamped() {
        let mut extractor = PowerExtractor::new(44100.0);
        extractor.initialise(2, 256, 256);
        let a = vec![0.0f32; 256];
        let b = vec![0.0f32; 256];
        let set = extractor.process(&[&a, &b], 1.0);
        assert_eq!(set[&0][0].timestamp, None);
    }
}
