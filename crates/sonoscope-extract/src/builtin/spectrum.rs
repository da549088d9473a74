//! Magnitude spectrum extractor.

use crate::descriptor::{OutputDescriptor, SampleType};
use crate::extractor::{FeatureExtractor, FeatureSet};
use crate::feature::Feature;
use crate::state::WindowType;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Hann-windowed magnitude spectrum per block, mixed down to mono.
pub struct SpectrumExtractor {
    sample_rate: f64,
    block_size: usize,
    fft: Option<Arc<dyn Fft<f32>>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumExtractor {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            block_size: 1024,
            fft: None,
            window: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn bin_count(&self) -> usize {
        self.block_size / 2 + 1
    }
}

impl FeatureExtractor for SpectrumExtractor {
    fn identifier(&self) -> &str {
        "spectrum"
    }

    fn name(&self) -> &str {
        "Magnitude Spectrum"
    }

    fn maker(&self) -> &str {
        "sonoscope"
    }

    fn category(&self) -> &str {
        "Spectral"
    }

    fn output_descriptors(&self) -> Vec<OutputDescriptor> {
        vec![OutputDescriptor::new("magnitudes", "Magnitudes")
            .bins(self.bin_count())
            .sample_type(SampleType::OneSamplePerStep)]
    }

    fn initialise(&mut self, channels: usize, _step_size: usize, block_size: usize) -> bool {
        if channels == 0 || block_size == 0 {
            return false;
        }
        self.block_size = block_size;
        self.fft = Some(FftPlanner::new().plan_fft_forward(block_size));
        self.window = WindowType::Hann.coefficients(block_size);
        self.scratch = vec![Complex::default(); block_size];
        true
    }

    fn process(&mut self, block: &[&[f32]], _timestamp: f64) -> FeatureSet {
        let Some(fft) = self.fft.as_ref() else {
            return FeatureSet::new();
        };

        let channels = block.len().max(1) as f32;
        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let mono: f32 = block
                .iter()
                .map(|ch| ch.get(i).copied().unwrap_or(0.0))
                .sum::<f32>()
                / channels;
            *slot = Complex::new(mono * self.window[i], 0.0);
        }
        fft.process(&mut self.scratch);

        let scale = 1.0 / self.block_size as f32;
        let magnitudes: Vec<f32> = self.scratch[..self.bin_count()]
            .iter()
            .map(|c| c.norm() * scale)
            .collect();

        let mut set = FeatureSet::new();
        set.insert(0, vec![Feature::unstamped().with_values(magnitudes)]);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_count_tracks_block_size() {
        let mut extractor = SpectrumExtractor::new(48000.0);
        assert_eq!(extractor.output_descriptors()[0].bin_count, 513);

        assert!(extractor.initialise(1, 256, 256));
        assert_eq!(extractor.output_descriptors()[0].bin_count, 129);
    }

    #[test]
    fn test_sine_peaks_in_matching_bin() {
        let block = 512;
        let cycles = 8;
        let mut extractor = SpectrumExtractor::new(48000.0);
        assert!(extractor.initialise(1, block, block));

        let samples: Vec<f32> = (0..block)
            .map(|i| {
                (2.0 * std::f32::consts::PI * cycles as f32 * i as f32 / block as f32).sin()
            })
            .collect();
        let set = extractor.process(&[&samples], 0.0);
        let mags = &set[&0][0].values;

        assert_eq!(mags.len(), block / 2 + 1);
        let peak_bin = (0..mags.len())
            .max_by(|&a, &b| mags[a].partial_cmp(&mags[b]).unwrap())
            .unwrap();
        assert_eq!(peak_bin, cycles);
    }

    #[test]
    fn test_process_before_initialise_is_empty() {
        let mut extractor = SpectrumExtractor::new(48000.0);
        let samples = vec![0.0f32; 16];
        assert!(extractor.process(&[&samples], 0.0).is_empty());
    }
}
