//! Windowed FFT front-end for frequency-domain extractors.
//!
//! The host feeds time-domain blocks; extractors declaring
//! `InputDomain::Frequency` receive `block_size + 2` interleaved re/im
//! values per channel covering bins `0..=block_size/2`.

use crate::state::WindowType;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub(crate) struct FrequencyFrontEnd {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    block_size: usize,
    scratch: Vec<Complex<f32>>,
    spectra: Vec<Vec<f32>>,
}

impl FrequencyFrontEnd {
    pub(crate) fn new(block_size: usize, channels: usize, window_type: WindowType) -> Self {
        Self {
            fft: FftPlanner::new().plan_fft_forward(block_size),
            window: window_type.coefficients(block_size),
            block_size,
            scratch: vec![Complex::default(); block_size],
            spectra: vec![vec![0.0; block_size + 2]; channels],
        }
    }

    /// Transform each channel of a time-domain block; the results are
    /// available from `channel_slices` until the next call.
    pub(crate) fn transform(&mut self, block: &[&[f32]]) {
        for (ch, samples) in block.iter().enumerate().take(self.spectra.len()) {
            for (i, slot) in self.scratch.iter_mut().enumerate() {
                let sample = samples.get(i).copied().unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }
            self.fft.process(&mut self.scratch);

            let out = &mut self.spectra[ch];
            for bin in 0..=self.block_size / 2 {
                out[bin * 2] = self.scratch[bin].re;
                out[bin * 2 + 1] = self.scratch[bin].im;
            }
        }
    }

    pub(crate) fn channel_slices(&self) -> Vec<&[f32]> {
        self.spectra.iter().map(|s| s.as_slice()).collect()
    }
}
