//! Extractor configuration: block/step windowing and parameter values.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::PI;

/// Analysis window shape applied by the frequency-domain front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowType {
    Rectangular,
    Bartlett,
    Hamming,
    #[default]
    Hann,
    Blackman,
    Nuttall,
    BlackmanHarris,
}

impl WindowType {
    /// Render the window coefficients for the given size.
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        if size <= 1 {
            return vec![1.0; size];
        }
        let n = (size - 1) as f32;

        (0..size)
            .map(|i| {
                let x = i as f32 / n;
                match self {
                    WindowType::Rectangular => 1.0,
                    WindowType::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
                    WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                    WindowType::Hann => 0.5 * (1.0 - (2.0 * PI * x).cos()),
                    WindowType::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                    WindowType::Nuttall => {
                        0.355768 - 0.487396 * (2.0 * PI * x).cos()
                            + 0.144232 * (4.0 * PI * x).cos()
                            - 0.012604 * (6.0 * PI * x).cos()
                    }
                    WindowType::BlackmanHarris => {
                        0.35875 - 0.48829 * (2.0 * PI * x).cos()
                            + 0.14128 * (4.0 * PI * x).cos()
                            - 0.01168 * (6.0 * PI * x).cos()
                    }
                }
            })
            .collect()
    }
}

/// Windowing contract and parameter values for one extractor instance.
///
/// Zero block or step sizes are rejected at construction; a state that
/// exists is always processable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorState {
    pub block_size: usize,
    pub step_size: usize,
    pub window_type: WindowType,
    pub parameters: BTreeMap<String, f32>,
}

impl ExtractorState {
    pub fn new(block_size: usize, step_size: usize) -> Result<Self, ConfigError> {
        if block_size == 0 || step_size == 0 {
            return Err(ConfigError::InvalidState(format!(
                "block and step sizes must be non-zero (block {block_size}, step {step_size})"
            )));
        }

        Ok(Self {
            block_size,
            step_size,
            window_type: WindowType::default(),
            parameters: BTreeMap::new(),
        })
    }

    pub fn with_window(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn with_parameter(mut self, identifier: impl Into<String>, value: f32) -> Self {
        self.parameters.insert(identifier.into(), value);
        self
    }

    /// Re-check the invariants for states built by hand or deserialized.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 || self.step_size == 0 {
            return Err(ConfigError::InvalidState(format!(
                "block and step sizes must be non-zero (block {}, step {})",
                self.block_size, self.step_size
            )));
        }
        Ok(())
    }
}

impl Default for ExtractorState {
    fn default() -> Self {
        Self {
            block_size: 1024,
            step_size: 1024,
            window_type: WindowType::default(),
            parameters: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(ExtractorState::new(0, 512).is_err());
        assert!(ExtractorState::new(512, 0).is_err());
        assert!(ExtractorState::new(512, 256).is_ok());
    }

    #[test]
    fn test_validate_deserialized_state() {
        let mut state = ExtractorState::default();
        assert!(state.validate().is_ok());
        state.step_size = 0;
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let state = ExtractorState::new(2048, 512)
            .unwrap()
            .with_window(WindowType::Blackman)
            .with_parameter("threshold", 0.4);

        assert_eq!(state.window_type, WindowType::Blackman);
        assert_eq!(state.parameters.get("threshold"), Some(&0.4));
    }

    #[test]
    fn test_hann_window_shape() {
        let w = WindowType::Hann.coefficients(8);
        assert_eq!(w.len(), 8);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(w[7], 0.0, epsilon = 1e-6);
        // Symmetric
        for i in 0..4 {
            assert_relative_eq!(w[i], w[7 - i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rectangular_window() {
        assert_eq!(WindowType::Rectangular.coefficients(4), vec![1.0; 4]);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(WindowType::Hann.coefficients(0), Vec::<f32>::new());
        assert_eq!(WindowType::Hann.coefficients(1), vec![1.0]);
    }
}
