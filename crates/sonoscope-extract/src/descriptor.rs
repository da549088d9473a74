//! Extractor and output shape metadata.

use crate::key::ExtractorKey;
use crate::state::ExtractorState;
use serde::{Deserialize, Serialize};

/// How an output's features are positioned in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleType {
    /// One feature per processed block, timestamped by the host.
    #[default]
    OneSamplePerStep,
    /// Features at a fixed rate given by `OutputDescriptor::sample_rate`.
    FixedRate,
    /// Features carry their own timestamps.
    VariableRate,
}

/// Input representation an extractor consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputDomain {
    #[default]
    Time,
    Frequency,
}

/// Dimensionality class of a result series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameType {
    /// Zero-dimensional discrete events with optional text.
    Label,
    /// One-dimensional scalar series.
    #[default]
    Value,
    /// Multi-dimensional per-frame arrays.
    Vector,
}

/// Shape metadata for one extractor output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub has_fixed_bin_count: bool,
    pub bin_count: usize,
    pub bin_names: Vec<String>,
    pub has_known_extents: bool,
    pub min_value: f32,
    pub max_value: f32,
    pub is_quantized: bool,
    pub quantize_step: f32,
    pub sample_type: SampleType,
    pub sample_rate: f64,
    pub has_duration: bool,
}

impl Default for OutputDescriptor {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            name: String::new(),
            description: String::new(),
            unit: String::new(),
            has_fixed_bin_count: true,
            bin_count: 1,
            bin_names: Vec::new(),
            has_known_extents: false,
            min_value: 0.0,
            max_value: 0.0,
            is_quantized: false,
            quantize_step: 0.0,
            sample_type: SampleType::default(),
            sample_rate: 0.0,
            has_duration: false,
        }
    }
}

impl OutputDescriptor {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn bins(mut self, count: usize) -> Self {
        self.has_fixed_bin_count = true;
        self.bin_count = count;
        self
    }

    pub fn unknown_bins(mut self) -> Self {
        self.has_fixed_bin_count = false;
        self.bin_count = 0;
        self
    }

    pub fn extents(mut self, min: f32, max: f32) -> Self {
        self.has_known_extents = true;
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    pub fn with_duration(mut self) -> Self {
        self.has_duration = true;
        self
    }

    /// The result-series class this output produces: no bins are discrete
    /// events, one bin is a scalar series, anything else (including an
    /// unknown bin count) is per-frame vectors.
    pub fn frame_type(&self) -> FrameType {
        if !self.has_fixed_bin_count {
            return FrameType::Vector;
        }
        match self.bin_count {
            0 => FrameType::Label,
            1 => FrameType::Value,
            _ => FrameType::Vector,
        }
    }
}

/// One configurable extractor parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    pub is_quantized: bool,
    pub quantize_step: f32,
    pub value_names: Vec<String>,
}

impl ParameterDescriptor {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn default_value(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }
}

/// Aggregated metadata for one adapted extractor: identity, parameters,
/// the configured output's shape, and the state a fresh instance would
/// default to. `input_domain` reflects what the adapter consumes, so a
/// frequency-domain extractor behind the FFT front-end reports `Time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorDescription {
    pub key: ExtractorKey,
    pub name: String,
    pub maker: String,
    pub version: u32,
    pub category: String,
    pub input_domain: InputDomain,
    pub parameters: Vec<ParameterDescriptor>,
    pub output: OutputDescriptor,
    pub default_state: ExtractorState,
}
