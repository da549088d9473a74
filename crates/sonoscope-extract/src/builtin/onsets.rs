//! Energy-rise onset detector.

use crate::descriptor::{OutputDescriptor, ParameterDescriptor, SampleType};
use crate::extractor::{FeatureExtractor, FeatureSet};
use crate::feature::Feature;

/// Minimum time between reported onsets, in seconds.
const MIN_GAP_SECS: f64 = 0.05;

#[derive(Clone, Copy)]
struct PendingOnset {
    time: f64,
    energy: f32,
}

/// Detects onsets as block-to-block energy rises, confirmed one block
/// later when the energy stops climbing. The deferred confirmation means
/// the final candidate is only emitted from `remaining_features`.
pub struct OnsetExtractor {
    sample_rate: f64,
    threshold: f32,
    sensitivity: f32,
    prev_energy: f32,
    pending: Option<PendingOnset>,
    last_emitted: Option<f64>,
}

impl OnsetExtractor {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            threshold: 0.1,
            sensitivity: 1.0,
            prev_energy: 0.0,
            pending: None,
            last_emitted: None,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn effective_threshold(&self) -> f32 {
        self.threshold / self.sensitivity
    }

    fn confirm(&mut self, pending: PendingOnset) -> Option<Feature> {
        let gap_ok = self
            .last_emitted
            .map_or(true, |t| pending.time - t >= MIN_GAP_SECS);
        if !gap_ok {
            return None;
        }
        self.last_emitted = Some(pending.time);
        Some(Feature::at(pending.time).with_label("onset"))
    }

    fn block_energy(block: &[&[f32]]) -> f32 {
        let mut sum_sq = 0.0f64;
        let mut count = 0usize;
        for channel in block {
            for &sample in channel.iter() {
                sum_sq += (sample as f64) * (sample as f64);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64) as f32
        }
    }
}

impl FeatureExtractor for OnsetExtractor {
    fn identifier(&self) -> &str {
        "onsets"
    }

    fn name(&self) -> &str {
        "Onsets"
    }

    fn maker(&self) -> &str {
        "sonoscope"
    }

    fn category(&self) -> &str {
        "Time"
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::new("threshold", "Energy threshold")
                .range(0.0, 1.0)
                .default_value(0.1),
            ParameterDescriptor::new("sensitivity", "Sensitivity")
                .range(0.1, 10.0)
                .default_value(1.0),
        ]
    }

    fn set_parameter(&mut self, identifier: &str, value: f32) {
        match identifier {
            "threshold" => self.threshold = value.clamp(0.0, 1.0),
            "sensitivity" => self.sensitivity = value.clamp(0.1, 10.0),
            _ => {}
        }
    }

    fn parameter(&self, identifier: &str) -> f32 {
        match identifier {
            "threshold" => self.threshold,
            "sensitivity" => self.sensitivity,
            _ => 0.0,
        }
    }

    fn output_descriptors(&self) -> Vec<OutputDescriptor> {
        vec![OutputDescriptor::new("onsets", "Onsets")
            .bins(0)
            .sample_type(SampleType::VariableRate)]
    }

    fn initialise(&mut self, channels: usize, _step_size: usize, block_size: usize) -> bool {
        channels > 0 && block_size > 0
    }

    fn reset(&mut self) {
        self.prev_energy = 0.0;
        self.pending = None;
        self.last_emitted = None;
    }

    fn process(&mut self, block: &[&[f32]], timestamp: f64) -> FeatureSet {
        let energy = Self::block_energy(block);
        let rise = energy - self.prev_energy;
        let mut features = Vec::new();

        if let Some(pending) = self.pending.take() {
            if energy <= pending.energy {
                features.extend(self.confirm(pending));
            } else {
                // Still rising: keep the onset time, track the new peak.
                self.pending = Some(PendingOnset {
                    time: pending.time,
                    energy,
                });
            }
        }

        if self.pending.is_none() && rise > self.effective_threshold() {
            self.pending = Some(PendingOnset {
                time: timestamp,
                energy,
            });
        }

        self.prev_energy = energy;

        let mut set = FeatureSet::new();
        set.insert(0, features);
        set
    }

    fn remaining_features(&mut self) -> FeatureSet {
        let mut features = Vec::new();
        if let Some(pending) = self.pending.take() {
            features.extend(self.confirm(pending));
        }

        let mut set = FeatureSet::new();
        set.insert(0, features);
        set
    }
}
