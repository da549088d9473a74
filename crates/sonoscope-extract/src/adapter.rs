//! Binds one extractor output to one audio configuration.

use crate::catalogue::ExtractorCatalogue;
use crate::descriptor::{ExtractorDescription, InputDomain, OutputDescriptor};
use crate::error::AdapterError;
use crate::extractor::{FeatureExtractor, FeatureSet};
use crate::feature::Feature;
use crate::freq::FrequencyFrontEnd;
use crate::key::ExtractorKey;
use crate::state::ExtractorState;
use std::collections::BTreeMap;

/// A catalogued extractor bound to a key, a state, and an audio format.
///
/// Creation validates everything that can fail up front: the key names a
/// catalogued extractor and one of its outputs, every configured parameter
/// exists, and the extractor accepts the channel/step/block configuration.
/// A constructed adapter processes blocks without further fallible setup.
///
/// Frequency-domain extractors are wrapped in a windowed FFT front-end, so
/// the adapter always consumes time-domain audio and its description
/// reports `InputDomain::Time` with the state's window type in effect.
pub struct ExtractorAdapter {
    extractor: Box<dyn FeatureExtractor>,
    front_end: Option<FrequencyFrontEnd>,
    output_index: usize,
    output: OutputDescriptor,
    description: ExtractorDescription,
    channels: usize,
    block_size: usize,
    step_size: usize,
}

impl std::fmt::Debug for ExtractorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorAdapter")
            .field("extractor", &self.extractor.identifier())
            .field("front_end", &self.front_end.is_some())
            .field("output_index", &self.output_index)
            .field("output", &self.output)
            .field("description", &self.description)
            .field("channels", &self.channels)
            .field("block_size", &self.block_size)
            .field("step_size", &self.step_size)
            .finish()
    }
}

impl ExtractorAdapter {
    pub fn create(
        catalogue: &dyn ExtractorCatalogue,
        key: &ExtractorKey,
        state: &ExtractorState,
        channels: usize,
        sample_rate: f64,
    ) -> Result<Self, AdapterError> {
        if !key.is_valid() {
            return Err(AdapterError::InvalidKey(key.to_string()));
        }
        state.validate()?;

        let mut extractor = catalogue
            .create(&key.identifier, sample_rate)
            .ok_or_else(|| AdapterError::NotFound(key.identifier.clone()))?;

        let parameters = extractor.parameter_descriptors();
        for name in state.parameters.keys() {
            if !parameters.iter().any(|p| &p.identifier == name) {
                return Err(AdapterError::UnknownParameter {
                    identifier: key.identifier.clone(),
                    parameter: name.clone(),
                });
            }
        }

        let outputs = extractor.output_descriptors();
        let output_index = outputs
            .iter()
            .position(|o| o.identifier == key.feature)
            .ok_or_else(|| AdapterError::UnknownFeature {
                identifier: key.identifier.clone(),
                feature: key.feature.clone(),
            })?;

        for (name, value) in &state.parameters {
            extractor.set_parameter(name, *value);
        }

        if !extractor.initialise(channels, state.step_size, state.block_size) {
            return Err(AdapterError::InitialisationRejected {
                identifier: key.identifier.clone(),
                channels,
                step_size: state.step_size,
                block_size: state.block_size,
            });
        }

        // Output shapes may depend on the configured block size.
        let output = extractor
            .output_descriptors()
            .into_iter()
            .nth(output_index)
            .unwrap_or_else(|| outputs[output_index].clone());

        let wrapped = extractor.input_domain() == InputDomain::Frequency;
        let front_end = wrapped
            .then(|| FrequencyFrontEnd::new(state.block_size, channels, state.window_type));

        let default_block = extractor.preferred_block_size().max(1);
        let default_step = match extractor.preferred_step_size() {
            0 if wrapped => (default_block / 2).max(1),
            0 => default_block,
            step => step,
        };
        let default_parameters: BTreeMap<String, f32> = parameters
            .iter()
            .map(|p| (p.identifier.clone(), p.default_value))
            .collect();

        let description = ExtractorDescription {
            key: key.clone(),
            name: extractor.name().to_string(),
            maker: extractor.maker().to_string(),
            version: extractor.version(),
            category: extractor.category().to_string(),
            input_domain: InputDomain::Time,
            parameters,
            output: output.clone(),
            default_state: ExtractorState {
                block_size: default_block,
                step_size: default_step,
                window_type: state.window_type,
                parameters: default_parameters,
            },
        };

        tracing::debug!(key = %key, channels, "extractor adapter created");

        Ok(Self {
            extractor,
            front_end,
            output_index,
            output,
            description,
            channels,
            block_size: state.block_size,
            step_size: state.step_size,
        })
    }

    pub fn description(&self) -> &ExtractorDescription {
        &self.description
    }

    pub fn output(&self) -> &OutputDescriptor {
        &self.output
    }

    pub fn output_index(&self) -> usize {
        self.output_index
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Process one time-domain block, returning the configured output's
    /// features with missing timestamps stamped to the block's time.
    pub fn process_block(&mut self, block: &[&[f32]], timestamp: f64) -> Vec<Feature> {
        let set = match self.front_end.as_mut() {
            Some(front) => {
                front.transform(block);
                let spectra = front.channel_slices();
                self.extractor.process(&spectra, timestamp)
            }
            None => self.extractor.process(block, timestamp),
        };
        Self::stamped(set, self.output_index, timestamp)
    }

    /// Drain buffered output after the final block; unstamped trailing
    /// features inherit the drain call's timestamp.
    pub fn remaining_features(&mut self, timestamp: f64) -> Vec<Feature> {
        Self::stamped(
            self.extractor.remaining_features(),
            self.output_index,
            timestamp,
        )
    }

    fn stamped(mut set: FeatureSet, index: usize, timestamp: f64) -> Vec<Feature> {
        let mut features = set.remove(&index).unwrap_or_default();
        for feature in features.iter_mut() {
            if feature.timestamp.is_none() {
                feature.timestamp = Some(timestamp);
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::ExtractorRegistry;
    use crate::descriptor::SampleType;

    /// Emits one unstamped feature and one self-stamped feature per block
    /// on output 0, plus decoy features on output 1.
    struct TwoOutputExtractor;

    impl FeatureExtractor for TwoOutputExtractor {
        fn identifier(&self) -> &str {
            "two-output"
        }
        fn name(&self) -> &str {
            "Two Output"
        }
        fn output_descriptors(&self) -> Vec<OutputDescriptor> {
            vec![
                OutputDescriptor::new("first", "First"),
                OutputDescriptor::new("second", "Second"),
            ]
        }
        fn initialise(&mut self, channels: usize, _step: usize, _block: usize) -> bool {
            channels > 0
        }
        fn process(&mut self, _block: &[&[f32]], _timestamp: f64) -> FeatureSet {
            let mut set = FeatureSet::new();
            set.insert(
                0,
                vec![
                    Feature::unstamped().with_value(1.0),
                    Feature::at(123.0).with_value(2.0),
                ],
            );
            set.insert(1, vec![Feature::unstamped().with_value(9.0)]);
            set
        }
        fn remaining_features(&mut self) -> FeatureSet {
            let mut set = FeatureSet::new();
            set.insert(0, vec![Feature::unstamped().with_value(3.0)]);
            set
        }
    }

    /// Frequency-domain extractor reporting the DC bin magnitude.
    struct DcBinExtractor {
        block_size: usize,
    }

    impl FeatureExtractor for DcBinExtractor {
        fn identifier(&self) -> &str {
            "dc-bin"
        }
        fn name(&self) -> &str {
            "DC Bin"
        }
        fn input_domain(&self) -> InputDomain {
            InputDomain::Frequency
        }
        fn output_descriptors(&self) -> Vec<OutputDescriptor> {
            vec![OutputDescriptor::new("dc", "DC").sample_type(SampleType::OneSamplePerStep)]
        }
        fn initialise(&mut self, channels: usize, _step: usize, block: usize) -> bool {
            self.block_size = block;
            channels > 0
        }
        fn process(&mut self, block: &[&[f32]], _timestamp: f64) -> FeatureSet {
            assert_eq!(block[0].len(), self.block_size + 2);
            let dc = (block[0][0] * block[0][0] + block[0][1] * block[0][1]).sqrt();
            let mut set = FeatureSet::new();
            set.insert(0, vec![Feature::unstamped().with_value(dc)]);
            set
        }
    }

    fn registry() -> ExtractorRegistry {
        let registry = ExtractorRegistry::with_builtins();
        registry.register("two-output", "Test", |_| Box::new(TwoOutputExtractor));
        registry.register("dc-bin", "Test", |_| {
            Box::new(DcBinExtractor { block_size: 0 })
        });
        registry
    }

    #[test]
    fn test_create_validates_key() {
        let registry = registry();
        let state = ExtractorState::default();

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("", "x"),
            &state,
            1,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidKey(_)));
    }

    #[test]
    fn test_create_validates_state() {
        let registry = registry();
        let mut state = ExtractorState::default();
        state.block_size = 0;

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("power", "power"),
            &state,
            1,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidState(_)));
    }

    #[test]
    fn test_create_unknown_identifier_and_feature() {
        let registry = registry();
        let state = ExtractorState::default();

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("missing", "x"),
            &state,
            1,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)));

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("power", "bogus"),
            &state,
            1,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownFeature { .. }));
    }

    #[test]
    fn test_create_rejects_unknown_parameter() {
        let registry = registry();
        let state = ExtractorState::default().with_parameter("bogus", 1.0);

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("onsets", "onsets"),
            &state,
            1,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::UnknownParameter { .. }));
    }

    #[test]
    fn test_create_initialisation_rejected() {
        let registry = registry();
        let state = ExtractorState::default();

        let err = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("power", "power"),
            &state,
            0,
            44100.0,
        )
        .unwrap_err();
        assert!(matches!(err, AdapterError::InitialisationRejected { .. }));
    }

    #[test]
    fn test_output_filtering_and_timestamp_backfill() {
        let registry = registry();
        let state = ExtractorState::default();
        let mut adapter = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("two-output", "first"),
            &state,
            1,
            44100.0,
        )
        .unwrap();

        let samples = vec![0.0f32; 1024];
        let features = adapter.process_block(&[&samples], 2.5);

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].timestamp, Some(2.5));
        assert_eq!(features[1].timestamp, Some(123.0));
        assert_eq!(features[0].values, vec![1.0]);

        let trailing = adapter.remaining_features(7.0);
        assert_eq!(trailing.len(), 1);
        assert_eq!(trailing[0].timestamp, Some(7.0));
    }

    #[test]
    fn test_frequency_domain_wrapping() {
        let registry = registry();
        let state = ExtractorState::new(64, 32).unwrap();
        let mut adapter = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("dc-bin", "dc"),
            &state,
            1,
            44100.0,
        )
        .unwrap();

        // The adapter consumes time-domain audio and reports it.
        assert_eq!(adapter.description().input_domain, InputDomain::Time);
        // Wrapped extractors default to a half-block hop.
        assert_eq!(adapter.description().default_state.step_size, 512);

        let samples = vec![1.0f32; 64];
        let features = adapter.process_block(&[&samples], 0.0);
        assert_eq!(features.len(), 1);
        // Hann-windowed DC energy: sum of window coefficients.
        let expected: f32 = crate::state::WindowType::Hann.coefficients(64).iter().sum();
        assert!((features[0].values[0] - expected).abs() < 1e-2);
    }

    #[test]
    fn test_description_aggregates_metadata() {
        let registry = registry();
        let state = ExtractorState::default();
        let adapter = ExtractorAdapter::create(
            &registry,
            &ExtractorKey::new("onsets", "onsets"),
            &state,
            1,
            44100.0,
        )
        .unwrap();

        let desc = adapter.description();
        assert_eq!(desc.key, ExtractorKey::new("onsets", "onsets"));
        assert!(!desc.name.is_empty());
        assert!(desc.parameters.iter().any(|p| p.identifier == "threshold"));
        assert!(desc
            .default_state
            .parameters
            .contains_key("threshold"));
    }
}
