//! # Sonoscope Extract
//!
//! Feature-extractor hosting: the uniform interface analysis plugins
//! implement, the catalogue they are loaded from, and the adapter that
//! binds one extractor output to one audio configuration.
//!
//! - [`FeatureExtractor`]: the per-block extraction contract (metadata,
//!   parameters, outputs, `process`/`remaining_features`)
//! - [`ExtractorCatalogue`] / [`ExtractorRegistry`]: constructor registry
//!   mapping identifiers to extractor factories, with test-double support
//! - [`ExtractorAdapter`]: validates a key + state against the catalogue,
//!   initialises the extractor, filters its output to the configured
//!   feature, and back-fills missing timestamps
//! - [`builtin`]: power, onset, and spectrum extractors shipped with the
//!   workstation

pub mod adapter;
pub mod builtin;
pub mod catalogue;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod feature;
pub mod key;
pub mod state;

mod freq;

pub use adapter::ExtractorAdapter;
pub use catalogue::{ExtractorCatalogue, ExtractorConstructor, ExtractorRegistry};
pub use descriptor::{
    ExtractorDescription, FrameType, InputDomain, OutputDescriptor, ParameterDescriptor,
    SampleType,
};
pub use error::{AdapterError, ConfigError};
pub use extractor::{FeatureExtractor, FeatureSet};
pub use feature::Feature;
pub use key::ExtractorKey;
pub use state::{ExtractorState, WindowType};
