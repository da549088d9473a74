//! # Sonoscope - Audio Analysis Workstation Core
//!
//! The asynchronous feature-extraction pipeline of an audio-analysis
//! workstation, built from modular subsystems:
//! - **sonoscope-core** - Audio sources, frame/time math, realtime primitives
//! - **sonoscope-extract** - Extractor hosting (catalogue, adapter, built-ins)
//! - **sonoscope-analysis** - Block processor, analysis driver, result store
//! - **sonoscope-playback** - Real-time transport reader
//!
//! ## Quick Start
//!
//! ```
//! use sonoscope::prelude::*;
//! use std::sync::Arc;
//!
//! // Catalogue with the built-in extractors
//! let catalogue: Arc<dyn ExtractorCatalogue> = Arc::new(ExtractorRegistry::with_builtins());
//!
//! // One driver per track; results land in the track's store
//! let store = Arc::new(ResultStore::new());
//! let mut driver = AnalysisDriver::new(catalogue);
//!
//! let source = MemorySource::from_mono(vec![0.0; 44100], 44100.0).unwrap();
//! let setup = driver.run_analysis_into(
//!     &ExtractorKey::new("power", "power"),
//!     &ExtractorState::new(1024, 1024).unwrap(),
//!     Box::new(source),
//!     Arc::clone(&store),
//! );
//! assert!(setup.succeeded());
//!
//! // Completion arrives as a single event per run
//! match driver.events().recv().unwrap() {
//!     AnalysisEvent::Ended(results) => assert!(!results.channels[0].is_empty()),
//!     AnalysisEvent::Aborted => unreachable!(),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Analysis pipeline plus playback
//! - `playback` - Real-time transport reader

/// Re-export of sonoscope-core for direct access
pub use sonoscope_core as core;

/// Re-export of sonoscope-extract for direct access
pub use sonoscope_extract as extract;

/// Re-export of sonoscope-analysis for direct access
pub use sonoscope_analysis as analysis;

#[cfg(feature = "playback")]
/// Re-export of sonoscope-playback for direct access
pub use sonoscope_playback as playback;

pub use sonoscope_core::{
    frame_to_seconds, seconds_to_frame, AtomicFlag, AtomicFloat, AudioSource, GainRamp,
    MemorySource, RtLock, WavSource,
};

pub use sonoscope_extract::{
    builtin, AdapterError, ConfigError, ExtractorAdapter, ExtractorCatalogue,
    ExtractorDescription, ExtractorKey, ExtractorRegistry, ExtractorState, Feature,
    FeatureExtractor, FeatureSet, FrameType, InputDomain, OutputDescriptor, ParameterDescriptor,
    SampleType, WindowType,
};

pub use sonoscope_analysis::{
    AnalysisDriver, AnalysisEvent, AnalysisResult, AnalysisResults, AnalysisSetup,
    BlockProcessor, ProcessState, ResultStore, SeriesView, WarningType,
};

#[cfg(feature = "playback")]
pub use sonoscope_playback::{LoopRange, TransportReader};

/// Common imports for workstation hosts.
pub mod prelude {
    pub use crate::{
        AnalysisDriver, AnalysisEvent, AnalysisResults, AnalysisSetup, AudioSource,
        ExtractorCatalogue, ExtractorKey, ExtractorRegistry, ExtractorState, FrameType,
        MemorySource, OutputDescriptor, ResultStore, SeriesView, WarningType, WavSource,
    };

    #[cfg(feature = "playback")]
    pub use crate::{LoopRange, TransportReader};
}
