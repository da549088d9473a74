//! # Sonoscope Playback
//!
//! The real-time side of the workstation: [`TransportReader`] feeds the
//! audio callback from an [`AudioSource`](sonoscope_core::AudioSource)
//! with sample-accurate looping and smoothed gain, never blocking the
//! audio thread. It shares the source abstraction with the analysis
//! pipeline but always owns its own source handle.

pub mod reader;

pub use reader::{LoopRange, TransportReader};
