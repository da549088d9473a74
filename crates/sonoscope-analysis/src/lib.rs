//! # Sonoscope Analysis
//!
//! The asynchronous feature-extraction pipeline:
//! - [`BlockProcessor`]: streams one audio source through one adapted
//!   extractor at its block/step windowing, with exact block timestamps
//! - [`AnalysisDriver`]: runs the block loop on a background thread with
//!   at-most-one analysis in flight, cooperative abort, and edge-triggered
//!   completion events
//! - [`ResultStore`]: the normalized, time-ordered result container with
//!   non-blocking read access for UI threads

pub mod block;
pub mod driver;
pub mod store;

pub use block::BlockProcessor;
pub use driver::{
    AnalysisDriver, AnalysisEvent, AnalysisResults, AnalysisSetup, ProcessState, WarningType,
};
pub use store::{
    AnalysisResult, Column, ColumnSeries, Marker, MarkerSeries, Point, PointSeries, ResultStore,
    SeriesView, StoreReadGuard,
};
