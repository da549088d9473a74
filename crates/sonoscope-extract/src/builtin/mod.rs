//! Built-in feature extractors shipped with the workstation.

mod onsets;
mod power;
mod spectrum;

pub use onsets::OnsetExtractor;
pub use power::PowerExtractor;
pub use spectrum::SpectrumExtractor;

use crate::catalogue::ExtractorRegistry;

/// Register every built-in extractor.
pub fn register_all(registry: &ExtractorRegistry) {
    registry.register("power", "Energy", |rate| Box::new(PowerExtractor::new(rate)));
    registry.register("onsets", "Time", |rate| Box::new(OnsetExtractor::new(rate)));
    registry.register("spectrum", "Spectral", |rate| {
        Box::new(SpectrumExtractor::new(rate))
    });
}
