//! Extractor catalogue: maps identifiers to extractor constructors.
//!
//! The catalogue is an injected dependency of the adapter rather than a
//! process-wide singleton, so hosts can scope catalogues per project and
//! tests can register doubles.

use crate::builtin;
use crate::extractor::FeatureExtractor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Constructs an extractor instance at a given sample rate.
pub type ExtractorConstructor = Arc<dyn Fn(f64) -> Box<dyn FeatureExtractor> + Send + Sync>;

/// A source of extractor instances.
pub trait ExtractorCatalogue: Send + Sync {
    /// Instantiate the named extractor, or `None` if it is not catalogued.
    fn create(&self, identifier: &str, sample_rate: f64) -> Option<Box<dyn FeatureExtractor>>;

    /// All catalogued identifiers, sorted.
    fn identifiers(&self) -> Vec<String>;

    /// Distinct non-empty categories, sorted.
    fn categories(&self) -> Vec<String>;
}

struct RegistryEntry {
    constructor: ExtractorConstructor,
    category: String,
}

/// Constructor registry backing the default catalogue.
#[derive(Default)]
pub struct ExtractorRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in extractors.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtin::register_all(&registry);
        registry
    }

    /// Register a constructor under an identifier. Later registrations
    /// replace earlier ones.
    pub fn register<F>(&self, identifier: impl Into<String>, category: impl Into<String>, ctor: F)
    where
        F: Fn(f64) -> Box<dyn FeatureExtractor> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        tracing::debug!(identifier = %identifier, "registered extractor");
        self.entries.write().insert(
            identifier,
            RegistryEntry {
                constructor: Arc::new(ctor),
                category: category.into(),
            },
        );
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.read().contains_key(identifier)
    }
}

impl ExtractorCatalogue for ExtractorRegistry {
    fn create(&self, identifier: &str, sample_rate: f64) -> Option<Box<dyn FeatureExtractor>> {
        let entries = self.entries.read();
        let entry = entries.get(identifier)?;
        Some((entry.constructor)(sample_rate))
    }

    fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self
            .entries
            .read()
            .values()
            .filter(|e| !e.category.is_empty())
            .map(|e| e.category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }
}
