//! Extractor key: identifies one output feature of one extractor.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifies an extractor in the catalogue plus one of its output
/// features. Displayed and ordered as `identifier:feature`, so keys can
/// serve as stable lookup keys in ordered containers and persisted maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractorKey {
    pub identifier: String,
    pub feature: String,
}

impl ExtractorKey {
    pub fn new(identifier: impl Into<String>, feature: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            feature: feature.into(),
        }
    }

    /// Both parts must be non-empty for the key to name anything.
    pub fn is_valid(&self) -> bool {
        !self.identifier.is_empty() && !self.feature.is_empty()
    }
}

impl fmt::Display for ExtractorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identifier, self.feature)
    }
}

impl Ord for ExtractorKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let this = self
            .identifier
            .bytes()
            .chain(std::iter::once(b':'))
            .chain(self.feature.bytes());
        let that = other
            .identifier
            .bytes()
            .chain(std::iter::once(b':'))
            .chain(other.feature.bytes());
        // Identifiers may themselves contain ':', so equal concatenations
        // still need a field-level tie-break to stay consistent with Eq.
        this.cmp(that)
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

impl PartialOrd for ExtractorKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
