//! Shared collaborators handed to every policy.

use std::sync::Arc;

use crate::{pattern::PatternCache, phonetic::Phonetics};

/// The pattern cache and phonetic data a group of policies share.
///
/// Cloning is cheap; clones point at the same cache and registries.
#[derive(Clone, Debug, Default)]
pub struct Context {
    patterns: Arc<PatternCache>,
    phonetics: Phonetics,
}

impl Context {
    /// A context with a fresh pattern cache and the given phonetics.
    #[must_use]
    pub fn new(phonetics: Phonetics) -> Self {
        Self {
            patterns: Arc::new(PatternCache::new()),
            phonetics,
        }
    }

    /// The compiled-pattern cache.
    #[must_use]
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Phonetic table and homophone contexts.
    #[must_use]
    pub fn phonetics(&self) -> &Phonetics {
        &self.phonetics
    }
}
