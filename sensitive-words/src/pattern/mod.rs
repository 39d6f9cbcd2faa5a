//! Pattern words: classification and the shared compiled-pattern cache.

mod cache;
mod classify;

pub use cache::{CompiledPattern, PatternCache, PatternFlags, PatternKey, PatternMatch};
pub use classify::{split_lines, split_words, Word, METACHARACTERS};
