//! Literal-word dictionary and its match engine.
//!
//! - **`node`**: the arena trie built from a word set
//! - **`matcher`**: longest/shortest scanning with whitespace skipping
//! - **`capture`**: matched spans and offset-safe replacement

mod capture;
mod matcher;
mod node;

pub use capture::{Capture, CaptureSet};
pub use matcher::MatchOptions;
pub use node::Trie;
