//! Word policies: what to match and how to rewrite it.

mod config;
mod replace;
mod word_policy;

pub use config::PolicyConfig;
pub use word_policy::{MatchResult, WordPolicy};
