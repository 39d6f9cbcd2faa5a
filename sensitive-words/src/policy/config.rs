//! Declarative policy settings.

use std::{path::PathBuf, time::Duration};

use crate::options::{Direction, GroupReplace, ReplaceMode, WhitespaceOptions};

/// Everything needed to build a [`super::WordPolicy`] in one go.
///
/// With the `serde` feature this deserializes from any serde format; every
/// field is optional and falls back to [`PolicyConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PolicyConfig {
    pub tag: Option<String>,
    pub direction: Direction,
    pub replace_mode: ReplaceMode,
    pub group_replace: GroupReplace,
    pub whitespace: WhitespaceOptions,
    /// Replacement for `Character` mode; empty deletes matches.
    pub mask: String,
    pub replace_single: bool,
    pub longest_match: bool,
    pub ignore_case: bool,
    /// Match timeout for pattern words, in milliseconds.
    pub pattern_timeout_ms: Option<u64>,
    pub pattern_compiled: bool,
    /// `|`-separated words, classified as literal or pattern.
    pub words: Vec<String>,
    /// `|`-separated pattern words.
    pub patterns: Vec<String>,
    pub word_files: Vec<PathBuf>,
    pub pattern_files: Vec<PathBuf>,
}

impl PolicyConfig {
    pub(crate) fn pattern_timeout(&self) -> Option<Duration> {
        self.pattern_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tag: None,
            direction: Direction::DEFAULT,
            replace_mode: ReplaceMode::Character,
            group_replace: GroupReplace::Default,
            whitespace: WhitespaceOptions::NONE,
            mask: "*".to_string(),
            replace_single: false,
            longest_match: true,
            ignore_case: false,
            pattern_timeout_ms: None,
            pattern_compiled: false,
            words: Vec::new(),
            patterns: Vec::new(),
            word_files: Vec::new(),
            pattern_files: Vec::new(),
        }
    }
}
