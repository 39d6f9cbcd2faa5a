//! Left-to-right multi-word scan over a [`Trie`].

use tokio_util::sync::CancellationToken;

use super::{
    capture::{Capture, CaptureSet},
    node::{Trie, ROOT},
};
use crate::{
    error::{ensure_active, Result},
    options::WhitespaceOptions,
};

/// Per-scan matching rules.
#[derive(Clone, Copy, Debug)]
pub struct MatchOptions<'c> {
    /// Prefer the longest dictionary word at each anchor.
    pub longest_match: bool,
    /// Whitespace that may sit inside a matched word.
    pub whitespace: WhitespaceOptions,
    /// Checked once per anchor, per descent step and per skipped character.
    pub cancel: Option<&'c CancellationToken>,
}

impl Default for MatchOptions<'_> {
    fn default() -> Self {
        Self {
            longest_match: true,
            whitespace: WhitespaceOptions::NONE,
            cancel: None,
        }
    }
}

impl Trie {
    /// Finds every dictionary word in `text`.
    ///
    /// From each anchor the scan descends the trie one character at a time.
    /// An end-of-word node emits immediately unless longest matching is on
    /// and the node has children; in that case the descent continues and, if
    /// it dead-ends, the deepest end-of-word node passed on the way emits.
    /// Scanning resumes right after an emitted span, or one character after
    /// an anchor that matched nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Canceled`] once `options.cancel` fires.
    pub fn matches<'t>(&self, text: &'t str, options: MatchOptions<'_>) -> Result<CaptureSet<'t>> {
        let mut captures = Vec::new();
        let mut anchor = 0;

        while let Some(first) = text[anchor..].chars().next() {
            ensure_active(options.cancel)?;
            match self.descend(text, anchor, options)? {
                Some(end) => {
                    captures.push(Capture::new(anchor, end));
                    anchor = end;
                }
                None => anchor += first.len_utf8(),
            }
        }

        Ok(CaptureSet::new(text, captures))
    }

    /// Returns `true` when `text` contains any dictionary word.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Canceled`] once `options.cancel` fires.
    pub fn is_match(&self, text: &str, options: MatchOptions<'_>) -> Result<bool> {
        let mut anchor = 0;
        while let Some(first) = text[anchor..].chars().next() {
            ensure_active(options.cancel)?;
            if self.descend(text, anchor, options)?.is_some() {
                return Ok(true);
            }
            anchor += first.len_utf8();
        }
        Ok(false)
    }

    /// Matches `text` and rewrites every hit with `evaluator`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Canceled`] once `options.cancel` fires.
    pub fn replace_with<F>(&self, text: &str, options: MatchOptions<'_>, evaluator: F) -> Result<String>
    where
        F: FnMut(&str) -> String,
    {
        Ok(self.matches(text, options)?.replace(evaluator))
    }

    /// Walks the trie from `anchor`; returns the byte end of the emitted word.
    fn descend(&self, text: &str, anchor: usize, options: MatchOptions<'_>) -> Result<Option<usize>> {
        let mut node = ROOT;
        let mut cursor = anchor;
        let mut fallback = None;

        while let Some(mut ch) = text[cursor..].chars().next() {
            ensure_active(options.cancel)?;

            let mut next = self.child(node, ch);
            if next.is_none() && options.whitespace.is_enabled() && cursor > anchor {
                let skipped = skip_whitespace(text, cursor, options)?;
                if skipped > cursor {
                    if let Some(resumed) = text[skipped..].chars().next() {
                        next = self.child(node, resumed);
                        if next.is_some() {
                            cursor = skipped;
                            ch = resumed;
                        }
                    }
                }
            }

            let Some(child) = next else {
                break;
            };
            let end = cursor + ch.len_utf8();
            let found = &self.nodes[child];
            if found.end {
                if !options.longest_match || found.children.is_empty() {
                    return Ok(Some(end));
                }
                fallback = Some(end);
            }
            node = child;
            cursor = end;
        }

        Ok(fallback)
    }
}

fn skip_whitespace(text: &str, from: usize, options: MatchOptions<'_>) -> Result<usize> {
    let mut cursor = from;
    for ch in text[from..].chars() {
        ensure_active(options.cancel)?;
        if !options.whitespace.is_skippable(ch) {
            break;
        }
        cursor += ch.len_utf8();
    }
    Ok(cursor)
}
