//! Shared cache of compiled pattern words.

use std::{
    borrow::Cow,
    fmt,
    ops::Range,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::{Duration, Instant},
};

use dashmap::{mapref::entry::Entry, DashMap};
use regex::{Regex, RegexBuilder};
use tokio_util::sync::CancellationToken;

use crate::error::{ensure_active, Error, Result};

const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);
const COMPILED_SIZE_LIMIT: usize = 64 * (1 << 20);
const DEFAULT_DFA_SIZE_LIMIT: usize = 2 * (1 << 20);
const COMPILED_DFA_SIZE_LIMIT: usize = 32 * (1 << 20);

/// Compile-time switches for a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatternFlags {
    /// Match case-insensitively.
    pub ignore_case: bool,
    /// Give the engine larger program and lazy-DFA budgets.
    pub compiled: bool,
}

/// Cache key: one registration of a pattern by one owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternKey {
    /// Identity of the registering policy.
    pub owner: u64,
    pub pattern: String,
    pub flags: PatternFlags,
    pub timeout: Option<Duration>,
}

/// One match of a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    /// The pattern that produced the match.
    pub pattern: Arc<str>,
    /// Byte offset of the match.
    pub start: usize,
    /// Byte offset one past the match.
    pub end: usize,
    /// The matched text.
    pub value: String,
    /// Spans of capture groups `1..`; `None` for groups that did not participate.
    pub groups: Vec<Option<Range<usize>>>,
}

impl PatternMatch {
    /// Returns `true` when at least one capture group participated.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        self.groups.iter().any(Option::is_some)
    }
}

/// A pattern compiled for one registration.
///
/// The underlying [`Regex`] is shared with every other registration of the
/// same pattern text and flags.
pub struct CompiledPattern {
    pattern: Arc<str>,
    regex: Arc<Regex>,
    timeout: Option<Duration>,
}

impl CompiledPattern {
    /// The pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The match timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn check_elapsed(&self, started: Instant) -> Result<()> {
        match self.timeout {
            Some(timeout) if started.elapsed() >= timeout => Err(Error::PatternTimeout {
                pattern: self.pattern.to_string(),
                timeout,
            }),
            _ => Ok(()),
        }
    }

    /// Returns `true` when the pattern matches anywhere in `text`.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn is_match(&self, text: &str, cancel: Option<&CancellationToken>) -> Result<bool> {
        ensure_active(cancel)?;
        let started = Instant::now();
        let found = self.regex.is_match(text);
        self.check_elapsed(started)?;
        Ok(found)
    }

    /// Every non-empty match in `text`, with capture group spans.
    ///
    /// The engine runs in linear time and cannot be interrupted mid-search, so
    /// cancellation and the timeout are checked between matches.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn find_all(
        &self,
        text: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<PatternMatch>> {
        ensure_active(cancel)?;
        let started = Instant::now();
        let mut matches = Vec::new();
        for captures in self.regex.captures_iter(text) {
            ensure_active(cancel)?;
            self.check_elapsed(started)?;

            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.is_empty() {
                continue;
            }
            matches.push(PatternMatch {
                pattern: Arc::clone(&self.pattern),
                start: whole.start(),
                end: whole.end(),
                value: whole.as_str().to_string(),
                groups: captures
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.range()))
                    .collect(),
            });
        }
        self.check_elapsed(started)?;
        Ok(matches)
    }

    /// Rewrites `text` match by match, borrowing it back when nothing matched.
    ///
    /// `rewrite` returns the edits for one match as absolute byte ranges with
    /// their replacements. Edits outside the match or overlapping an earlier
    /// edit are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn replace<'t, F>(
        &self,
        text: &'t str,
        cancel: Option<&CancellationToken>,
        mut rewrite: F,
    ) -> Result<Cow<'t, str>>
    where
        F: FnMut(&PatternMatch) -> Vec<(Range<usize>, String)>,
    {
        let matches = self.find_all(text, cancel)?;
        if matches.is_empty() {
            return Ok(Cow::Borrowed(text));
        }

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        for found in &matches {
            for (range, replacement) in rewrite(found) {
                if range.start < cursor
                    || range.start < found.start
                    || range.end > found.end
                    || range.start > range.end
                {
                    continue;
                }
                output.push_str(&text[cursor..range.start]);
                output.push_str(&replacement);
                cursor = range.end;
            }
        }
        output.push_str(&text[cursor..]);
        Ok(Cow::Owned(output))
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("pattern", &self.pattern)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Concurrent cache of compiled patterns.
///
/// Registrations are keyed per owner so one policy can drop its patterns
/// without touching another's; the compiled program behind identical
/// `(pattern, flags)` pairs is shared across owners.
#[derive(Default)]
pub struct PatternCache {
    entries: DashMap<PatternKey, Arc<CompiledPattern>>,
    programs: DashMap<(String, PatternFlags), Weak<Regex>>,
    next_owner: AtomicU64,
}

impl PatternCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a fresh owner id for [`PatternKey::owner`].
    pub fn next_owner_id(&self) -> u64 {
        self.next_owner.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the registration for `key`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] when the pattern does not compile.
    pub fn get_or_compile(&self, key: &PatternKey) -> Result<Arc<CompiledPattern>> {
        if let Some(found) = self.entries.get(key) {
            return Ok(Arc::clone(found.value()));
        }
        let entry = self
            .entries
            .entry(key.clone())
            .or_try_insert_with(|| self.compile(key).map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    /// Registers `key`, replacing any existing registration.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] when the pattern does not compile.
    pub fn add(&self, key: PatternKey) -> Result<Arc<CompiledPattern>> {
        let compiled = Arc::new(self.compile(&key)?);
        self.entries.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drops the registration for `key`. Returns `true` when it existed.
    pub fn remove(&self, key: &PatternKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.evict_programs();
        }
        removed
    }

    /// Drops every registration made by `owner`, returning how many there were.
    pub fn remove_owner(&self, owner: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.owner != owner);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(owner, removed, "evicted pattern registrations");
            self.evict_programs();
        }
        removed
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct compiled programs still alive.
    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs
            .iter()
            .filter(|program| program.value().strong_count() > 0)
            .count()
    }

    /// Looks up `key` and matches it against `text`.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`], [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn is_match(
        &self,
        key: &PatternKey,
        text: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<bool> {
        self.get_or_compile(key)?.is_match(text, cancel)
    }

    /// Looks up `key` and returns every match in `text`.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`], [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn find_all(
        &self,
        key: &PatternKey,
        text: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<PatternMatch>> {
        self.get_or_compile(key)?.find_all(text, cancel)
    }

    fn compile(&self, key: &PatternKey) -> Result<CompiledPattern> {
        let regex = match self.programs.entry((key.pattern.clone(), key.flags)) {
            Entry::Occupied(mut occupied) => {
                if let Some(shared) = occupied.get().upgrade() {
                    shared
                } else {
                    let fresh = Arc::new(build_regex(&key.pattern, key.flags)?);
                    occupied.insert(Arc::downgrade(&fresh));
                    fresh
                }
            }
            Entry::Vacant(vacant) => {
                let fresh = Arc::new(build_regex(&key.pattern, key.flags)?);
                vacant.insert(Arc::downgrade(&fresh));
                fresh
            }
        };
        Ok(CompiledPattern {
            pattern: Arc::from(key.pattern.as_str()),
            regex,
            timeout: key.timeout,
        })
    }

    fn evict_programs(&self) {
        self.programs.retain(|_, program| program.strong_count() > 0);
    }
}

impl fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternCache")
            .field("registrations", &self.entries.len())
            .field("programs", &self.programs.len())
            .finish()
    }
}

fn build_regex(pattern: &str, flags: PatternFlags) -> Result<Regex> {
    let (size_limit, dfa_size_limit) = if flags.compiled {
        (COMPILED_SIZE_LIMIT, COMPILED_DFA_SIZE_LIMIT)
    } else {
        (DEFAULT_SIZE_LIMIT, DEFAULT_DFA_SIZE_LIMIT)
    };
    RegexBuilder::new(pattern)
        .case_insensitive(flags.ignore_case)
        .size_limit(size_limit)
        .dfa_size_limit(dfa_size_limit)
        .build()
        .map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(owner: u64, pattern: &str) -> PatternKey {
        PatternKey {
            owner,
            pattern: pattern.to_string(),
            flags: PatternFlags::default(),
            timeout: None,
        }
    }

    #[test]
    fn identical_patterns_share_one_program() {
        let cache = PatternCache::new();
        let a = cache.get_or_compile(&key(1, r"\d+")).unwrap();
        let b = cache.get_or_compile(&key(2, r"\d+")).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&a.regex, &b.regex));
        assert_eq!(cache.program_count(), 1);
    }

    #[test]
    fn get_or_compile_reuses_registration() {
        let cache = PatternCache::new();
        let a = cache.get_or_compile(&key(1, "abc")).unwrap();
        let b = cache.get_or_compile(&key(1, "abc")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn flags_separate_programs() {
        let cache = PatternCache::new();
        let sensitive = cache.get_or_compile(&key(1, "abc")).unwrap();
        let mut folded = key(1, "abc");
        folded.flags.ignore_case = true;
        let insensitive = cache.get_or_compile(&folded).unwrap();
        assert!(!Arc::ptr_eq(&sensitive.regex, &insensitive.regex));
        assert!(!sensitive.is_match("ABC", None).unwrap());
        assert!(insensitive.is_match("ABC", None).unwrap());
    }

    #[test]
    fn remove_owner_evicts_only_that_owner() {
        let cache = PatternCache::new();
        cache.add(key(1, "a")).unwrap();
        cache.add(key(1, "b")).unwrap();
        cache.add(key(2, "a")).unwrap();
        assert_eq!(cache.remove_owner(1), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.remove(&key(2, "a")));
        assert!(!cache.remove(&key(2, "a")));
        assert_eq!(cache.program_count(), 0);
    }

    #[test]
    fn invalid_pattern_reports_source() {
        let cache = PatternCache::new();
        let err = cache.get_or_compile(&key(1, "(unclosed")).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref pattern, .. } if pattern == "(unclosed"));
        assert!(cache.is_empty());
    }

    #[test]
    fn find_all_reports_group_spans() {
        let cache = PatternCache::new();
        let found = cache
            .find_all(&key(1, r"(\d{3})-(x)?(\d{2})"), "tel 010-33 and 020-44", None)
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].value, "010-33");
        assert_eq!(found[0].groups, vec![Some(4..7), None, Some(8..10)]);
        assert!(found[0].has_groups());
    }

    #[test]
    fn empty_matches_are_dropped() {
        let cache = PatternCache::new();
        let found = cache.find_all(&key(1, "a*"), "bab", None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, "a");
    }

    #[test]
    fn zero_timeout_is_reported_distinctly() {
        let cache = PatternCache::new();
        let mut timed = key(1, "a");
        timed.timeout = Some(Duration::ZERO);
        let err = cache.find_all(&timed, "aaa", None).unwrap_err();
        assert!(matches!(err, Error::PatternTimeout { .. }));
    }

    #[test]
    fn replace_skips_edits_outside_the_match() {
        let cache = PatternCache::new();
        let compiled = cache.get_or_compile(&key(1, "b+")).unwrap();
        let out = compiled
            .replace("abbbc", None, |m| {
                vec![(0..1, "X".to_string()), (m.start..m.end, "*".to_string())]
            })
            .unwrap();
        assert_eq!(out, "a*c");

        let untouched = compiled.replace("xyz", None, |_| Vec::new()).unwrap();
        assert!(matches!(untouched, Cow::Borrowed("xyz")));
    }

    #[test]
    fn owner_ids_are_unique() {
        let cache = PatternCache::new();
        let first = cache.next_owner_id();
        assert_ne!(first, cache.next_owner_id());
    }
}
