//! A dictionary of literal and pattern words with its replacement rules.

use std::{
    borrow::Cow,
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use arc_swap::ArcSwap;
use indexmap::IndexSet;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{config::PolicyConfig, replace::Replacer};
use crate::{
    context::Context,
    error::{read_to_string, Error, Result},
    options::{Direction, GroupReplace, ReplaceMode, WhitespaceOptions},
    pattern::{
        split_lines, split_words, CompiledPattern, PatternFlags, PatternKey, PatternMatch, Word,
    },
    trie::{CaptureSet, MatchOptions, Trie},
};

/// Word sets as edited; published by [`WordPolicy::build`].
#[derive(Debug, Default)]
struct Staged {
    /// Every word in insertion order, literals unescaped.
    words: IndexSet<String>,
    literals: IndexSet<String>,
    patterns: IndexSet<String>,
    word_files: HashSet<PathBuf>,
    pattern_files: HashSet<PathBuf>,
    /// Pattern keys registered in the cache by the last build.
    registered: Vec<PatternKey>,
}

/// What scans read: immutable once stored.
#[derive(Debug, Default)]
struct Snapshot {
    trie: Trie,
    patterns: Vec<Arc<CompiledPattern>>,
}

/// Matches found by one policy in one text.
#[derive(Clone, Debug)]
pub struct MatchResult {
    policy_id: u64,
    tag: Option<String>,
    direction: Direction,
    captures: CaptureSet<'static>,
    pattern_matches: Vec<PatternMatch>,
}

impl MatchResult {
    /// Id of the policy that produced the result.
    #[must_use]
    pub const fn policy_id(&self) -> u64 {
        self.policy_id
    }

    /// Tag of the policy that produced the result.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Direction mask of the policy that produced the result.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Literal-word hits.
    #[must_use]
    pub const fn captures(&self) -> &CaptureSet<'static> {
        &self.captures
    }

    /// Pattern-word hits, grouped by pattern in registration order.
    #[must_use]
    pub fn pattern_matches(&self) -> &[PatternMatch] {
        &self.pattern_matches
    }

    /// Returns `true` when any word matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.captures.is_empty() || !self.pattern_matches.is_empty()
    }
}

/// One desensitization policy.
///
/// Literal words go into a trie; pattern words are compiled through the
/// shared [`crate::pattern::PatternCache`]. Edits to the word sets take effect
/// on the next [`WordPolicy::build`]; until then scans keep using the last
/// published dictionary.
///
/// ```
/// use sensitive_words::{Context, WordPolicy};
///
/// let policy = WordPolicy::new(&Context::default()).with_mask("?");
/// policy.add_words("操|文|NM");
/// policy.build()?;
/// assert_eq!(policy.replace("这是什么操作", None)?, "这是什么?作");
/// # Ok::<(), sensitive_words::Error>(())
/// ```
pub struct WordPolicy {
    id: u64,
    context: Context,
    tag: Option<String>,
    direction: Direction,
    replace_mode: ReplaceMode,
    group_replace: GroupReplace,
    whitespace: WhitespaceOptions,
    mask: String,
    replace_single: bool,
    longest_match: bool,
    ignore_case: bool,
    pattern_timeout: Option<Duration>,
    pattern_compiled: bool,
    staged: Mutex<Staged>,
    snapshot: ArcSwap<Snapshot>,
}

impl WordPolicy {
    /// An empty policy: direction `DEFAULT`, `Character` mode with mask `*`,
    /// longest matching, case-sensitive, no whitespace skipping.
    #[must_use]
    pub fn new(context: &Context) -> Self {
        Self {
            id: context.patterns().next_owner_id(),
            context: context.clone(),
            tag: None,
            direction: Direction::DEFAULT,
            replace_mode: ReplaceMode::Character,
            group_replace: GroupReplace::Default,
            whitespace: WhitespaceOptions::NONE,
            mask: "*".to_string(),
            replace_single: false,
            longest_match: true,
            ignore_case: false,
            pattern_timeout: None,
            pattern_compiled: false,
            staged: Mutex::new(Staged::default()),
            snapshot: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Builds and publishes a policy from `config`, loading its word files.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::Io`] for word files,
    /// [`Error::Pattern`] for patterns that do not compile.
    pub fn from_config(context: &Context, config: &PolicyConfig) -> Result<Self> {
        let mut policy = Self::new(context)
            .with_direction(config.direction)
            .with_replace_mode(config.replace_mode)
            .with_group_replace(config.group_replace)
            .with_whitespace(config.whitespace)
            .with_mask(config.mask.clone())
            .with_replace_single(config.replace_single)
            .with_longest_match(config.longest_match)
            .with_ignore_case(config.ignore_case)?
            .with_pattern_timeout(config.pattern_timeout())?
            .with_pattern_compiled(config.pattern_compiled)?;
        if let Some(tag) = &config.tag {
            policy = policy.with_tag(tag.clone());
        }

        for words in &config.words {
            policy.add_words(words);
        }
        for patterns in &config.patterns {
            policy.add_patterns(patterns);
        }
        for path in &config.word_files {
            policy.add_words_file(path)?;
        }
        for path in &config.pattern_files {
            policy.add_patterns_file(path)?;
        }
        policy.build()?;
        Ok(policy)
    }

    /// Restricts the policy to calls and fields carrying `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_replace_mode(mut self, mode: ReplaceMode) -> Self {
        self.replace_mode = mode;
        self
    }

    #[must_use]
    pub fn with_group_replace(mut self, group: GroupReplace) -> Self {
        self.group_replace = group;
        self
    }

    #[must_use]
    pub fn with_whitespace(mut self, whitespace: WhitespaceOptions) -> Self {
        self.whitespace = whitespace;
        self
    }

    /// Mask used by `Character` mode; an empty mask deletes matches.
    #[must_use]
    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }

    /// Emit the mask once per match instead of once per character.
    #[must_use]
    pub fn with_replace_single(mut self, replace_single: bool) -> Self {
        self.replace_single = replace_single;
        self
    }

    #[must_use]
    pub fn with_longest_match(mut self, longest_match: bool) -> Self {
        self.longest_match = longest_match;
        self
    }

    /// Case-insensitive matching for literals and patterns.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] once pattern words are registered.
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Result<Self> {
        self.ensure_no_patterns("ignore_case")?;
        self.ignore_case = ignore_case;
        Ok(self)
    }

    /// Per-scan timeout for each pattern word.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] once pattern words are registered.
    pub fn with_pattern_timeout(mut self, timeout: Option<Duration>) -> Result<Self> {
        self.ensure_no_patterns("pattern_timeout")?;
        self.pattern_timeout = timeout;
        Ok(self)
    }

    /// Compile patterns with larger engine budgets.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] once pattern words are registered.
    pub fn with_pattern_compiled(mut self, compiled: bool) -> Result<Self> {
        self.ensure_no_patterns("pattern_compiled")?;
        self.pattern_compiled = compiled;
        Ok(self)
    }

    fn ensure_no_patterns(&self, property: &'static str) -> Result<()> {
        if self.staged.lock().patterns.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidState { property })
        }
    }

    /// Adds `|`-separated words, sorting each into literals or patterns.
    pub fn add_words(&self, words: &str) -> &Self {
        let mut staged = self.staged.lock();
        for token in split_words(words) {
            stage(&mut staged, Word::classify(token));
        }
        self
    }

    /// Adds `|`-separated pattern words without classification.
    pub fn add_patterns(&self, patterns: &str) -> &Self {
        let mut staged = self.staged.lock();
        for token in split_words(patterns) {
            stage(&mut staged, Word::Pattern(token.to_string()));
        }
        self
    }

    /// Adds the words of a file: one or more `|`-separated words per line.
    ///
    /// A path already loaded by this policy is skipped.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::Io`]; nothing is added.
    pub fn add_words_file(&self, path: impl AsRef<Path>) -> Result<&Self> {
        let path = path.as_ref();
        if self.staged.lock().word_files.contains(path) {
            return Ok(self);
        }
        let contents = read_to_string(path)?;
        let mut staged = self.staged.lock();
        if staged.word_files.insert(path.to_path_buf()) {
            for token in split_lines(&contents) {
                stage(&mut staged, Word::classify(token));
            }
        }
        Ok(self)
    }

    /// Adds the pattern words of a file.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::Io`]; nothing is added.
    pub fn add_patterns_file(&self, path: impl AsRef<Path>) -> Result<&Self> {
        let path = path.as_ref();
        if self.staged.lock().pattern_files.contains(path) {
            return Ok(self);
        }
        let contents = read_to_string(path)?;
        let mut staged = self.staged.lock();
        if staged.pattern_files.insert(path.to_path_buf()) {
            for token in split_lines(&contents) {
                stage(&mut staged, Word::Pattern(token.to_string()));
            }
        }
        Ok(self)
    }

    /// Removes `|`-separated words. Returns `true` when any was present.
    pub fn remove_words(&self, words: &str) -> bool {
        let mut staged = self.staged.lock();
        let mut removed = false;
        for token in split_words(words) {
            removed |= unstage(&mut staged, &Word::classify(token));
        }
        removed
    }

    /// Removes `|`-separated pattern words. Returns `true` when any was present.
    pub fn remove_patterns(&self, patterns: &str) -> bool {
        let mut staged = self.staged.lock();
        let mut removed = false;
        for token in split_words(patterns) {
            removed |= unstage(&mut staged, &Word::Pattern(token.to_string()));
        }
        removed
    }

    /// Every staged word in insertion order.
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        self.staged.lock().words.iter().cloned().collect()
    }

    /// Returns `true` when `word` is staged, literal or pattern.
    #[must_use]
    pub fn contains_word(&self, word: &str) -> bool {
        self.staged.lock().words.contains(word)
    }

    /// Publishes the staged words.
    ///
    /// Compiles pattern words through the shared cache and drops cache
    /// entries for patterns removed since the previous build. On error the
    /// previous dictionary stays published.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] for a pattern that does not compile.
    pub fn build(&self) -> Result<()> {
        let mut staged = self.staged.lock();
        let trie = Trie::build(&staged.literals, self.ignore_case);

        let flags = PatternFlags {
            ignore_case: self.ignore_case,
            compiled: self.pattern_compiled,
        };
        let keys: Vec<PatternKey> = staged
            .patterns
            .iter()
            .map(|pattern| PatternKey {
                owner: self.id,
                pattern: pattern.clone(),
                flags,
                timeout: self.pattern_timeout,
            })
            .collect();
        let mut patterns = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.context.patterns().get_or_compile(key) {
                Ok(compiled) => patterns.push(compiled),
                Err(err) => {
                    // Drop what this pass registered; the published keys stay.
                    for fresh in keys.iter().filter(|fresh| !staged.registered.contains(fresh)) {
                        self.context.patterns().remove(fresh);
                    }
                    return Err(err);
                }
            }
        }

        for stale in staged.registered.iter().filter(|key| !keys.contains(key)) {
            self.context.patterns().remove(stale);
        }
        staged.registered = keys;

        tracing::debug!(
            policy = self.id,
            tag = self.tag.as_deref(),
            literals = trie.word_count(),
            patterns = patterns.len(),
            "built word policy"
        );
        self.snapshot.store(Arc::new(Snapshot { trie, patterns }));
        Ok(())
    }

    const fn match_options<'c>(&self, cancel: Option<&'c CancellationToken>) -> MatchOptions<'c> {
        MatchOptions {
            longest_match: self.longest_match,
            whitespace: self.whitespace,
            cancel,
        }
    }

    fn replacer(&self) -> Replacer<'_> {
        Replacer {
            mode: self.replace_mode,
            mask: self.mask.as_str(),
            replace_single: self.replace_single,
            phonetics: self.context.phonetics(),
        }
    }

    /// Desensitizes `text`: literal hits first, then each pattern in turn.
    ///
    /// Returns the input borrowed when nothing changed.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn replace<'t>(
        &self,
        text: &'t str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Cow<'t, str>> {
        let mut current = Cow::Borrowed(text);
        if text.is_empty() {
            return Ok(current);
        }
        let snapshot = self.snapshot.load();
        let replacer = self.replacer();

        if !snapshot.trie.is_empty() {
            let rewritten = {
                let captures = snapshot.trie.matches(&current, self.match_options(cancel))?;
                if captures.is_empty() {
                    None
                } else {
                    Some(captures.replace(|matched| replacer.evaluate(matched)))
                }
            };
            if let Some(rewritten) = rewritten {
                current = Cow::Owned(rewritten);
            }
        }

        for pattern in &snapshot.patterns {
            let rewritten = match pattern.replace(&current, cancel, |found| {
                replacer.pattern_edits(found, self.group_replace)
            })? {
                Cow::Owned(rewritten) => Some(rewritten),
                Cow::Borrowed(_) => None,
            };
            if let Some(rewritten) = rewritten {
                current = Cow::Owned(rewritten);
            }
        }
        Ok(current)
    }

    /// Returns `true` when any literal or pattern word occurs in `text`.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn is_match(&self, text: &str, cancel: Option<&CancellationToken>) -> Result<bool> {
        if text.is_empty() {
            return Ok(false);
        }
        let snapshot = self.snapshot.load();
        if snapshot.trie.is_match(text, self.match_options(cancel))? {
            return Ok(true);
        }
        for pattern in &snapshot.patterns {
            if pattern.is_match(text, cancel)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every literal and pattern hit in `text`, against the original text.
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::PatternTimeout`].
    pub fn matches(&self, text: &str, cancel: Option<&CancellationToken>) -> Result<MatchResult> {
        let snapshot = self.snapshot.load();
        let captures = snapshot
            .trie
            .matches(text, self.match_options(cancel))?
            .into_owned();
        let mut pattern_matches = Vec::new();
        if !text.is_empty() {
            for pattern in &snapshot.patterns {
                pattern_matches.extend(pattern.find_all(text, cancel)?);
            }
        }
        Ok(MatchResult {
            policy_id: self.id,
            tag: self.tag.clone(),
            direction: self.direction,
            captures,
            pattern_matches,
        })
    }

    /// Unique id of this policy, also its owner id in the pattern cache.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn replace_mode(&self) -> ReplaceMode {
        self.replace_mode
    }

    #[must_use]
    pub const fn group_replace(&self) -> GroupReplace {
        self.group_replace
    }

    #[must_use]
    pub const fn whitespace(&self) -> WhitespaceOptions {
        self.whitespace
    }

    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    #[must_use]
    pub const fn replace_single(&self) -> bool {
        self.replace_single
    }

    #[must_use]
    pub const fn longest_match(&self) -> bool {
        self.longest_match
    }

    #[must_use]
    pub const fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    #[must_use]
    pub const fn pattern_timeout(&self) -> Option<Duration> {
        self.pattern_timeout
    }

    #[must_use]
    pub const fn pattern_compiled(&self) -> bool {
        self.pattern_compiled
    }
}

fn stage(staged: &mut Staged, word: Word) {
    match word {
        Word::Literal(literal) => {
            staged.words.insert(literal.clone());
            staged.literals.insert(literal);
        }
        Word::Pattern(pattern) => {
            staged.words.insert(pattern.clone());
            staged.patterns.insert(pattern);
        }
    }
}

fn unstage(staged: &mut Staged, word: &Word) -> bool {
    let removed = match word {
        Word::Literal(literal) => staged.literals.shift_remove(literal),
        Word::Pattern(pattern) => staged.patterns.shift_remove(pattern),
    };
    if removed {
        staged.words.shift_remove(word.as_str());
    }
    removed
}

impl Drop for WordPolicy {
    fn drop(&mut self) {
        self.context.patterns().remove_owner(self.id);
    }
}

impl fmt::Debug for WordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPolicy")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("direction", &self.direction)
            .field("replace_mode", &self.replace_mode)
            .field("group_replace", &self.group_replace)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
