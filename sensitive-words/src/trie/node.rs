//! Arena-backed character trie.

use std::collections::HashMap;

pub(super) const ROOT: usize = 0;

#[derive(Clone, Debug, Default)]
pub(super) struct TrieNode {
    /// Character as first inserted; lookups go through the folded key.
    pub(super) ch: char,
    pub(super) end: bool,
    pub(super) children: HashMap<char, usize>,
}

/// A dictionary of literal words, shared by prefix.
///
/// Built once from a word set and immutable afterwards. Nodes live in a flat
/// arena so matching and reconstruction never recurse.
#[derive(Clone, Debug)]
pub struct Trie {
    pub(super) nodes: Vec<TrieNode>,
    pub(super) ignore_case: bool,
    word_count: usize,
}

impl Trie {
    /// Builds a trie from `words`. Empty words are ignored.
    ///
    /// With `ignore_case` set, children are unique per lowercase form and
    /// lookups fold the probe character the same way.
    pub fn build<I, S>(words: I, ignore_case: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
            ignore_case,
            word_count: 0,
        };
        for word in words {
            trie.insert(word.as_ref());
        }
        trie
    }

    fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut node = ROOT;
        for ch in word.chars() {
            let key = self.fold(ch);
            node = if let Some(&child) = self.nodes[node].children.get(&key) {
                child
            } else {
                let child = self.nodes.len();
                self.nodes.push(TrieNode {
                    ch,
                    ..TrieNode::default()
                });
                self.nodes[node].children.insert(key, child);
                child
            };
        }
        if !self.nodes[node].end {
            self.nodes[node].end = true;
            self.word_count += 1;
        }
    }

    pub(super) fn fold(&self, ch: char) -> char {
        if !self.ignore_case {
            return ch;
        }
        let mut lower = ch.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(single), None) => single,
            _ => ch,
        }
    }

    pub(super) fn child(&self, node: usize, ch: char) -> Option<usize> {
        self.nodes[node].children.get(&self.fold(ch)).copied()
    }

    /// Number of distinct words.
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Returns `true` when the trie holds no words.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Whether lookups ignore case.
    #[must_use]
    pub const fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Returns `true` when `word` is in the dictionary under the trie's case rule.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        let mut node = ROOT;
        for ch in word.chars() {
            match self.child(node, ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node != ROOT && self.nodes[node].end
    }

    /// Reconstructs the dictionary, spelled as each word was first inserted.
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.word_count);
        let mut stack: Vec<(usize, String)> = vec![(ROOT, String::new())];
        while let Some((node, prefix)) = stack.pop() {
            for &child in self.nodes[node].children.values() {
                let mut word = prefix.clone();
                word.push(self.nodes[child].ch);
                if self.nodes[child].end {
                    words.push(word.clone());
                }
                if !self.nodes[child].children.is_empty() {
                    stack.push((child, word));
                }
            }
        }
        words
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::build(std::iter::empty::<&str>(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_prefixes_keep_children() {
        let trie = Trie::build(["ABC", "AB", "ABCGH"], false);
        assert_eq!(trie.word_count(), 3);
        assert!(trie.contains("AB"));
        assert!(trie.contains("ABC"));
        assert!(!trie.contains("ABCG"));
        assert!(!trie.contains(""));
    }

    #[test]
    fn ignore_case_merges_children() {
        let trie = Trie::build(["ABD", "abde"], true);
        assert_eq!(trie.word_count(), 2);
        assert!(trie.contains("abd"));
        assert!(trie.contains("ABDE"));

        let mut words = trie.words();
        words.sort();
        assert_eq!(words, vec!["ABD", "ABDe"]);
    }

    #[test]
    fn case_sensitive_keeps_distinct_children() {
        let trie = Trie::build(["ABD", "abd"], false);
        assert_eq!(trie.word_count(), 2);
        assert!(!trie.contains("Abd"));
    }

    #[test]
    fn duplicate_words_count_once() {
        let trie = Trie::build(["终身", "终身", ""], false);
        assert_eq!(trie.word_count(), 1);
        assert_eq!(trie.words(), vec!["终身"]);
    }
}
