//! Property tests for the trie scanner and policy replacement.

use std::collections::BTreeSet;

use proptest::prelude::*;
use sensitive_words::{
    trie::{MatchOptions, Trie},
    Context, WhitespaceOptions, WordPolicy,
};

/// Short words over a small alphabet so random texts hit them often.
fn word_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::sample::select(vec!['a', 'b', 'c', '中', '文']), 1..5)
        .prop_map(|chars| chars.into_iter().collect())
}

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop::sample::select(vec!['a', 'b', 'c', 'x', ' ', '中', '文', '\n']),
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_trie_lists_its_dictionary(words in proptest::collection::btree_set(word_strategy(), 0..16)) {
        let trie = Trie::build(&words, false);
        let listed: BTreeSet<String> = trie.words().into_iter().collect();
        prop_assert_eq!(&listed, &words);
        prop_assert_eq!(trie.word_count(), words.len());
        for word in &words {
            prop_assert!(trie.contains(word));
        }
    }

    #[test]
    fn prop_captures_are_ascending_and_in_dictionary(
        words in proptest::collection::btree_set(word_strategy(), 1..8),
        text in text_strategy(),
        longest_match in any::<bool>(),
    ) {
        let trie = Trie::build(&words, false);
        let options = MatchOptions { longest_match, ..MatchOptions::default() };
        let found = trie.matches(&text, options).unwrap();

        let mut cursor = 0;
        for capture in found.captures() {
            prop_assert!(!capture.is_empty());
            prop_assert!(capture.start() >= cursor);
            cursor = capture.end();
            prop_assert!(words.contains(found.value(capture)));
        }
        prop_assert_eq!(trie.is_match(&text, options).unwrap(), !found.is_empty());
    }

    #[test]
    fn prop_replacement_preserves_text_outside_spans(
        words in proptest::collection::btree_set(word_strategy(), 1..8),
        text in text_strategy(),
        skip_whitespace in any::<bool>(),
    ) {
        let whitespace = if skip_whitespace { WhitespaceOptions::SKIP_ALL } else { WhitespaceOptions::NONE };
        let trie = Trie::build(&words, false);
        let options = MatchOptions { whitespace, ..MatchOptions::default() };
        let found = trie.matches(&text, options).unwrap();
        let replaced = found.replace(|value| "#".repeat(value.chars().count()));

        prop_assert_eq!(replaced.chars().count(), text.chars().count());
        let mut cursor = 0;
        let mut expected = String::new();
        for capture in found.captures() {
            expected.push_str(&text[cursor..capture.start()]);
            expected.push_str(&"#".repeat(found.value(capture).chars().count()));
            cursor = capture.end();
        }
        expected.push_str(&text[cursor..]);
        prop_assert_eq!(replaced, expected);
    }

    #[test]
    fn prop_policy_mask_keeps_char_count(
        words in proptest::collection::btree_set(word_strategy(), 1..8),
        text in text_strategy(),
    ) {
        let policy = WordPolicy::new(&Context::default());
        for word in &words {
            policy.add_words(word);
        }
        policy.build().unwrap();

        let replaced = policy.replace(&text, None).unwrap();
        prop_assert_eq!(replaced.chars().count(), text.chars().count());
        // Masking is idempotent once every word is gone.
        prop_assert_eq!(policy.replace(&replaced, None).unwrap(), replaced.clone());
        prop_assert_eq!(policy.is_match(&text, None).unwrap(), replaced != text);
    }
}
