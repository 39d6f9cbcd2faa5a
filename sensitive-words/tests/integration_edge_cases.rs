//! Edge cases: whitespace skipping, empty input, option validation, files and
//! guarded properties.

use std::{io::Write, time::Duration};

use sensitive_words::{
    trie::{MatchOptions, Trie},
    Context, Direction, Error, GroupReplace, HomophoneContexts, ReplaceMode, Request, Resolver,
    WhitespaceOptions, WordPolicy,
};

fn policy(words: &str) -> WordPolicy {
    let policy = WordPolicy::new(&Context::default());
    policy.add_words(words);
    policy.build().unwrap();
    policy
}

#[test]
fn test_trie_longest_and_shortest() {
    let words = [
        "ABD", "abde", "ABCGH", "A", "AB", "ABC", "BCD", "E", "EF", "AD", "ADF", "AE", "JLB",
        "JBLL", "JLFD", "JLFDE", "JLFB", "JLFBA", "JLFBD", "CO",
    ];
    let trie = Trie::build(words, false);
    let mut listed = trie.words();
    listed.sort();
    let mut expected: Vec<String> = words.iter().map(ToString::to_string).collect();
    expected.sort();
    assert_eq!(listed, expected);

    let wrap = |matched: &str| format!("({matched})");
    let longest = MatchOptions::default();
    let shortest = MatchOptions {
        longest_match: false,
        ..MatchOptions::default()
    };
    assert_eq!(
        trie.replace_with("KABCOOJLFDEEF", longest, wrap).unwrap(),
        "K(ABC)OO(JLFDE)(EF)"
    );
    assert_eq!(
        trie.replace_with("KABCOOJLFDEEF", shortest, wrap).unwrap(),
        "K(A)B(CO)O(JLFD)(E)(E)F"
    );
}

#[test]
fn test_whitespace_skipping() {
    let skipping = policy("老二|狗屁|狗屁专家").with_whitespace(WhitespaceOptions::SKIP_ALL);
    let text = "他家老大对老  二说狗屁\r\n专家KJHGO";
    assert_eq!(skipping.replace(text, None).unwrap(), "他家老大对****说******KJHGO");

    let strict = policy("老二|狗屁|狗屁专家");
    assert_eq!(strict.replace(text, None).unwrap(), "他家老大对老  二说**\r\n专家KJHGO");

    let spaces_only = policy("DEF").with_whitespace(WhitespaceOptions::SKIP_SPACE);
    assert_eq!(spaces_only.replace("D  EF", None).unwrap(), "*****");
    assert_eq!(spaces_only.replace("D \nEF", None).unwrap(), "D \nEF");
    // A word never starts on skipped whitespace.
    assert_eq!(spaces_only.replace(" DEF", None).unwrap(), " ***");
}

#[test]
fn test_whitespace_inside_a_dictionary_word() {
    let trie = Trie::build(["D EF"], false);
    let skipping = MatchOptions {
        whitespace: WhitespaceOptions::SKIP_ALL,
        ..MatchOptions::default()
    };
    for text in ["D EF", "D  EF", "D \nEF"] {
        let found = trie.matches(text, skipping).unwrap();
        assert_eq!(found.values().collect::<Vec<_>>(), vec![text]);
    }
    let strict = trie.matches("D  EF", MatchOptions::default()).unwrap();
    assert!(strict.is_empty());

    let policy = WordPolicy::new(&Context::default()).with_whitespace(WhitespaceOptions::SKIP_ALL);
    policy.add_words(r"D\ EF");
    policy.build().unwrap();
    assert_eq!(policy.words(), vec!["D EF"]);
    assert_eq!(policy.replace("D  EF", None).unwrap(), "*****");
    assert_eq!(policy.replace("x D \nEF", None).unwrap(), "x *****");
}

#[test]
fn test_empty_inputs() {
    let policy = policy(r"abc|\d+");
    assert_eq!(policy.replace("", None).unwrap(), "");
    assert!(!policy.is_match("", None).unwrap());
    assert!(!policy.matches("", None).unwrap().is_match());

    let resolver = Resolver::new(Context::default()).unwrap();
    assert_eq!(resolver.desensitize_text("abc", &Request::default()).unwrap(), "abc");
    assert!(!resolver
        .contains_sensitive(&Vec::<String>::new(), &Request::default())
        .unwrap());
}

#[test]
fn test_empty_mask_deletes_and_multi_char_mask_is_verbatim() {
    let delete = policy("bad").with_mask("");
    assert_eq!(delete.replace("a bad day", None).unwrap(), "a  day");

    let verbatim = policy("bad|terrible").with_mask("[x]");
    assert_eq!(
        verbatim.replace("bad and terrible", None).unwrap(),
        "[x] and [x]"
    );
}

#[test]
fn test_group_only_skips_groups_that_did_not_participate() {
    let policy = WordPolicy::new(&Context::default()).with_group_replace(GroupReplace::GroupOnly);
    policy.add_patterns(r"id=(\d+)|name=(\w+)");
    policy.build().unwrap();
    assert_eq!(
        policy.replace("id=42 name=bob", None).unwrap(),
        "id=** name=***"
    );

    let whole = WordPolicy::new(&Context::default()).with_group_replace(GroupReplace::GroupOnly);
    whole.add_patterns(r"\d{3}");
    whole.build().unwrap();
    // Without groups there is nothing to replace.
    assert_eq!(whole.replace("123", None).unwrap(), "123");
}

#[test]
fn test_two_groups_in_one_match() {
    for mode in [GroupReplace::GroupOnly, GroupReplace::GroupPriority] {
        let policy = WordPolicy::new(&Context::default()).with_group_replace(mode);
        policy.add_patterns(r"(\d{3})-(\d{4})");
        policy.build().unwrap();
        assert_eq!(policy.replace("010-3344", None).unwrap(), "***-****");
        assert_eq!(policy.replace("tel 010-3344.", None).unwrap(), "tel ***-****.");
    }
}

#[test]
fn test_option_bits_are_validated() {
    assert!(matches!(
        Direction::try_from(0),
        Err(Error::InvalidArgument { .. })
    ));
    assert!(Direction::try_from(9).is_err());
    assert!(ReplaceMode::try_from(3).is_err());
    assert_eq!(ReplaceMode::try_from(8).unwrap(), ReplaceMode::Homophone);
    assert!(GroupReplace::try_from(0).is_err());
    assert!(WhitespaceOptions::try_from(16).is_err());
    assert!(Request::try_from_bits(0x80).is_err());
}

#[test]
fn test_guarded_properties() {
    let policy = WordPolicy::new(&Context::default());
    policy.add_patterns(r"\d+");
    let err = policy
        .with_pattern_timeout(Some(Duration::from_millis(5)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            property: "pattern_timeout"
        }
    ));
}

#[test]
fn test_missing_files() {
    let policy = WordPolicy::new(&Context::default());
    assert!(matches!(
        policy.add_words_file("/no/such/file.txt"),
        Err(Error::NotFound { .. })
    ));
    assert!(policy.words().is_empty());

    let contexts = HomophoneContexts::new();
    assert!(matches!(
        contexts.add_file("/no/such/homophones.txt"),
        Err(Error::NotFound { .. })
    ));
    assert!(contexts.is_empty());
}

#[test]
fn test_malformed_homophone_file_keeps_earlier_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "hang 一行|银行|行当").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "xing").unwrap();
    writeln!(file, "ti 菩提|提问").unwrap();

    let contexts = HomophoneContexts::new();
    match contexts.add_file(file.path()) {
        Err(Error::Malformed { line, content, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(content, "xing");
        }
        other => panic!("expected Malformed, got {other:?}"),
    }
    assert!(contexts.get("HANG").is_some());
    assert!(contexts.get("ti").is_none());
}

#[test]
fn test_invalid_pattern_fails_build() {
    let policy = WordPolicy::new(&Context::default());
    policy.add_patterns("(unclosed");
    assert!(matches!(policy.build(), Err(Error::Pattern { .. })));
}
