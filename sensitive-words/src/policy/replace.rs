//! Rewriting matched spans.

use std::ops::Range;

use crate::{
    options::{GroupReplace, ReplaceMode},
    pattern::PatternMatch,
    phonetic::Phonetics,
};

/// Turns one matched span into its replacement.
#[derive(Debug)]
pub(crate) struct Replacer<'p> {
    pub(crate) mode: ReplaceMode,
    pub(crate) mask: &'p str,
    pub(crate) replace_single: bool,
    pub(crate) phonetics: &'p Phonetics,
}

impl Replacer<'_> {
    pub(crate) fn evaluate(&self, matched: &str) -> String {
        match self.mode {
            ReplaceMode::Character => mask(self.mask, self.replace_single, matched),
            ReplaceMode::PinYin => self.phonetics.to_pinyin(matched),
            ReplaceMode::JianPin => self.phonetics.to_jianpin(matched),
            ReplaceMode::Homophone => self.phonetics.to_homophone(matched),
        }
    }

    /// Edits for one pattern match under `group` rules.
    pub(crate) fn pattern_edits(
        &self,
        found: &PatternMatch,
        group: GroupReplace,
    ) -> Vec<(Range<usize>, String)> {
        match group {
            GroupReplace::Default => self.whole(found),
            GroupReplace::GroupOnly => self.groups(found),
            GroupReplace::GroupPriority if found.has_groups() => self.groups(found),
            GroupReplace::GroupPriority => self.whole(found),
        }
    }

    fn whole(&self, found: &PatternMatch) -> Vec<(Range<usize>, String)> {
        vec![(found.start..found.end, self.evaluate(&found.value))]
    }

    fn groups(&self, found: &PatternMatch) -> Vec<(Range<usize>, String)> {
        let mut edits = Vec::new();
        let mut covered = found.start;
        for span in found.groups.iter().flatten() {
            // nested or overlapping with an earlier group
            if span.start < covered || span.is_empty() {
                continue;
            }
            let local = span.start - found.start..span.end - found.start;
            edits.push((span.clone(), self.evaluate(&found.value[local])));
            covered = span.end;
        }
        edits
    }
}

/// Character masking.
///
/// An empty mask deletes the span; a multi-character mask, or any mask with
/// `replace_single`, stands in for the whole span; a single character is
/// repeated once per matched character.
pub(crate) fn mask(mask: &str, replace_single: bool, matched: &str) -> String {
    let mut chars = mask.chars();
    match (chars.next(), chars.next()) {
        (None, _) => String::new(),
        (Some(single), None) if !replace_single => {
            String::from(single).repeat(matched.chars().count())
        }
        _ => mask.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn single_char_mask_pads_to_char_count() {
        assert_eq!(mask("*", false, "特价"), "**");
        assert_eq!(mask("?", false, "NM"), "??");
        assert_eq!(mask("*", false, "老  二"), "****");
    }

    #[test]
    fn multi_char_or_single_mask_is_verbatim() {
        assert_eq!(mask("[x]", false, "abcdef"), "[x]");
        assert_eq!(mask("D", true, "{{Value}}"), "D");
    }

    #[test]
    fn empty_mask_deletes() {
        assert_eq!(mask("", false, "abc"), "");
        assert_eq!(mask("", true, "abc"), "");
    }

    fn phone_match() -> PatternMatch {
        // 13623332333 with (\d{4}) capturing 2333 at 3..7
        PatternMatch {
            pattern: Arc::from("p"),
            start: 0,
            end: 11,
            value: "13623332333".to_string(),
            groups: vec![Some(3..7)],
        }
    }

    fn star_replacer(phonetics: &Phonetics) -> Replacer<'_> {
        Replacer {
            mode: ReplaceMode::Character,
            mask: "*",
            replace_single: false,
            phonetics,
        }
    }

    #[test]
    fn group_modes() {
        let phonetics = Phonetics::default();
        let replacer = star_replacer(&phonetics);
        let found = phone_match();

        assert_eq!(
            replacer.pattern_edits(&found, GroupReplace::Default),
            vec![(0..11, "*".repeat(11))]
        );
        assert_eq!(
            replacer.pattern_edits(&found, GroupReplace::GroupOnly),
            vec![(3..7, "****".to_string())]
        );
        assert_eq!(
            replacer.pattern_edits(&found, GroupReplace::GroupPriority),
            vec![(3..7, "****".to_string())]
        );
    }

    #[test]
    fn group_priority_without_participating_groups_masks_whole() {
        let phonetics = Phonetics::default();
        let replacer = star_replacer(&phonetics);
        let mut found = phone_match();
        found.groups = vec![None];

        assert_eq!(
            replacer.pattern_edits(&found, GroupReplace::GroupPriority),
            vec![(0..11, "*".repeat(11))]
        );
        assert!(replacer
            .pattern_edits(&found, GroupReplace::GroupOnly)
            .is_empty());
    }

    #[test]
    fn nested_groups_after_the_first_are_skipped() {
        let phonetics = Phonetics::default();
        let replacer = star_replacer(&phonetics);
        let mut found = phone_match();
        found.groups = vec![Some(2..8), Some(3..5), Some(9..11)];

        assert_eq!(
            replacer.pattern_edits(&found, GroupReplace::GroupOnly),
            vec![(2..8, "******".to_string()), (9..11, "**".to_string())]
        );
    }
}
