//! Text → pinyin, initials and same-sound substitution.

use std::{fmt, sync::Arc};

use super::{
    homophone::HomophoneContexts,
    table::{PhoneticTable, StaticPhoneticTable},
};

/// Pronunciation of one character after disambiguation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinYinInfo {
    /// The source character.
    pub ch: char,
    /// The chosen reading, `None` for characters the table does not know.
    pub pinyin: Option<String>,
    /// Other characters with the chosen reading, excluding `ch`.
    pub homophones: Vec<char>,
}

impl PinYinInfo {
    /// First letter of the chosen reading.
    #[must_use]
    pub fn jianpin(&self) -> Option<char> {
        self.pinyin.as_deref().and_then(|pinyin| pinyin.chars().next())
    }
}

/// Per-character pronunciations of a text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pronunciation {
    infos: Vec<PinYinInfo>,
}

impl Pronunciation {
    /// Per-character details.
    #[must_use]
    pub fn infos(&self) -> &[PinYinInfo] {
        &self.infos
    }

    /// The source text.
    #[must_use]
    pub fn chars(&self) -> String {
        self.infos.iter().map(|info| info.ch).collect()
    }

    /// Concatenated readings; unknown characters are kept.
    #[must_use]
    pub fn pinyin(&self) -> String {
        let mut out = String::new();
        for info in &self.infos {
            match &info.pinyin {
                Some(pinyin) => out.push_str(pinyin),
                None => out.push(info.ch),
            }
        }
        out
    }

    /// First letter of each reading; unknown characters are kept.
    #[must_use]
    pub fn jianpin(&self) -> String {
        self.infos
            .iter()
            .map(|info| info.jianpin().unwrap_or(info.ch))
            .collect()
    }

    /// Each character swapped for its first homophone, or kept when it has none.
    #[must_use]
    pub fn homophone(&self) -> String {
        self.infos
            .iter()
            .map(|info| info.homophones.first().copied().unwrap_or(info.ch))
            .collect()
    }
}

/// A phonetic table with its homophone context registry.
#[derive(Clone)]
pub struct Phonetics {
    table: Arc<dyn PhoneticTable>,
    contexts: Arc<HomophoneContexts>,
}

impl Phonetics {
    /// Wraps `table` with an empty context registry.
    pub fn new(table: impl PhoneticTable + 'static) -> Self {
        Self {
            table: Arc::new(table),
            contexts: Arc::new(HomophoneContexts::new()),
        }
    }

    /// Shares an existing table.
    #[must_use]
    pub fn from_shared(table: Arc<dyn PhoneticTable>) -> Self {
        Self {
            table,
            contexts: Arc::new(HomophoneContexts::new()),
        }
    }

    /// The context registry used to pick readings for polyphonic characters.
    #[must_use]
    pub fn contexts(&self) -> &HomophoneContexts {
        &self.contexts
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &dyn PhoneticTable {
        self.table.as_ref()
    }

    /// Resolves the pronunciation of every character in `text`.
    ///
    /// A character with several readings takes the first reading whose
    /// context pattern matches it together with its predecessor or its
    /// successor; without a matching context it takes its first reading.
    #[must_use]
    pub fn describe(&self, text: &str) -> Pronunciation {
        let chars: Vec<char> = text.chars().collect();
        let infos = chars
            .iter()
            .enumerate()
            .map(|(index, &ch)| {
                let readings = self.table.readings(ch);
                let Some(first) = readings.first() else {
                    return PinYinInfo {
                        ch,
                        pinyin: None,
                        homophones: Vec::new(),
                    };
                };
                let chosen = if readings.len() > 1 && !self.contexts.is_empty() {
                    self.pick_reading(&chars, index, &readings)
                        .unwrap_or(first)
                        .clone()
                } else {
                    first.clone()
                };
                let homophones = self
                    .table
                    .homophones(&chosen)
                    .into_iter()
                    .filter(|&other| other != ch)
                    .collect();
                PinYinInfo {
                    ch,
                    pinyin: Some(chosen),
                    homophones,
                }
            })
            .collect();
        Pronunciation { infos }
    }

    fn pick_reading<'r>(&self, chars: &[char], index: usize, readings: &'r [String]) -> Option<&'r String> {
        let ch = chars[index];
        let before = index
            .checked_sub(1)
            .map(|prev| chars[prev])
            .filter(|&prev| self.table.is_known(prev))
            .map(|prev| format!("{prev}{ch}"));
        let after = chars
            .get(index + 1)
            .copied()
            .filter(|&next| self.table.is_known(next))
            .map(|next| format!("{ch}{next}"));

        readings.iter().find(|reading| {
            self.contexts.get(reading).is_some_and(|pattern| {
                before.as_deref().is_some_and(|pair| pattern.is_match(pair))
                    || after.as_deref().is_some_and(|pair| pattern.is_match(pair))
            })
        })
    }

    /// Full toneless pinyin: `尘埃` → `chenai`.
    #[must_use]
    pub fn to_pinyin(&self, text: &str) -> String {
        self.describe(text).pinyin()
    }

    /// Initials: `菩提` → `pt`.
    #[must_use]
    pub fn to_jianpin(&self, text: &str) -> String {
        self.describe(text).jianpin()
    }

    /// Same-sound substitution: `终身` → `中伸`.
    #[must_use]
    pub fn to_homophone(&self, text: &str) -> String {
        self.describe(text).homophone()
    }
}

impl Default for Phonetics {
    fn default() -> Self {
        Self::new(StaticPhoneticTable::new())
    }
}

impl fmt::Debug for Phonetics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phonetics")
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phonetics() -> Phonetics {
        Phonetics::new(
            StaticPhoneticTable::new()
                .with_char('终', &["zhong"])
                .with_char('中', &["zhong"])
                .with_char('钟', &["zhong"])
                .with_char('身', &["shen"])
                .with_char('伸', &["shen"])
                .with_char('菩', &["pu"])
                .with_char('提', &["di", "ti"])
                .with_char('题', &["ti"])
                .with_char('尘', &["chen"])
                .with_char('埃', &["ai"]),
        )
    }

    #[test]
    fn conversions() {
        let phonetics = phonetics();
        assert_eq!(phonetics.to_pinyin("尘埃!"), "chenai!");
        assert_eq!(phonetics.to_homophone("终身"), "中伸");
        assert_eq!(phonetics.to_homophone("x埃"), "x埃");
    }

    #[test]
    fn polyphone_defaults_to_first_reading() {
        let phonetics = phonetics();
        assert_eq!(phonetics.to_jianpin("菩提"), "pd");
    }

    #[test]
    fn context_pattern_selects_reading() {
        let phonetics = phonetics();
        phonetics.contexts().add("ti", "菩提|提问").unwrap();
        assert_eq!(phonetics.to_jianpin("菩提"), "pt");
        assert_eq!(phonetics.to_homophone("菩提"), "菩题");

        let alone = phonetics.describe("提");
        assert_eq!(alone.infos()[0].pinyin.as_deref(), Some("di"));
        assert_eq!(alone.chars(), "提");
    }
}
