//! Character ↔ pronunciation lookup.

use std::collections::HashMap;

/// Pronunciation data for Chinese characters.
///
/// Readings are toneless lowercase pinyin (`"zhong"`), ordered with the most
/// common reading first. Characters outside the table have no readings.
pub trait PhoneticTable: Send + Sync {
    /// Ordered readings of `ch`; empty when `ch` is not a known character.
    fn readings(&self, ch: char) -> Vec<String>;

    /// Characters pronounced `reading`, in table order.
    fn homophones(&self, reading: &str) -> Vec<char>;

    /// Returns `true` when the table knows `ch`.
    fn is_known(&self, ch: char) -> bool {
        !self.readings(ch).is_empty()
    }
}

/// In-memory [`PhoneticTable`].
///
/// The homophone index is derived from the character entries: every
/// character lists itself under each of its readings, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct StaticPhoneticTable {
    readings: HashMap<char, Vec<String>>,
    homophones: HashMap<String, Vec<char>>,
}

impl StaticPhoneticTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `ch` with its ordered readings.
    #[must_use]
    pub fn with_char(mut self, ch: char, readings: &[&str]) -> Self {
        self.insert(ch, readings.iter().copied());
        self
    }

    /// Adds `ch` with its ordered readings, appending to any already known.
    pub fn insert<I, S>(&mut self, ch: char, readings: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for reading in readings {
            let reading = reading.as_ref().trim().to_lowercase();
            if reading.is_empty() {
                continue;
            }
            let known = self.readings.entry(ch).or_default();
            if known.contains(&reading) {
                continue;
            }
            known.push(reading.clone());
            self.homophones.entry(reading).or_default().push(ch);
        }
    }

    /// Parses lines of `<char> <reading> [<reading>...]`.
    ///
    /// Blank lines and lines whose first field is not a single character are
    /// skipped.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut table = Self::new();
        for line in contents.lines() {
            let mut fields = line.split_whitespace();
            let Some(head) = fields.next() else {
                continue;
            };
            let mut chars = head.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                table.insert(ch, fields);
            }
        }
        table
    }

    /// Number of characters in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Returns `true` when the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl PhoneticTable for StaticPhoneticTable {
    fn readings(&self, ch: char) -> Vec<String> {
        self.readings.get(&ch).cloned().unwrap_or_default()
    }

    fn homophones(&self, reading: &str) -> Vec<char> {
        self.homophones
            .get(&reading.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    fn is_known(&self, ch: char) -> bool {
        self.readings.contains_key(&ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homophone_index_follows_insertion_order() {
        let table = StaticPhoneticTable::new()
            .with_char('终', &["zhong"])
            .with_char('中', &["zhong", "zhong"])
            .with_char('钟', &["Zhong"]);
        assert_eq!(table.homophones("zhong"), vec!['终', '中', '钟']);
        assert_eq!(table.readings('中'), vec!["zhong"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn parse_skips_malformed_heads() {
        let table = StaticPhoneticTable::parse("行 xing hang\n\nab x\n提 di ti\n");
        assert_eq!(table.readings('行'), vec!["xing", "hang"]);
        assert_eq!(table.readings('提'), vec!["di", "ti"]);
        assert!(!table.is_known('a'));
        assert_eq!(table.len(), 2);
    }
}
