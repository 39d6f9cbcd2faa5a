//! Context patterns that pick a reading for polyphonic characters.

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use parking_lot::Mutex;
use regex::Regex;

use crate::error::{read_to_string, Error, Result};

/// Reading → pattern of the two-character words that use that reading.
///
/// `hang → 一行|银行|行当` says `行` reads `hang` when it forms one of those
/// words with its neighbour. Keys are case-insensitive; registering a key
/// again replaces its pattern.
#[derive(Default)]
pub struct HomophoneContexts {
    patterns: DashMap<String, Regex>,
    loaded: Mutex<HashSet<PathBuf>>,
}

impl HomophoneContexts {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the context pattern for `reading`.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] when `pattern` does not compile.
    pub fn add(&self, reading: &str, pattern: &str) -> Result<&Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.insert(normalize(reading), regex);
        Ok(self)
    }

    /// Registers every `(reading, pattern)` pair in order.
    ///
    /// # Errors
    ///
    /// Stops at the first pattern that fails to compile; earlier pairs stay
    /// registered.
    pub fn add_all<I, K, P>(&self, pairs: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: AsRef<str>,
    {
        for (reading, pattern) in pairs {
            self.add(reading.as_ref(), pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Loads `<reading> <pattern>` lines from a UTF-8 file.
    ///
    /// Each path is read at most once; loading it again after a success is
    /// a no-op. A file that failed can be fixed and loaded again.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the file is missing (nothing is registered),
    /// [`Error::Malformed`] for a non-blank line without exactly two fields
    /// (lines before it stay registered).
    pub fn add_file(&self, path: impl AsRef<Path>) -> Result<&Self> {
        let path = path.as_ref();
        if self.loaded.lock().contains(path) {
            return Ok(self);
        }
        let contents = read_to_string(path)?;

        for (index, line) in contents.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                [reading, pattern] => {
                    self.add(reading, pattern)?;
                }
                _ => {
                    return Err(Error::Malformed {
                        path: path.to_path_buf(),
                        line: index + 1,
                        content: line.to_string(),
                    });
                }
            }
        }
        self.loaded.lock().insert(path.to_path_buf());
        tracing::debug!(path = %path.display(), contexts = self.len(), "loaded homophone contexts");
        Ok(self)
    }

    /// The context pattern for `reading`.
    #[must_use]
    pub fn get(&self, reading: &str) -> Option<Regex> {
        self.patterns
            .get(&normalize(reading))
            .map(|entry| entry.value().clone())
    }

    /// Removes the pattern for `reading`. Returns `true` when one existed.
    pub fn remove(&self, reading: &str) -> bool {
        self.patterns.remove(&normalize(reading)).is_some()
    }

    /// Drops every pattern and forgets loaded paths.
    pub fn clear(&self) {
        self.patterns.clear();
        self.loaded.lock().clear();
    }

    /// Number of registered readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Debug for HomophoneContexts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomophoneContexts")
            .field("readings", &self.patterns.len())
            .finish_non_exhaustive()
    }
}

fn normalize(reading: &str) -> String {
    reading.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn keys_ignore_case_and_later_wins() {
        let contexts = HomophoneContexts::new();
        contexts.add("hang", "一行").unwrap();
        contexts.add("HANG", "银行|行当").unwrap();
        assert_eq!(contexts.len(), 1);
        let pattern = contexts.get("Hang").unwrap();
        assert!(pattern.is_match("银行"));
        assert!(!pattern.is_match("一行"));
    }

    #[test]
    fn file_is_loaded_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hang 一行|银行|行当").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "xing 不行|行不").unwrap();

        let contexts = HomophoneContexts::new();
        contexts.add_file(file.path()).unwrap();
        assert_eq!(contexts.len(), 2);

        contexts.remove("xing");
        contexts.add_file(file.path()).unwrap();
        assert_eq!(contexts.len(), 1);
    }

    #[test]
    fn malformed_line_keeps_earlier_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ti 菩提|提问").unwrap();
        writeln!(file, "hang 一行 extra").unwrap();
        writeln!(file, "xing 不行").unwrap();

        let contexts = HomophoneContexts::new();
        let err = contexts.add_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }));
        assert!(contexts.get("ti").is_some());
        assert!(contexts.get("xing").is_none());
    }

    #[test]
    fn fixed_file_loads_after_a_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hang 一行").unwrap();
        writeln!(file, "bad").unwrap();

        let contexts = HomophoneContexts::new();
        let err = contexts.add_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }));
        assert!(contexts.get("hang").is_some());

        std::fs::write(file.path(), "hang 一行\nti 菩提\n").unwrap();
        contexts.add_file(file.path()).unwrap();
        assert!(contexts.get("ti").is_some());
    }

    #[test]
    fn missing_file_registers_nothing() {
        let contexts = HomophoneContexts::new();
        let err = contexts.add_file("/no/such/homophones.txt").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(contexts.is_empty());
    }
}
