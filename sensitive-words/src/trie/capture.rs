//! Match spans over a source text and offset-safe replacement.

use std::borrow::Cow;

/// One matched span: a byte offset and byte length into the source text.
///
/// Both bounds lie on `char` boundaries of the text the capture came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capture {
    start: usize,
    len: usize,
}

impl Capture {
    pub(crate) const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            len: end - start,
        }
    }

    /// Byte offset of the first matched character.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last matched character.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length span.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The captures found in one text, ascending and non-overlapping.
///
/// The set keeps (or borrows) the text it was matched against so capture
/// values resolve lazily; [`CaptureSet::into_owned`] detaches it from the
/// caller's buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureSet<'t> {
    source: Cow<'t, str>,
    captures: Vec<Capture>,
}

impl<'t> CaptureSet<'t> {
    pub(crate) fn new(source: impl Into<Cow<'t, str>>, captures: Vec<Capture>) -> Self {
        let set = Self {
            source: source.into(),
            captures,
        };
        debug_assert!(set
            .captures
            .windows(2)
            .all(|pair| pair[0].end() <= pair[1].start()));
        set
    }

    /// The text the captures index into.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The captured spans in ascending order.
    #[must_use]
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Returns `true` when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// The matched substring of `capture`.
    #[must_use]
    pub fn value(&self, capture: &Capture) -> &str {
        &self.source[capture.start()..capture.end()]
    }

    /// Matched substrings in order.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.captures.iter().map(|capture| self.value(capture))
    }

    /// Rewrites every captured span with `evaluator` and returns the new text.
    ///
    /// Text outside the spans is preserved byte for byte. Spans whose
    /// replacement equals the original are left untouched.
    pub fn replace<F>(&self, mut evaluator: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        if self.captures.is_empty() {
            return self.source.to_string();
        }

        let mut output = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for capture in &self.captures {
            output.push_str(&self.source[cursor..capture.start()]);
            let original = self.value(capture);
            let replacement = evaluator(original);
            if replacement == original {
                output.push_str(original);
            } else {
                output.push_str(&replacement);
            }
            cursor = capture.end();
        }
        output.push_str(&self.source[cursor..]);
        output
    }

    /// Detaches the set from the buffer it borrowed.
    #[must_use]
    pub fn into_owned(self) -> CaptureSet<'static> {
        CaptureSet {
            source: Cow::Owned(self.source.into_owned()),
            captures: self.captures,
        }
    }
}
