//! Splitting bulk word strings and telling literal words from patterns.

/// Characters that make an unescaped token a regular expression.
pub const METACHARACTERS: [char; 13] = [
    '\\', '*', '+', '?', '|', '{', '[', '(', ')', '^', '$', '.', '#',
];

/// A classified word token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Word {
    /// Plain text for the trie, with escapes removed.
    Literal(String),
    /// A regular expression, kept verbatim.
    Pattern(String),
}

impl Word {
    /// Classifies a single token.
    ///
    /// A token is a pattern when it holds an unescaped metacharacter or
    /// whitespace, or a backslash before an ordinary character (`\d`).
    /// Otherwise it is a literal and escaped metacharacters lose their
    /// backslash: `\{\{Value\}\}` is the literal `{{Value}}`.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        let mut literal = String::with_capacity(token.len());
        let mut chars = token.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some(escaped) if is_meta(escaped) => literal.push(escaped),
                    _ => return Self::Pattern(token.to_string()),
                }
            } else if is_meta(ch) {
                return Self::Pattern(token.to_string());
            } else {
                literal.push(ch);
            }
        }
        Self::Literal(literal)
    }

    /// The stored form of the word.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(word) | Self::Pattern(word) => word,
        }
    }
}

fn is_meta(ch: char) -> bool {
    METACHARACTERS.contains(&ch) || ch.is_whitespace()
}

/// Splits a bulk word string on `|`.
///
/// Only unescaped bars outside `()`, `[]` and `{}` separate tokens, so
/// `(a|b)c|d` yields `(a|b)c` and `d`. Empty tokens are dropped.
pub fn split_words(words: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth: isize = 0;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in words.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '|' if depth == 0 => {
                if index > start {
                    tokens.push(&words[start..index]);
                }
                start = index + 1;
            }
            _ => {}
        }
    }
    if start < words.len() {
        tokens.push(&words[start..]);
    }
    tokens
}

/// Splits a word file: one or more `|`-separated tokens per line.
pub fn split_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .flat_map(split_words)
}
