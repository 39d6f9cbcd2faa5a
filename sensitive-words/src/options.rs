//! Option enums shared by policies and the resolver.
//!
//! Every type here can also be built from its raw bit value through
//! `TryFrom<u8>`; that conversion is the validation boundary for values coming
//! from configuration or foreign callers.

use std::{fmt, ops::BitOr};

use crate::error::{Error, Result};

/// Which traffic a policy applies to.
///
/// A bitmask: a policy applies to a request when the two masks intersect.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8"))]
pub struct Direction(u8);

impl Direction {
    /// Applies to calls that do not name a direction.
    pub const DEFAULT: Self = Self(1);
    /// Applies to inbound payloads.
    pub const INPUT: Self = Self(2);
    /// Applies to outbound payloads.
    pub const OUTPUT: Self = Self(4);
    /// Every direction.
    pub const ALL: Self = Self(1 | 2 | 4);

    /// Raw bit value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when the two masks share at least one direction.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for Direction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl TryFrom<u8> for Direction {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        if bits == 0 || bits & !Self::ALL.0 != 0 {
            return Err(Error::invalid_argument(
                "direction",
                format!("{bits:#05b} is outside the Default|Input|Output range"),
            ));
        }
        Ok(Self(bits))
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::DEFAULT) {
            names.push("DEFAULT");
        }
        if self.contains(Self::INPUT) {
            names.push("INPUT");
        }
        if self.contains(Self::OUTPUT) {
            names.push("OUTPUT");
        }
        write!(f, "Direction({})", names.join(" | "))
    }
}

/// How a matched span is rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReplaceMode {
    /// Mask with the policy's mask string.
    #[default]
    Character,
    /// Full toneless pinyin, e.g. `尘埃` → `chenai`.
    PinYin,
    /// First letter of each syllable, e.g. `菩提` → `pt`.
    JianPin,
    /// Same-sound substitution, e.g. `终身` → `中伸`.
    Homophone,
}

impl TryFrom<u8> for ReplaceMode {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::Character),
            2 => Ok(Self::PinYin),
            4 => Ok(Self::JianPin),
            8 => Ok(Self::Homophone),
            other => Err(Error::invalid_argument(
                "replace_mode",
                format!("{other} is not one of 1, 2, 4, 8"),
            )),
        }
    }
}

/// How pattern matches with capturing groups are rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GroupReplace {
    /// Rewrite the whole match.
    #[default]
    Default,
    /// Rewrite only the spans of participating groups.
    GroupOnly,
    /// `GroupOnly` when any group participated, `Default` otherwise.
    GroupPriority,
}

impl TryFrom<u8> for GroupReplace {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Self::Default),
            2 => Ok(Self::GroupOnly),
            4 => Ok(Self::GroupPriority),
            other => Err(Error::invalid_argument(
                "group_replace",
                format!("{other} is not one of 1, 2, 4"),
            )),
        }
    }
}

/// Characters the trie matcher may step over inside a word.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8"))]
pub struct WhitespaceOptions(u8);

impl WhitespaceOptions {
    /// Whitespace is matched literally.
    pub const NONE: Self = Self(1);
    /// Skip spaces, tabs and other non-newline whitespace.
    pub const SKIP_SPACE: Self = Self(2);
    /// Skip `\r` and `\n`.
    pub const SKIP_NEWLINE: Self = Self(4);
    /// Skip every kind of whitespace.
    pub const SKIP_ALL: Self = Self(2 | 4);

    const MASK: u8 = 1 | 2 | 4;

    /// Raw bit value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when any skipping is enabled.
    pub const fn is_enabled(self) -> bool {
        self.0 & Self::SKIP_ALL.0 != 0
    }

    /// Returns `true` when `ch` may be stepped over.
    pub fn is_skippable(self, ch: char) -> bool {
        if ch == '\r' || ch == '\n' {
            self.0 & Self::SKIP_NEWLINE.0 != 0
        } else {
            ch.is_whitespace() && self.0 & Self::SKIP_SPACE.0 != 0
        }
    }
}

impl Default for WhitespaceOptions {
    fn default() -> Self {
        Self::NONE
    }
}

impl BitOr for WhitespaceOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl TryFrom<u8> for WhitespaceOptions {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        if bits == 0 || bits & !Self::MASK != 0 {
            return Err(Error::invalid_argument(
                "whitespace",
                format!("{bits:#05b} is outside the None|SkipSpace|SkipNewline range"),
            ));
        }
        Ok(Self(bits))
    }
}

impl fmt::Debug for WhitespaceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhitespaceOptions")
            .field("space", &self.is_skippable(' '))
            .field("newline", &self.is_skippable('\n'))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_rejects_out_of_range_bits() {
        assert!(Direction::try_from(0).is_err());
        assert!(Direction::try_from(8).is_err());
        assert!(Direction::try_from(9).is_err());
        assert_eq!(Direction::try_from(6).unwrap(), Direction::INPUT | Direction::OUTPUT);
    }

    #[test]
    fn direction_intersection() {
        let policy = Direction::DEFAULT | Direction::OUTPUT;
        assert!(policy.intersects(Direction::OUTPUT));
        assert!(!policy.intersects(Direction::INPUT));
        assert!(Direction::ALL.contains(policy));
    }

    #[test]
    fn raw_enum_values_are_validated() {
        assert_eq!(ReplaceMode::try_from(4).unwrap(), ReplaceMode::JianPin);
        assert!(ReplaceMode::try_from(3).is_err());
        assert_eq!(GroupReplace::try_from(2).unwrap(), GroupReplace::GroupOnly);
        assert!(GroupReplace::try_from(8).is_err());
        assert!(WhitespaceOptions::try_from(16).is_err());
        assert!(WhitespaceOptions::try_from(0).is_err());
    }

    #[test]
    fn whitespace_skip_rules() {
        let none = WhitespaceOptions::NONE;
        assert!(!none.is_enabled());
        assert!(!none.is_skippable(' '));

        let space = WhitespaceOptions::SKIP_SPACE;
        assert!(space.is_skippable(' '));
        assert!(space.is_skippable('\t'));
        assert!(!space.is_skippable('\n'));

        let all = WhitespaceOptions::SKIP_ALL;
        assert!(all.is_skippable('\r'));
        assert!(all.is_skippable('\u{3000}'));
        assert!(!all.is_skippable('x'));
    }
}
