//! Regular expression stencils.
//!
//! A regexp literal is carried through compilation as its interned
//! pattern text plus an immutable flag set. Pattern syntax is validated
//! against the flags before any stencil is created, so an invalid or
//! partial [`RegExpStencil`] never exists.

pub mod syntax;

use std::ops::{BitOr, BitOrAssign};

use crate::atom::AtomIndex;

pub use syntax::check_pattern_syntax;

/// Immutable regular expression flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegExpFlags(u8);

impl RegExpFlags {
    /// `g`: find all matches.
    pub const GLOBAL: RegExpFlags = RegExpFlags(1 << 0);
    /// `i`: case-insensitive matching.
    pub const IGNORE_CASE: RegExpFlags = RegExpFlags(1 << 1);
    /// `m`: `^` and `$` match at line breaks.
    pub const MULTILINE: RegExpFlags = RegExpFlags(1 << 2);
    /// `s`: `.` matches line terminators.
    pub const DOT_ALL: RegExpFlags = RegExpFlags(1 << 3);
    /// `y`: matching is anchored at `lastIndex`.
    pub const STICKY: RegExpFlags = RegExpFlags(1 << 4);
    /// `u`: full Unicode matching with strict pattern syntax.
    pub const UNICODE: RegExpFlags = RegExpFlags(1 << 5);

    /// The empty flag set.
    pub fn empty() -> Self {
        RegExpFlags(0)
    }

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(self, other: RegExpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the `g` flag is set.
    pub fn global(self) -> bool {
        self.contains(Self::GLOBAL)
    }

    /// Whether the `i` flag is set.
    pub fn ignore_case(self) -> bool {
        self.contains(Self::IGNORE_CASE)
    }

    /// Whether the `m` flag is set.
    pub fn multiline(self) -> bool {
        self.contains(Self::MULTILINE)
    }

    /// Whether the `s` flag is set.
    pub fn dot_all(self) -> bool {
        self.contains(Self::DOT_ALL)
    }

    /// Whether the `y` flag is set.
    pub fn sticky(self) -> bool {
        self.contains(Self::STICKY)
    }

    /// Whether the `u` flag is set.
    pub fn unicode(self) -> bool {
        self.contains(Self::UNICODE)
    }
}

impl BitOr for RegExpFlags {
    type Output = RegExpFlags;

    fn bitor(self, rhs: RegExpFlags) -> RegExpFlags {
        RegExpFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegExpFlags {
    fn bitor_assign(&mut self, rhs: RegExpFlags) {
        self.0 |= rhs.0;
    }
}

/// A validated, atom-interned regular expression.
///
/// Only the conversion pipeline constructs these, and only after
/// [`check_pattern_syntax`] accepted the pattern under its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegExpStencil {
    atom: AtomIndex,
    flags: RegExpFlags,
}

impl RegExpStencil {
    pub(crate) fn new(atom: AtomIndex, flags: RegExpFlags) -> Self {
        Self { atom, flags }
    }

    /// Interned pattern text.
    pub fn atom(self) -> AtomIndex {
        self.atom
    }

    /// The literal's flag set.
    pub fn flags(self) -> RegExpFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags() {
        let flags = RegExpFlags::empty();
        assert!(!flags.global());
        assert!(!flags.ignore_case());
        assert!(!flags.multiline());
        assert!(!flags.dot_all());
        assert!(!flags.sticky());
        assert!(!flags.unicode());
    }

    #[test]
    fn test_flag_accumulation() {
        let mut flags = RegExpFlags::empty();
        flags |= RegExpFlags::GLOBAL;
        flags |= RegExpFlags::UNICODE;
        assert!(flags.global());
        assert!(flags.unicode());
        assert!(!flags.sticky());
        assert!(flags.contains(RegExpFlags::GLOBAL | RegExpFlags::UNICODE));
        assert!(!flags.contains(RegExpFlags::GLOBAL | RegExpFlags::STICKY));
    }
}
