//! Compile-time pattern options.

use crate::{Error, Result};

bitflags::bitflags! {
    /// The option set accepted by [`Regex::with_options`](crate::Regex::with_options).
    ///
    /// The letter options correspond to the inline `(?imnsx)` syntax and can
    /// also be produced from a flag string with [`Options::parse`].
    /// Right-to-left evaluation has no inline letter and is set with
    /// [`Options::RIGHT_TO_LEFT`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Options: u8 {
        /// `i`: case-insensitive matching.
        const IGNORE_CASE = 1 << 0;
        /// `m`: `^` and `$` also match at line boundaries.
        const MULTI_LINE = 1 << 1;
        /// `n`: bare `(...)` groups do not capture.
        const EXPLICIT_CAPTURE = 1 << 2;
        /// `s`: `.` also matches `\n`.
        const SINGLE_LINE = 1 << 3;
        /// `x`: unescaped whitespace and `#` comments in the pattern are
        /// ignored.
        const IGNORE_WHITESPACE = 1 << 4;
        /// Evaluate the pattern walking the cursor from high to low index.
        const RIGHT_TO_LEFT = 1 << 5;
    }
}

impl Options {
    /// Parses a flag string in `{i, m, n, s, x}`. Letters are
    /// case-insensitive and duplicates coalesce silently.
    ///
    /// # Errors
    ///
    /// If the string contains a letter outside the flag set, an [`Error`] is
    /// returned.
    pub fn parse(flags: &str) -> Result<Self> {
        let mut options = Self::empty();
        for (pos, flag) in flags.chars().enumerate() {
            options |= Self::from_flag(flag).ok_or(Error::UnknownFlag { pos, flag })?;
        }
        Ok(options)
    }

    /// Maps a single inline flag letter to its option bit.
    #[must_use]
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag.to_ascii_lowercase() {
            'i' => Some(Self::IGNORE_CASE),
            'm' => Some(Self::MULTI_LINE),
            'n' => Some(Self::EXPLICIT_CAPTURE),
            's' => Some(Self::SINGLE_LINE),
            'x' => Some(Self::IGNORE_WHITESPACE),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coalesces_and_folds_case() {
        let options = Options::parse("iMIx").unwrap();
        assert_eq!(
            options,
            Options::IGNORE_CASE | Options::MULTI_LINE | Options::IGNORE_WHITESPACE
        );
    }

    #[test]
    fn parse_rejects_unknown_letters() {
        assert_eq!(
            Options::parse("iq"),
            Err(Error::UnknownFlag { pos: 1, flag: 'q' })
        );
    }
}
