//! A position-tracked cursor over the pattern string.

use crate::{Error, Result};

/// Reads a pattern string one character at a time, with arbitrary lookahead
/// and anchored literal matching.
///
/// Every probe tests at the current position only; nothing here searches
/// ahead. Failed probes leave the position untouched.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    /// Creates a new scanner over `pattern`.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    /// Returns the current position of the scanner, in characters.
    #[inline]
    #[must_use]
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Returns `true` if the whole pattern has been consumed.
    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Returns the next character without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Returns the character `offset` positions ahead without consuming
    /// anything.
    #[inline]
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Returns `true` if the input at the current position starts with `lit`.
    #[must_use]
    pub fn peek_str(&self, lit: &str) -> bool {
        let mut offset = 0;
        for c in lit.chars() {
            if self.peek_at(offset) != Some(c) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Consumes and returns the next character.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Consumes the next character if it equals `c`.
    #[inline]
    pub fn consume(&mut self, c: char) -> bool {
        let matches = self.peek() == Some(c);
        if matches {
            self.pos += 1;
        }
        matches
    }

    /// Consumes `lit` if the input starts with it at the current position.
    pub fn consume_str(&mut self, lit: &str) -> bool {
        let matches = self.peek_str(lit);
        if matches {
            self.pos += lit.chars().count();
        }
        matches
    }

    /// Consumes and returns the next character if `test` accepts it.
    #[inline]
    pub fn consume_if(&mut self, test: impl FnOnce(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(c) if test(c) => {
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    /// Consumes `c` or fails, describing what was required.
    ///
    /// # Errors
    ///
    /// If the next character is not `c`, an [`Error`] citing the current
    /// position and `expected` is returned.
    pub fn expect(&mut self, c: char, expected: &'static str) -> Result<()> {
        if self.consume(c) {
            Ok(())
        } else if self.is_eof() {
            Err(Error::UnexpectedEnd {
                pos: self.pos,
                expected,
            })
        } else {
            Err(Error::Expected {
                pos: self.pos,
                expected,
            })
        }
    }

    /// Fails if the input at the current position starts with `lit`.
    ///
    /// # Errors
    ///
    /// If `lit` is present, an [`Error`] citing the current position is
    /// returned.
    pub fn unexpect(&mut self, lit: &str) -> Result<()> {
        if self.peek_str(lit) {
            Err(Error::Unexpected {
                pos: self.pos,
                found: lit.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Consumes the longest run of characters accepted by `test` and returns
    /// it. The run may be empty.
    pub fn take_while(&mut self, test: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.consume_if(&test) {
            taken.push(c);
        }
        taken
    }

    /// Consumes exactly `count` hex digits and returns their value.
    ///
    /// # Errors
    ///
    /// If fewer than `count` hex digits follow, an [`Error`] is returned and
    /// nothing is consumed.
    pub fn hex(&mut self, count: usize) -> Result<u32> {
        let start = self.pos;
        let mut value = 0;
        for _ in 0..count {
            let Some(digit) = self.consume_if(|c| c.is_ascii_hexdigit()) else {
                self.pos = start;
                return Err(Error::InvalidHex { pos: start });
            };
            value = value * 16 + digit.to_digit(16).unwrap_or(0);
        }
        Ok(value)
    }
}
