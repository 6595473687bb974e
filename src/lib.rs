#![allow(clippy::type_complexity)]

pub mod engine;
pub mod expr;
pub mod flags;
pub mod groups;
pub mod options;
pub mod parser;
pub mod regex;
pub mod scanner;

pub use self::{
    groups::{GroupId, GroupTable},
    options::Options,
    regex::{Capture, Group, Match, Regex, Repl},
    scanner::Scanner,
};

/// The error type used by the whole crate.
///
/// Parse errors carry the 0-based character position in the pattern string
/// where the problem was detected.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The parser required a token that was not present.
    #[error("expected {expected} at {pos}")]
    Expected { pos: usize, expected: &'static str },
    /// The parser hit a token that is invalid in its position.
    #[error("unexpected {found} at {pos}")]
    Unexpected { pos: usize, found: String },
    /// The pattern ended in the middle of a construct.
    #[error("unexpected end of pattern ({expected} at {pos})")]
    UnexpectedEnd { pos: usize, expected: &'static str },
    /// An escape sequence does not name anything.
    #[error("unrecognized escape '\\{lit}' at {pos}")]
    InvalidEscape { pos: usize, lit: char },
    /// A `\xHH`/`\uHHHH` escape with missing or non-hex digits.
    #[error("invalid hex escape at {pos}")]
    InvalidHex { pos: usize },
    /// A `\cX` escape where `X` is not a letter.
    #[error("invalid control character escape at {pos}")]
    InvalidControl { pos: usize },
    /// A group name that is empty, mixes digits and letters, or defines a
    /// leading-zero number.
    #[error("invalid group name '{name}' at {pos}")]
    GroupName { pos: usize, name: String },
    /// A reference to a group that does not exist anywhere in the pattern.
    #[error("reference to undefined group '{name}' at {pos}")]
    UndefinedGroup { pos: usize, name: String },
    /// `{n,m}` with `m < n`.
    #[error("repetition bounds out of order ({min} > {max}) at {pos}")]
    RepetitionBounds { pos: usize, min: u32, max: u32 },
    /// A quantifier with no atom in front of it.
    #[error("repetition has nothing to repeat at {pos}")]
    DanglingRepetition { pos: usize },
    /// A quantifier directly following another quantifier.
    #[error("repetition follows repetition at {pos}")]
    DoubleRepetition { pos: usize },
    /// An inline option letter outside `i m n s x`.
    #[error("unknown flag '{flag}' at {pos}")]
    UnknownFlag { pos: usize, flag: char },
    /// A character class range with the bounds reversed.
    #[error("invalid class range at {pos}")]
    ClassRange { pos: usize },
    /// A conditional whose predicate is a number that names no group.
    #[error("conditional references undefined numbered group '{name}' at {pos}")]
    ConditionalGroup { pos: usize, name: String },
    /// `replace`/`split` called with a count below `-1`.
    #[error("count must be -1 or greater, got {count}")]
    Count { count: isize },
    /// `Match::result` called on the empty sentinel match.
    #[error("cannot expand a replacement on a failed match")]
    NoMatch,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
