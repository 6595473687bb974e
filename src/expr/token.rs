//! Resume tokens for the match/backtrack/discard protocol.

use crate::engine::state::Span;
use crate::expr::anchor::AnchorToken;

/// What a node returns from a successful match: everything needed to seek
/// its next alternative or rewind it without re-running the forward logic.
///
/// One variant per node kind. Tokens are opaque to every node but the one
/// that produced them.
#[derive(Debug)]
pub enum Token {
    /// One character was consumed.
    Char,
    /// Child tokens in match order.
    Sequence(Vec<Token>),
    /// Which branch matched, and its token.
    Alternation {
        right: bool,
        inner: Box<Token>,
    },
    /// One token per completed iteration, oldest first.
    Repetition(Vec<Token>),
    /// The inner token; a capture was pushed on the group's stack.
    Group(Box<Token>),
    /// The inner token plus what the balancing edit did: the capture popped
    /// from the subtracted group, whether a span was pushed, and the cursor
    /// position where the group began matching.
    Balancing {
        inner: Box<Token>,
        popped: Span,
        pushed: bool,
        entry: usize,
    },
    /// How many characters the back-reference consumed.
    Reference {
        len: usize,
    },
    /// Saved lookaround sub-matches for rewinding.
    Anchor(AnchorToken),
    /// The inner token, kept only so the whole branch can be discarded.
    Atomic(Box<Token>),
    /// Which side was selected (it never changes), the predicate's token if
    /// the predicate was a lookaround that matched, and the side's token.
    Conditional {
        no: bool,
        cond: Option<AnchorToken>,
        inner: Box<Token>,
    },
}
