//! Zero-width assertions.
//!
//! Every anchor is the same machine: an optional expression evaluated
//! backward from the cursor, an optional expression evaluated forward, and a
//! condition over which of the two matched. `^`, `$`, `\b`, lookarounds and
//! the rest differ only in how the three slots are filled, which is what
//! lets lookbehind take arbitrary variable-length expressions.

use super::{Expr, Token, chars::CharTest};
use crate::engine::state::State;

/// A zero-width assertion node.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Evaluated against the input before the cursor (direction `-1`).
    pub left: Option<Box<Expr>>,
    /// Evaluated against the input after the cursor (direction `+1`).
    pub right: Option<Box<Expr>>,
    pub cond: AnchorCond,
}

/// The decision an anchor makes from its side matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorCond {
    /// Holds when the left side did not match (`^`, `\A`).
    NotLeft,
    /// Holds when the right side did not match (`$`, `\Z`, `\z`).
    NotRight,
    /// Holds at the end of the previous match in this walk (`\G`).
    PreviousMatchEnd,
    /// Holds when exactly one side matched (`\b`).
    Boundary,
    /// Holds when both or neither side matched (`\B`).
    NotBoundary,
    /// Holds when the right side matched (or did not, when negated).
    Lookahead { negate: bool },
    /// Holds when the left side matched (or did not, when negated).
    Lookbehind { negate: bool },
}

/// A successful lookaround sub-match kept inside an anchor token so a later
/// rewind can replay it backwards from where it ended.
#[derive(Debug)]
pub struct LookRewind {
    pub token: Box<Token>,
    pub end: usize,
    pub direction: isize,
}

/// The anchor's resume token. Sub-matches that succeeded are retained, which
/// also keeps any captures a lookaround pushed until the anchor itself is
/// rewound.
#[derive(Debug, Default)]
pub struct AnchorToken {
    pub left: Option<LookRewind>,
    pub right: Option<LookRewind>,
}

impl Anchor {
    fn new(left: Option<Expr>, right: Option<Expr>, cond: AnchorCond) -> Self {
        Self {
            left: left.map(Box::new),
            right: right.map(Box::new),
            cond,
        }
    }

    /// `^`, or `\A` when `multi_line` is false.
    #[must_use]
    pub fn caret(multi_line: bool) -> Self {
        let before = if multi_line {
            Expr::char(CharTest::Dot)
        } else {
            Expr::char(CharTest::Any)
        };
        Self::new(Some(before), None, AnchorCond::NotLeft)
    }

    /// `$`, or `\Z` when `multi_line` is false. Without `m` this also holds
    /// just before a trailing newline, hence the `.`-or-newline-then-anything
    /// probe.
    #[must_use]
    pub fn dollar(multi_line: bool) -> Self {
        let after = if multi_line {
            Expr::char(CharTest::Dot)
        } else {
            Expr::Alternation(
                Box::new(Expr::char(CharTest::Dot)),
                Box::new(Expr::Sequence(vec![
                    Expr::char(CharTest::Literal('\n')),
                    Expr::char(CharTest::Any),
                ])),
            )
        };
        Self::new(None, Some(after), AnchorCond::NotRight)
    }

    /// `\z`: only at the very end of the window.
    #[must_use]
    pub fn very_end() -> Self {
        Self::new(None, Some(Expr::char(CharTest::Any)), AnchorCond::NotRight)
    }

    /// `\G`: at the end of the previous match.
    #[must_use]
    pub fn previous_match_end() -> Self {
        Self::new(None, None, AnchorCond::PreviousMatchEnd)
    }

    /// `\b` / `\B`.
    #[must_use]
    pub fn boundary(negate: bool) -> Self {
        let cond = if negate {
            AnchorCond::NotBoundary
        } else {
            AnchorCond::Boundary
        };
        Self::new(
            Some(Expr::char(CharTest::Word)),
            Some(Expr::char(CharTest::Word)),
            cond,
        )
    }

    /// `(?=p)` / `(?!p)`.
    #[must_use]
    pub fn lookahead(inner: Expr, negate: bool) -> Self {
        Self::new(None, Some(inner), AnchorCond::Lookahead { negate })
    }

    /// `(?<=p)` / `(?<!p)`. The inner expression is inverted so it reads
    /// backward from the cursor, which is what permits variable-length
    /// lookbehind.
    #[must_use]
    pub fn lookbehind(mut inner: Expr, negate: bool) -> Self {
        inner.invert();
        Self::new(Some(inner), None, AnchorCond::Lookbehind { negate })
    }

    pub fn matches(&self, state: &mut State) -> Option<AnchorToken> {
        let home = state.index();
        state.save_anchor();

        let mut token = AnchorToken::default();
        let mut left_matched = false;
        if let Some(left) = &self.left {
            state.set_direction(-1);
            if let Some(sub) = left.matches(state) {
                left_matched = true;
                token.left = Some(LookRewind {
                    token: Box::new(sub),
                    end: state.index(),
                    direction: -1,
                });
                state.set_index(home);
            }
        }

        let mut right_matched = false;
        if let Some(right) = &self.right {
            state.set_direction(1);
            if let Some(sub) = right.matches(state) {
                right_matched = true;
                token.right = Some(LookRewind {
                    token: Box::new(sub),
                    end: state.index(),
                    direction: 1,
                });
                state.set_index(home);
            }
        }

        state.restore_anchor();

        let holds = match self.cond {
            AnchorCond::NotLeft => !left_matched,
            AnchorCond::NotRight => !right_matched,
            AnchorCond::PreviousMatchEnd => state.index() == state.previous_match_end(),
            AnchorCond::Boundary => left_matched != right_matched,
            AnchorCond::NotBoundary => left_matched == right_matched,
            AnchorCond::Lookahead { negate } => right_matched != negate,
            AnchorCond::Lookbehind { negate } => left_matched != negate,
        };

        if holds {
            Some(token)
        } else {
            self.discard(state, token);
            None
        }
    }

    /// Rewinds the retained sub-matches. The cursor is parked at each
    /// sub-match's recorded end so the inner discard unwinds from where it
    /// actually stopped, then everything is restored.
    pub fn discard(&self, state: &mut State, token: AnchorToken) {
        let home = state.index();
        let direction = state.direction();

        if let (Some(right), Some(rewind)) = (&self.right, token.right) {
            state.set_index(rewind.end);
            state.set_direction(rewind.direction);
            right.discard(state, *rewind.token);
        }
        if let (Some(left), Some(rewind)) = (&self.left, token.left) {
            state.set_index(rewind.end);
            state.set_direction(rewind.direction);
            left.discard(state, *rewind.token);
        }

        state.set_index(home);
        state.set_direction(direction);
    }

    /// Right-to-left transform. The sides already run at fixed directions
    /// (`left` backward, `right` forward) no matter which way the enclosing
    /// match walks, so the assertion keeps its meaning unchanged and there
    /// is nothing to restructure. In particular the inner expressions must
    /// not be reversed: a lookahead still reads its text forward from the
    /// cursor in a right-to-left match.
    pub fn invert(&mut self) {}
}
