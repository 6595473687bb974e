//! The expression tree and the four-operation protocol every node obeys.
//!
//! `matches` attempts the first candidate at the current cursor and returns a
//! resume token; `backtrack` trades a token for the next candidate or fully
//! rewinds; `discard` rewinds unconditionally; `invert` restructures the node
//! once for right-to-left evaluation. A node that fails leaves the state
//! exactly as it found it.

pub mod anchor;
pub mod chars;
pub mod token;

pub use self::{
    anchor::{Anchor, AnchorCond},
    chars::CharTest,
    token::Token,
};
use crate::{
    engine::state::{Span, State},
    groups::GroupId,
};

/// A node of the compiled pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Children matched left to right.
    Sequence(Vec<Expr>),
    /// `left | right`, preferring `left`.
    Alternation(Box<Expr>, Box<Expr>),
    /// `inner{min,max}`, optionally lazy. `u32::MAX` stands for no upper
    /// bound.
    Repetition {
        inner: Box<Expr>,
        min: u32,
        max: u32,
        lazy: bool,
    },
    /// A single-character test.
    Char { test: CharTest, ignore_case: bool },
    /// `(...)` / `(?<name>...)`: match `inner`, push a capture.
    Group { id: GroupId, inner: Box<Expr> },
    /// `(?<-X>...)` / `(?<Y-X>...)`: match `inner`, pop `pop`'s newest
    /// capture, and when `push` is present capture the span between the
    /// popped capture and the cursor onto it.
    Balancing {
        push: Option<GroupId>,
        pop: LateGroup,
        inner: Box<Expr>,
    },
    /// `\1` / `\k<name>`: consume input equal to the group's newest capture.
    Reference { id: GroupId, ignore_case: bool },
    /// A zero-width assertion.
    Anchor(Anchor),
    /// `(?>...)`: match `inner` and never revisit it.
    Atomic(Box<Expr>),
    /// `(?(cond)yes|no)`.
    Conditional {
        cond: Cond,
        yes: Box<Expr>,
        no: Box<Expr>,
    },
    /// A reference the parser could not resolve while groups were still
    /// being registered. The post-parse pass replaces every one of these;
    /// none survives into a compiled pattern. An inversion requested before
    /// resolution (a lookbehind parsed around the placeholder) is recorded
    /// and applied to the replacement.
    Proxy { pending: Pending, inverted: bool },
}

/// A deferred reference payload carried by [`Expr::Proxy`].
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// `\NNN`: a back-reference if a group with that decimal name exists,
    /// otherwise salvaged as an octal escape.
    Number {
        pos: usize,
        digits: String,
        ignore_case: bool,
    },
    /// `\k<name>`: must name a group.
    Name {
        pos: usize,
        name: String,
        ignore_case: bool,
    },
}

/// A group operand that may still be a name awaiting resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LateGroup {
    Name { pos: usize, name: String },
    Id(GroupId),
}

impl LateGroup {
    pub(crate) fn id(&self) -> GroupId {
        match self {
            LateGroup::Id(id) => *id,
            LateGroup::Name { .. } => unreachable!("unresolved group operand"),
        }
    }
}

/// A conditional's predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// True when the group currently has a capture.
    Group(GroupId),
    /// An explicit or implicit lookaround.
    Test(Box<Anchor>),
    /// A name awaiting resolution into one of the other two forms.
    Pending {
        pos: usize,
        name: String,
        ignore_case: bool,
    },
}

impl Expr {
    /// A case-sensitive single-character node.
    #[must_use]
    pub(crate) fn char(test: CharTest) -> Self {
        Expr::Char {
            test,
            ignore_case: false,
        }
    }

    /// The empty sequence, which matches trivially.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Expr::Sequence(Vec::new())
    }

    /// Attempts the first candidate match at `state.index`.
    pub fn matches(&self, state: &mut State) -> Option<Token> {
        match self {
            Expr::Sequence(children) => {
                seq_advance(children, state, Vec::new()).map(Token::Sequence)
            }

            Expr::Alternation(left, right) => match left.matches(state) {
                Some(inner) => Some(Token::Alternation {
                    right: false,
                    inner: Box::new(inner),
                }),
                None => right.matches(state).map(|inner| Token::Alternation {
                    right: true,
                    inner: Box::new(inner),
                }),
            },

            Expr::Repetition {
                inner,
                min,
                max,
                lazy,
            } => {
                let cap = if *lazy { *min } else { *max };
                let mut tokens = Vec::new();
                rep_extend(inner, *min, cap, state, &mut tokens);
                if tokens.len() as u32 >= *min {
                    Some(Token::Repetition(tokens))
                } else {
                    rep_seek(inner, *min, cap, false, state, tokens).map(Token::Repetition)
                }
            }

            Expr::Char { test, ignore_case } => {
                let c = state.peek_char()?;
                if test.test_folded(c, *ignore_case) {
                    state.advance(1);
                    Some(Token::Char)
                } else {
                    None
                }
            }

            Expr::Group { id, inner } => {
                let entry = state.index();
                let token = inner.matches(state)?;
                state.push_capture(*id, Span::between(entry, state.index()));
                Some(Token::Group(Box::new(token)))
            }

            Expr::Balancing { push, pop, inner } => {
                if !state.has_capture(pop.id()) {
                    return None;
                }
                let entry = state.index();
                let token = inner.matches(state)?;
                balance_settle(inner, *push, pop.id(), entry, state, token)
            }

            Expr::Reference { id, ignore_case } => {
                let capture = state.top_capture(*id)?;
                let len = capture.len();
                let window = state.lookahead(len)?;
                for offset in 0..len {
                    let ours = state.char_at(capture.start + offset);
                    let theirs = state.char_at(window.start + offset);
                    let same = if *ignore_case {
                        chars::lower(ours) == chars::lower(theirs)
                    } else {
                        ours == theirs
                    };
                    if !same {
                        return None;
                    }
                }
                state.advance(len);
                Some(Token::Reference { len })
            }

            Expr::Anchor(anchor) => anchor.matches(state).map(Token::Anchor),

            Expr::Atomic(inner) => inner
                .matches(state)
                .map(|token| Token::Atomic(Box::new(token))),

            Expr::Conditional { cond, yes, no } => {
                let (chose_no, cond_token) = match cond {
                    Cond::Group(id) => (!state.has_capture(*id), None),
                    Cond::Test(anchor) => match anchor.matches(state) {
                        Some(token) => (false, Some(token)),
                        None => (true, None),
                    },
                    Cond::Pending { .. } => unreachable!("unresolved conditional predicate"),
                };
                let side = if chose_no { no } else { yes };
                match side.matches(state) {
                    Some(inner) => Some(Token::Conditional {
                        no: chose_no,
                        cond: cond_token,
                        inner: Box::new(inner),
                    }),
                    None => {
                        if let (Cond::Test(anchor), Some(token)) = (cond, cond_token) {
                            anchor.discard(state, token);
                        }
                        None
                    }
                }
            }

            Expr::Proxy { .. } => unreachable!("placeholder node survived resolution"),
        }
    }

    /// Undoes the match behind `token` and seeks the next candidate.
    pub fn backtrack(&self, state: &mut State, token: Token) -> Option<Token> {
        match (self, token) {
            (Expr::Sequence(children), Token::Sequence(tokens)) => {
                seq_backtrack(children, state, tokens).map(Token::Sequence)
            }

            (Expr::Alternation(left, right), Token::Alternation { right: side, inner }) => {
                let chosen = if side { right } else { left };
                if let Some(inner) = chosen.backtrack(state, *inner) {
                    Some(Token::Alternation {
                        right: side,
                        inner: Box::new(inner),
                    })
                } else if !side {
                    right.matches(state).map(|inner| Token::Alternation {
                        right: true,
                        inner: Box::new(inner),
                    })
                } else {
                    None
                }
            }

            (
                Expr::Repetition {
                    inner,
                    min,
                    max,
                    lazy,
                },
                Token::Repetition(mut tokens),
            ) => {
                if *lazy {
                    if (tokens.len() as u32) < *max {
                        let before = state.index();
                        if let Some(extra) = inner.matches(state) {
                            if state.index() != before {
                                tokens.push(extra);
                                return Some(Token::Repetition(tokens));
                            }
                            // an empty iteration would stall the caller
                            inner.discard(state, extra);
                        }
                    }
                    rep_seek(inner, *min, *min, false, state, tokens).map(Token::Repetition)
                } else {
                    rep_seek(inner, *min, *max, true, state, tokens).map(Token::Repetition)
                }
            }

            (Expr::Char { .. }, Token::Char) => {
                state.retreat(1);
                None
            }

            (Expr::Group { id, inner }, Token::Group(token)) => {
                let popped = state.pop_capture(*id);
                let entry = if state.direction() > 0 {
                    popped.start
                } else {
                    popped.end
                };
                let token = inner.backtrack(state, *token)?;
                state.push_capture(*id, Span::between(entry, state.index()));
                Some(Token::Group(Box::new(token)))
            }

            (
                Expr::Balancing { push, pop, inner },
                Token::Balancing {
                    inner: token,
                    popped,
                    pushed,
                    entry,
                },
            ) => {
                if pushed
                    && let Some(push) = push
                {
                    state.pop_capture(*push);
                }
                state.push_capture(pop.id(), popped);
                let token = inner.backtrack(state, *token)?;
                balance_settle(inner, *push, pop.id(), entry, state, token)
            }

            (Expr::Reference { .. }, Token::Reference { len }) => {
                state.retreat(len);
                None
            }

            (Expr::Anchor(anchor), Token::Anchor(token)) => {
                anchor.discard(state, token);
                None
            }

            (Expr::Atomic(inner), Token::Atomic(token)) => {
                inner.discard(state, *token);
                None
            }

            (
                Expr::Conditional { cond, yes, no },
                Token::Conditional {
                    no: chose_no,
                    cond: cond_token,
                    inner,
                },
            ) => {
                let side = if chose_no { no } else { yes };
                match side.backtrack(state, *inner) {
                    Some(inner) => Some(Token::Conditional {
                        no: chose_no,
                        cond: cond_token,
                        inner: Box::new(inner),
                    }),
                    // the chosen side is exhausted; a conditional never
                    // switches sides
                    None => {
                        if let (Cond::Test(anchor), Some(token)) = (cond, cond_token) {
                            anchor.discard(state, token);
                        }
                        None
                    }
                }
            }

            _ => unreachable!("token does not belong to this node"),
        }
    }

    /// Unconditionally rewinds the match behind `token`.
    pub fn discard(&self, state: &mut State, token: Token) {
        match (self, token) {
            (Expr::Sequence(children), Token::Sequence(tokens)) => {
                seq_discard(children, state, tokens);
            }

            (Expr::Alternation(left, right), Token::Alternation { right: side, inner }) => {
                let chosen = if side { right } else { left };
                chosen.discard(state, *inner);
            }

            (Expr::Repetition { inner, .. }, Token::Repetition(mut tokens)) => {
                while let Some(token) = tokens.pop() {
                    inner.discard(state, token);
                }
            }

            (Expr::Char { .. }, Token::Char) => state.retreat(1),

            (Expr::Group { id, inner }, Token::Group(token)) => {
                state.pop_capture(*id);
                inner.discard(state, *token);
            }

            (
                Expr::Balancing { push, pop, inner },
                Token::Balancing {
                    inner: token,
                    popped,
                    pushed,
                    ..
                },
            ) => {
                if pushed
                    && let Some(push) = push
                {
                    state.pop_capture(*push);
                }
                state.push_capture(pop.id(), popped);
                inner.discard(state, *token);
            }

            (Expr::Reference { .. }, Token::Reference { len }) => state.retreat(len),

            (Expr::Anchor(anchor), Token::Anchor(token)) => anchor.discard(state, token),

            (Expr::Atomic(inner), Token::Atomic(token)) => inner.discard(state, *token),

            (
                Expr::Conditional { cond, yes, no },
                Token::Conditional {
                    no: chose_no,
                    cond: cond_token,
                    inner,
                },
            ) => {
                let side = if chose_no { no } else { yes };
                side.discard(state, *inner);
                if let (Cond::Test(anchor), Some(token)) = (cond, cond_token) {
                    anchor.discard(state, token);
                }
            }

            _ => unreachable!("token does not belong to this node"),
        }
    }

    /// Restructures the node for right-to-left evaluation. Applied once when
    /// the engine is built.
    pub fn invert(&mut self) {
        match self {
            Expr::Sequence(children) => {
                children.reverse();
                for child in children {
                    child.invert();
                }
            }
            Expr::Alternation(left, right) => {
                left.invert();
                right.invert();
            }
            Expr::Repetition { inner, .. }
            | Expr::Group { inner, .. }
            | Expr::Balancing { inner, .. } => inner.invert(),
            Expr::Atomic(inner) => inner.invert(),
            Expr::Anchor(anchor) => anchor.invert(),
            Expr::Conditional { cond, yes, no } => {
                if let Cond::Test(anchor) = cond {
                    anchor.invert();
                }
                yes.invert();
                no.invert();
            }
            // unresolved references remember the request for resolution time
            Expr::Proxy { inverted, .. } => *inverted = !*inverted,
            // direction-agnostic: these read through the state's cursor
            Expr::Char { .. } | Expr::Reference { .. } => {}
        }
    }
}

/// Matches `children[tokens.len()..]`, backtracking earlier children when a
/// later one fails. Returns with every child matched, or `None` with
/// everything rewound.
fn seq_advance(
    children: &[Expr],
    state: &mut State,
    mut tokens: Vec<Token>,
) -> Option<Vec<Token>> {
    while tokens.len() < children.len() {
        if let Some(token) = children[tokens.len()].matches(state) {
            tokens.push(token);
        } else {
            loop {
                let token = tokens.pop()?;
                if let Some(token) = children[tokens.len()].backtrack(state, token) {
                    tokens.push(token);
                    break;
                }
            }
        }
    }
    Some(tokens)
}

fn seq_backtrack(
    children: &[Expr],
    state: &mut State,
    mut tokens: Vec<Token>,
) -> Option<Vec<Token>> {
    loop {
        let token = tokens.pop()?;
        if let Some(token) = children[tokens.len()].backtrack(state, token) {
            tokens.push(token);
            return seq_advance(children, state, tokens);
        }
    }
}

fn seq_discard(children: &[Expr], state: &mut State, mut tokens: Vec<Token>) {
    while let Some(token) = tokens.pop() {
        children[tokens.len()].discard(state, token);
    }
}

/// Appends iterations until `cap` is reached or the body stops matching. An
/// iteration that consumes nothing ends the growth once `min` is satisfied,
/// so `(a*)*`-style bodies cannot iterate forever.
fn rep_extend(inner: &Expr, min: u32, cap: u32, state: &mut State, tokens: &mut Vec<Token>) {
    while (tokens.len() as u32) < cap {
        let before = state.index();
        let Some(token) = inner.matches(state) else {
            break;
        };
        let progressed = state.index() != before;
        tokens.push(token);
        if !progressed && tokens.len() as u32 >= min {
            break;
        }
    }
}

/// Seeks the next iteration set with at least `min` members: backtracks the
/// newest iteration and regrows toward `cap`. With `accept_fewer`, dropping
/// the newest iteration entirely is itself a candidate (greedy semantics).
fn rep_seek(
    inner: &Expr,
    min: u32,
    cap: u32,
    accept_fewer: bool,
    state: &mut State,
    mut tokens: Vec<Token>,
) -> Option<Vec<Token>> {
    loop {
        let token = tokens.pop()?;
        if let Some(token) = inner.backtrack(state, token) {
            tokens.push(token);
            rep_extend(inner, min, cap, state, &mut tokens);
            if tokens.len() as u32 >= min {
                return Some(tokens);
            }
        } else if accept_fewer && tokens.len() as u32 >= min {
            return Some(tokens);
        }
    }
}

/// Completes a balancing group around a just-matched body: pops the
/// subtracted group, pushing the in-between span when the group also
/// captures. If the body's current candidate left the subtracted group
/// empty, earlier candidates are tried.
fn balance_settle(
    inner: &Expr,
    push: Option<GroupId>,
    pop: GroupId,
    entry: usize,
    state: &mut State,
    mut token: Token,
) -> Option<Token> {
    loop {
        if state.has_capture(pop) {
            let popped = state.pop_capture(pop);
            if let Some(push) = push {
                let mut bounds = [popped.start, popped.end, entry, state.index()];
                bounds.sort_unstable();
                state.push_capture(
                    push,
                    Span {
                        start: bounds[1],
                        end: bounds[2],
                    },
                );
            }
            return Some(Token::Balancing {
                inner: Box::new(token),
                popped,
                pushed: push.is_some(),
                entry,
            });
        }
        token = inner.backtrack(state, token)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn state(text: &str) -> State {
        let input: Rc<[char]> = text.chars().collect();
        let len = input.len();
        State::new(input, 4, 0, len, false)
    }

    fn lit(c: char) -> Expr {
        Expr::char(CharTest::Literal(c))
    }

    #[test]
    fn sequence_backtracks_into_repetition() {
        // a*a must give one 'a' back
        let expr = Expr::Sequence(vec![
            Expr::Repetition {
                inner: Box::new(lit('a')),
                min: 0,
                max: u32::MAX,
                lazy: false,
            },
            lit('a'),
        ]);
        let mut s = state("aaa");
        assert!(expr.matches(&mut s).is_some());
        assert_eq!(s.index(), 3);
    }

    #[test]
    fn failure_leaves_state_untouched() {
        let expr = Expr::Sequence(vec![lit('a'), lit('b'), lit('c')]);
        let mut s = state("abx");
        assert!(expr.matches(&mut s).is_none());
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn lazy_repetition_grows_on_backtrack() {
        let rep = Expr::Repetition {
            inner: Box::new(lit('a')),
            min: 0,
            max: u32::MAX,
            lazy: true,
        };
        let mut s = state("aaa");
        let token = rep.matches(&mut s).unwrap();
        assert_eq!(s.index(), 0);
        let token = rep.backtrack(&mut s, token).unwrap();
        assert_eq!(s.index(), 1);
        rep.discard(&mut s, token);
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn empty_iterations_terminate() {
        // (a*)* on a non-matching tail has finitely many candidates
        let inner = Expr::Repetition {
            inner: Box::new(lit('a')),
            min: 0,
            max: u32::MAX,
            lazy: false,
        };
        let expr = Expr::Sequence(vec![
            Expr::Repetition {
                inner: Box::new(inner),
                min: 0,
                max: u32::MAX,
                lazy: false,
            },
            lit('b'),
        ]);
        let mut s = state("aaac");
        assert!(expr.matches(&mut s).is_none());
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn atomic_group_refuses_to_give_back() {
        // (?>a*)a can never match
        let expr = Expr::Sequence(vec![
            Expr::Atomic(Box::new(Expr::Repetition {
                inner: Box::new(lit('a')),
                min: 0,
                max: u32::MAX,
                lazy: false,
            })),
            lit('a'),
        ]);
        let mut s = state("aaa");
        assert!(expr.matches(&mut s).is_none());
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn group_records_capture_history() {
        let id = GroupId(1);
        let expr = Expr::Repetition {
            inner: Box::new(Expr::Group {
                id,
                inner: Box::new(lit('a')),
            }),
            min: 0,
            max: u32::MAX,
            lazy: false,
        };
        let mut s = state("aa");
        assert!(expr.matches(&mut s).is_some());
        assert_eq!(s.top_capture(id), Some(Span { start: 1, end: 2 }));
        assert!(s.has_capture(id));
        assert_eq!(s.snapshot_captures()[1].len(), 2);
    }
}
