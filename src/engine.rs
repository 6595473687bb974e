//! The search loop that drives a compiled expression over the input.

use crate::expr::Expr;
pub use state::{Span, State};

pub mod state;

/// The raw result of one successful match: the full span and every group's
/// capture history, indexed by group id. Slot 0 holds the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpans {
    pub full: Span,
    pub captures: Vec<Vec<Span>>,
}

/// Tries the root expression at every start position from the cursor to the
/// window bound, walking in the state's direction.
///
/// On success the state is sealed with
/// [`finish_match`](State::finish_match), leaving the cursor at the match
/// end so the caller can continue a sequence walk with the same state.
pub fn find_first(root: &Expr, state: &mut State) -> Option<MatchSpans> {
    loop {
        let start = state.index();
        if let Some(token) = root.matches(state) {
            // the token is not needed: the engine never backtracks past a
            // completed match
            drop(token);
            let full = Span::between(start, state.index());
            let mut captures = state.snapshot_captures();
            captures[0] = vec![full];
            state.finish_match();
            return Some(MatchSpans { full, captures });
        }
        if state.at_bound() {
            return None;
        }
        state.step();
    }
}

/// Finds every non-overlapping match from the cursor onward, stepping one
/// extra position after a zero-width match so the walk cannot stall.
pub fn find_all(root: &Expr, state: &mut State, limit: usize) -> Vec<MatchSpans> {
    let mut found = Vec::new();
    while found.len() < limit {
        let Some(spans) = find_first(root, state) else {
            break;
        };
        let empty = spans.full.is_empty();
        found.push(spans);
        if empty {
            if state.at_bound() {
                break;
            }
            state.step();
        }
    }
    found
}
