//! The compiled engine handle and the match result objects.

use std::rc::Rc;

use crate::{
    Error, Result,
    engine::{self, MatchSpans, State},
    expr::Expr,
    groups::{GroupId, GroupTable},
    options::Options,
    parser,
};

mod escape;
mod replace;

pub use replace::Repl;

/// A compiled pattern.
///
/// Construction parses the pattern completely; no partial engine survives a
/// syntax error. A `Regex` is immutable afterwards — every search call
/// builds its own private [`State`], so a shared instance can serve
/// concurrent readers.
#[derive(Debug)]
pub struct Regex {
    pattern: String,
    options: Options,
    root: Expr,
    groups: GroupTable,
    /// Group ids in collapsed enumeration order; slot 0 is the whole-match
    /// group.
    order: Vec<GroupId>,
}

impl Regex {
    /// Compiles `pattern` with default options.
    ///
    /// # Errors
    ///
    /// If the pattern is invalid, an [`Error`] citing the position is
    /// returned.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_options(pattern, Options::empty())
    }

    /// Compiles `pattern` with the given options.
    ///
    /// # Errors
    ///
    /// If the pattern is invalid, an [`Error`] citing the position is
    /// returned.
    pub fn with_options(pattern: &str, options: Options) -> Result<Self> {
        let (mut root, groups) = parser::parse(pattern, options)?;
        if options.contains(Options::RIGHT_TO_LEFT) {
            root.invert();
        }
        let order = groups.collapsed_order();
        Ok(Self {
            pattern: pattern.to_string(),
            options,
            root,
            groups,
            order,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    #[must_use]
    pub fn right_to_left(&self) -> bool {
        self.options.contains(Options::RIGHT_TO_LEFT)
    }

    /// The group names in collapsed enumeration order, starting with the
    /// implicit `"0"`.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&id| self.groups.name(id))
    }

    /// Escapes every metacharacter in `text` so it matches literally.
    #[must_use]
    pub fn escape(text: &str) -> String {
        escape::escape(text)
    }

    /// Reverses [`escape`](Self::escape), decoding any recognized escape
    /// sequence.
    ///
    /// # Errors
    ///
    /// If `text` contains an unrecognized or truncated escape, an [`Error`]
    /// is returned.
    pub fn unescape(text: &str) -> Result<String> {
        escape::unescape(text)
    }

    /// Returns `true` if the pattern matches anywhere in `input`.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.find(input).success()
    }

    /// Like [`is_match`](Self::is_match), starting the search at `start`.
    #[must_use]
    pub fn is_match_from(&self, input: &str, start: usize) -> bool {
        self.find_from(input, start).success()
    }

    /// The first match in `input`, or [`Match::empty`] if there is none.
    /// Right-to-left engines search from the high end.
    #[must_use]
    pub fn find(&self, input: &str) -> Match {
        let chars = to_chars(input);
        let start = self.default_start(chars.len());
        self.find_chars(&chars, start, None)
    }

    /// The first match at or after `start` (at or before, for right-to-left
    /// engines).
    #[must_use]
    pub fn find_from(&self, input: &str, start: usize) -> Match {
        let chars = to_chars(input);
        self.find_chars(&chars, start, None)
    }

    /// The first match inside the window of `length` characters beginning at
    /// `start`. For right-to-left engines `start` is the high end of the
    /// window. Boundary anchors see the window, not the whole input.
    #[must_use]
    pub fn find_in(&self, input: &str, start: usize, length: usize) -> Match {
        let chars = to_chars(input);
        self.find_chars(&chars, start, Some(length))
    }

    /// Every non-overlapping match, in search order: by ascending position,
    /// or descending for right-to-left engines.
    #[must_use]
    pub fn matches(&self, input: &str) -> Vec<Match> {
        let chars = to_chars(input);
        let start = self.default_start(chars.len());
        self.matches_chars(&chars, start, usize::MAX)
    }

    /// Like [`matches`](Self::matches), starting the walk at `start`.
    #[must_use]
    pub fn matches_from(&self, input: &str, start: usize) -> Vec<Match> {
        let chars = to_chars(input);
        self.matches_chars(&chars, start, usize::MAX)
    }

    /// Replaces up to `count` matches of the pattern in `input`.
    ///
    /// `count` of `-1` replaces every match and `0` none. Replacement is
    /// textual left-to-right even for right-to-left engines, which only
    /// changes *which* matches are found, not the order of the output.
    ///
    /// # Errors
    ///
    /// If `count` is less than `-1`, an [`Error`] is returned.
    pub fn replace(
        &self,
        input: &str,
        replacement: Repl<'_>,
        count: isize,
        start: Option<usize>,
    ) -> Result<String> {
        let limit = match count {
            -1 => usize::MAX,
            c if c < 0 => return Err(Error::Count { count: c }),
            c => c.unsigned_abs(),
        };
        let chars = to_chars(input);
        let start = start.unwrap_or_else(|| self.default_start(chars.len()));
        let mut matches = self.matches_chars(&chars, start, limit);
        if self.right_to_left() {
            matches.reverse();
        }

        let mut output = String::new();
        let mut cursor = 0;
        for found in &matches {
            output.extend(&chars[cursor..found.index()]);
            match &replacement {
                Repl::Template(template) => output.push_str(&replace::expand(template, found)),
                Repl::Function(f) => output.push_str(&f(found)),
            }
            cursor = found.index() + found.length();
        }
        output.extend(&chars[cursor..]);
        Ok(output)
    }

    /// Splits `input` into at most `count` pieces around matches of the
    /// pattern. `count` of `-1` means no limit; `0` and `1` return the input
    /// whole. Pieces come out in textual order even for right-to-left
    /// engines.
    ///
    /// # Errors
    ///
    /// If `count` is less than `-1`, an [`Error`] is returned.
    pub fn split(&self, input: &str, count: isize, start: Option<usize>) -> Result<Vec<String>> {
        let cuts = match count {
            -1 => usize::MAX,
            c if c < 0 => return Err(Error::Count { count: c }),
            c => c.unsigned_abs().saturating_sub(1),
        };
        let chars = to_chars(input);
        let start = start.unwrap_or_else(|| self.default_start(chars.len()));
        let mut matches = self.matches_chars(&chars, start, cuts);
        if self.right_to_left() {
            matches.reverse();
        }

        let mut pieces = Vec::with_capacity(matches.len() + 1);
        let mut cursor = 0;
        for found in &matches {
            pieces.push(chars[cursor..found.index()].iter().collect());
            cursor = found.index() + found.length();
        }
        pieces.push(chars[cursor..].iter().collect());
        Ok(pieces)
    }

    fn default_start(&self, input_len: usize) -> usize {
        if self.right_to_left() { input_len } else { 0 }
    }

    fn make_state(&self, chars: &Rc<[char]>, start: usize, length: Option<usize>) -> State {
        let start = start.min(chars.len());
        let length = length.unwrap_or(if self.right_to_left() {
            start
        } else {
            chars.len() - start
        });
        State::new(
            Rc::clone(chars),
            self.groups.len(),
            start,
            length,
            self.right_to_left(),
        )
    }

    fn find_chars(&self, chars: &Rc<[char]>, start: usize, length: Option<usize>) -> Match {
        let mut state = self.make_state(chars, start, length);
        match engine::find_first(&self.root, &mut state) {
            Some(spans) => self.build_match(chars, spans),
            None => Match::empty(),
        }
    }

    fn matches_chars(&self, chars: &Rc<[char]>, start: usize, limit: usize) -> Vec<Match> {
        let mut state = self.make_state(chars, start, None);
        engine::find_all(&self.root, &mut state, limit)
            .into_iter()
            .map(|spans| self.build_match(chars, spans))
            .collect()
    }

    fn build_match(&self, chars: &Rc<[char]>, spans: MatchSpans) -> Match {
        let groups = self
            .order
            .iter()
            .map(|&id| {
                let captures = spans.captures[id.index()]
                    .iter()
                    .map(|&span| Capture {
                        index: span.start,
                        length: span.len(),
                        value: chars[span.start..span.end].iter().collect(),
                    })
                    .collect();
                Group {
                    name: self.groups.name(id).to_string(),
                    captures,
                }
            })
            .collect();
        Match {
            success: true,
            input: Rc::clone(chars),
            groups,
        }
    }
}

fn to_chars(input: &str) -> Rc<[char]> {
    input.chars().collect()
}

/// One captured stretch of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    index: usize,
    length: usize,
    value: String,
}

impl Capture {
    /// The character index where the capture starts. Always the lower
    /// boundary, even for right-to-left matches.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A capture group's full history within one match.
///
/// Every iteration of a repeated group is retained: `captures()` lists them
/// oldest first, and `value`/`index`/`length` report the newest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    captures: Vec<Capture>,
}

impl Group {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the group captured at least once.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.captures.is_empty()
    }

    #[must_use]
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// The newest capture's text, or `""` if the group never matched.
    #[must_use]
    pub fn value(&self) -> &str {
        self.captures.last().map_or("", |capture| capture.value())
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.captures.last().map_or(0, Capture::index)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.captures.last().map_or(0, Capture::length)
    }
}

/// One successful match, or the empty sentinel.
#[derive(Debug, Clone)]
pub struct Match {
    success: bool,
    input: Rc<[char]>,
    /// Groups in collapsed enumeration order; `groups[0]` is the whole
    /// match.
    groups: Vec<Group>,
}

impl Match {
    /// The engine-wide failure sentinel: `success()` is `false` and every
    /// accessor reports emptiness.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: false,
            input: Rc::from([] as [char; 0]),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// The character index of the whole match.
    #[must_use]
    pub fn index(&self) -> usize {
        self.groups.first().map_or(0, Group::index)
    }

    /// The length of the whole match, in characters.
    #[must_use]
    pub fn length(&self) -> usize {
        self.groups.first().map_or(0, Group::length)
    }

    /// The matched text.
    #[must_use]
    pub fn value(&self) -> &str {
        self.groups.first().map_or("", Group::value)
    }

    /// All groups, in collapsed enumeration order starting with `"0"`.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Looks a group up by name. All-digit names ignore leading zeros, so
    /// `"01"` finds group `"1"`.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        let normalized = normalize_name(name);
        self.groups.iter().find(|group| group.name() == normalized)
    }

    /// Expands a `$`-replacement template against this match.
    ///
    /// # Errors
    ///
    /// Expanding the empty sentinel is an [`Error`].
    pub fn result(&self, template: &str) -> Result<String> {
        if !self.success {
            return Err(Error::NoMatch);
        }
        Ok(replace::expand(template, self))
    }

    /// The group `$+` refers to: the last successful group in collapsed
    /// order, or the whole-match group when no other group captured.
    #[must_use]
    pub(crate) fn last_group(&self) -> Option<&Group> {
        self.groups
            .iter()
            .skip(1)
            .rev()
            .find(|group| group.success())
            .or_else(|| self.groups.first())
    }

    pub(crate) fn whole_input(&self) -> String {
        self.input.iter().collect()
    }

    pub(crate) fn preceding(&self) -> String {
        self.input[..self.index()].iter().collect()
    }

    pub(crate) fn following(&self) -> String {
        self.input[self.index() + self.length()..].iter().collect()
    }
}

fn normalize_name(name: &str) -> &str {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = name.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    } else {
        name
    }
}
