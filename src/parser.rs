//! Recursive-descent translation from pattern surface syntax to the
//! expression tree.
//!
//! Group references cannot always be resolved while groups are still being
//! registered (`\2` may precede group 2), so the parser leaves placeholder
//! nodes behind and a post-parse pass over the finished tree resolves them
//! against the completed group table, salvaging numeric tokens as octal
//! escapes where no group matches.

use crate::{
    Error, Result,
    expr::{Anchor, CharTest, Cond, Expr, LateGroup, Pending},
    flags::FlagsStack,
    groups::{GroupId, GroupTable},
    options::Options,
    scanner::Scanner,
};

/// Parses `pattern` into an expression tree and its group table.
///
/// # Errors
///
/// If the pattern is not valid, an [`Error`] citing the offending position
/// is returned.
pub fn parse(pattern: &str, options: Options) -> Result<(Expr, GroupTable)> {
    Parser::new(pattern, options).parse()
}

struct Parser {
    scanner: Scanner,
    flags: FlagsStack,
    groups: GroupTable,
}

impl Parser {
    fn new(pattern: &str, options: Options) -> Self {
        Self {
            scanner: Scanner::new(pattern),
            flags: FlagsStack::new(options),
            groups: GroupTable::new(),
        }
    }

    fn parse(mut self) -> Result<(Expr, GroupTable)> {
        let mut root = self.parse_regex()?;
        if let Some(c) = self.scanner.peek() {
            // only an unbalanced `)` can stop the top-level parse early
            return Err(Error::Unexpected {
                pos: self.scanner.tell(),
                found: c.to_string(),
            });
        }
        resolve(&mut root, &self.groups)?;
        Ok((root, self.groups))
    }

    /// Alternation level: a sequence, optionally `|` and another regex.
    fn parse_regex(&mut self) -> Result<Expr> {
        let sequence = self.parse_sequence()?;
        if self.scanner.consume('|') {
            let rest = self.parse_regex()?;
            Ok(Expr::Alternation(Box::new(sequence), Box::new(rest)))
        } else {
            Ok(sequence)
        }
    }

    /// Collects quantified atoms until `)`, `|`, or the end of the pattern.
    fn parse_sequence(&mut self) -> Result<Expr> {
        let mut items = Vec::new();
        loop {
            self.skip_ignored()?;
            match self.scanner.peek() {
                None | Some(')' | '|') => break,
                Some(_) => {}
            }
            if let Some(item) = self.parse_item()? {
                items.push(item);
            }
        }
        Ok(match items.len() {
            1 => items.remove(0),
            _ => Expr::Sequence(items),
        })
    }

    /// One atom plus its optional repetition postfix. Returns `None` for
    /// constructs that produce no atom, such as `(?i)`.
    fn parse_item(&mut self) -> Result<Option<Expr>> {
        let Some(atom) = self.parse_atom()? else {
            return Ok(None);
        };
        self.skip_ignored()?;
        let Some((min, max)) = self.parse_quantifier()? else {
            return Ok(Some(atom));
        };
        let lazy = self.scanner.consume('?');
        self.skip_ignored()?;
        if self.quantifier_starts_here() {
            return Err(Error::DoubleRepetition {
                pos: self.scanner.tell(),
            });
        }
        Ok(Some(Expr::Repetition {
            inner: Box::new(atom),
            min,
            max,
            lazy,
        }))
    }

    fn parse_atom(&mut self) -> Result<Option<Expr>> {
        let pos = self.scanner.tell();
        let Some(c) = self.scanner.peek() else {
            return Err(Error::UnexpectedEnd {
                pos,
                expected: "a pattern atom",
            });
        };
        match c {
            '(' => self.parse_group(),
            '[' => self.parse_class().map(Some),
            '\\' => self.parse_escape_atom().map(Some),
            '^' => {
                self.scanner.next();
                Ok(Some(Expr::Anchor(Anchor::caret(self.multi_line()))))
            }
            '$' => {
                self.scanner.next();
                Ok(Some(Expr::Anchor(Anchor::dollar(self.multi_line()))))
            }
            '.' => {
                self.scanner.next();
                let test = if self.single_line() {
                    CharTest::Any
                } else {
                    CharTest::Dot
                };
                Ok(Some(Expr::char(test)))
            }
            '*' | '+' | '?' => Err(Error::DanglingRepetition { pos }),
            '{' if self.scan_braces().is_some() => Err(Error::DanglingRepetition { pos }),
            c => {
                self.scanner.next();
                Ok(Some(self.literal(c)))
            }
        }
    }

    /// Everything starting with `(` except `(?#...)` comments, which
    /// [`skip_ignored`](Self::skip_ignored) swallows before atoms.
    fn parse_group(&mut self) -> Result<Option<Expr>> {
        self.scanner.expect('(', "`(`")?;

        if self.scanner.consume_str("?:") {
            let inner = self.parse_scoped_regex()?;
            self.scanner.expect(')', "`)`")?;
            return Ok(Some(inner));
        }
        if self.scanner.consume_str("?=") {
            return self.parse_lookaround(false, false).map(Some);
        }
        if self.scanner.consume_str("?!") {
            return self.parse_lookaround(false, true).map(Some);
        }
        if self.scanner.consume_str("?<=") {
            return self.parse_lookaround(true, false).map(Some);
        }
        if self.scanner.consume_str("?<!") {
            return self.parse_lookaround(true, true).map(Some);
        }
        if self.scanner.consume_str("?>") {
            let inner = self.parse_scoped_regex()?;
            self.scanner.expect(')', "`)`")?;
            return Ok(Some(Expr::Atomic(Box::new(inner))));
        }
        if self.scanner.consume_str("?(") {
            self.flags.push();
            let conditional = self.parse_conditional();
            self.flags.pop();
            return conditional.map(Some);
        }
        if self.scanner.peek_str("?<") || self.scanner.peek_str("?'") {
            return self.parse_named().map(Some);
        }
        if self.scanner.consume('?') {
            return self.parse_inline_flags();
        }

        // a bare capture group; under the `n` flag it does not capture
        let id = if self.flags.is_set(Options::EXPLICIT_CAPTURE) {
            None
        } else {
            Some(self.groups.intern_numbered())
        };
        let inner = self.parse_scoped_regex()?;
        self.scanner.expect(')', "`)`")?;
        Ok(Some(match id {
            Some(id) => Expr::Group {
                id,
                inner: Box::new(inner),
            },
            None => inner,
        }))
    }

    fn parse_lookaround(&mut self, behind: bool, negate: bool) -> Result<Expr> {
        let inner = self.parse_scoped_regex()?;
        self.scanner.expect(')', "`)`")?;
        let anchor = if behind {
            Anchor::lookbehind(inner, negate)
        } else {
            Anchor::lookahead(inner, negate)
        };
        Ok(Expr::Anchor(anchor))
    }

    /// `(?<name>...)`, `(?'name'...)`, `(?<-X>...)`, `(?<Y-X>...)`.
    fn parse_named(&mut self) -> Result<Expr> {
        let terminator = if self.scanner.consume_str("?<") {
            '>'
        } else {
            self.scanner.expect('?', "`?`")?;
            self.scanner.expect('\'', "`'`")?;
            '\''
        };

        let name_pos = self.scanner.tell();
        let name = self.take_name();
        if self.scanner.consume('-') {
            let pop_pos = self.scanner.tell();
            let pop_name = self.take_name();
            if pop_name.is_empty() {
                return Err(Error::GroupName {
                    pos: pop_pos,
                    name: pop_name,
                });
            }
            let push = if name.is_empty() {
                None
            } else {
                Some(self.define_group(name_pos, &name)?)
            };
            self.scanner.expect(terminator, "the group name terminator")?;
            let inner = self.parse_scoped_regex()?;
            self.scanner.expect(')', "`)`")?;
            Ok(Expr::Balancing {
                push,
                pop: LateGroup::Name {
                    pos: pop_pos,
                    name: pop_name,
                },
                inner: Box::new(inner),
            })
        } else {
            let id = self.define_group(name_pos, &name)?;
            self.scanner.expect(terminator, "the group name terminator")?;
            let inner = self.parse_scoped_regex()?;
            self.scanner.expect(')', "`)`")?;
            Ok(Expr::Group {
                id,
                inner: Box::new(inner),
            })
        }
    }

    /// `(?(cond)yes|no)`, with `?(` already consumed.
    fn parse_conditional(&mut self) -> Result<Expr> {
        let pos = self.scanner.tell();
        let cond = if self.scanner.peek_str("?=")
            || self.scanner.peek_str("?!")
            || self.scanner.peek_str("?<=")
            || self.scanner.peek_str("?<!")
        {
            let (behind, negate) = if self.scanner.consume_str("?=") {
                (false, false)
            } else if self.scanner.consume_str("?!") {
                (false, true)
            } else if self.scanner.consume_str("?<=") {
                (true, false)
            } else {
                self.scanner.expect('?', "`?`")?;
                self.scanner.expect('<', "`<`")?;
                self.scanner.expect('!', "`!`")?;
                (true, true)
            };
            let inner = self.parse_scoped_regex()?;
            self.scanner.expect(')', "`)` to close the condition")?;
            let anchor = if behind {
                Anchor::lookbehind(inner, negate)
            } else {
                Anchor::lookahead(inner, negate)
            };
            Cond::Test(Box::new(anchor))
        } else {
            let name = self.scanner.take_while(|c| c != ')' && c != '(');
            if name.is_empty() {
                return Err(Error::GroupName { pos, name });
            }
            self.scanner.expect(')', "`)` to close the condition")?;
            Cond::Pending {
                pos,
                name,
                ignore_case: self.ignore_case(),
            }
        };

        let yes = self.parse_sequence()?;
        let no = if self.scanner.consume('|') {
            self.parse_sequence()?
        } else {
            Expr::empty()
        };
        // a conditional has at most two branches
        self.scanner.unexpect("|")?;
        self.scanner.expect(')', "`)`")?;
        Ok(Expr::Conditional {
            cond,
            yes: Box::new(yes),
            no: Box::new(no),
        })
    }

    /// `(?flags)` (mutates the enclosing scope, no atom) or `(?flags:...)`,
    /// with `(?` already consumed.
    fn parse_inline_flags(&mut self) -> Result<Option<Expr>> {
        let mut updates: Vec<(Options, bool)> = Vec::new();
        let mut on = true;
        loop {
            let pos = self.scanner.tell();
            match self.scanner.next() {
                Some(':') if !updates.is_empty() => {
                    self.flags.push();
                    for &(flag, value) in &updates {
                        self.flags.set(flag, value);
                    }
                    let inner = self.parse_regex();
                    self.flags.pop();
                    let inner = inner?;
                    self.scanner.expect(')', "`)`")?;
                    return Ok(Some(inner));
                }
                Some(')') if !updates.is_empty() => {
                    for &(flag, value) in &updates {
                        self.flags.set(flag, value);
                    }
                    return Ok(None);
                }
                Some('-') if on => on = false,
                Some(c) => {
                    let Some(flag) = Options::from_flag(c) else {
                        return Err(Error::UnknownFlag { pos, flag: c });
                    };
                    updates.push((flag, on));
                }
                None => {
                    return Err(Error::UnexpectedEnd {
                        pos,
                        expected: "`)` to close the inline options",
                    });
                }
            }
        }
    }

    /// `[...]` with negation, ranges, escapes, and `-[...]` subtraction.
    fn parse_class(&mut self) -> Result<Expr> {
        let test = self.parse_class_test()?;
        Ok(Expr::Char {
            test,
            ignore_case: self.ignore_case(),
        })
    }

    fn parse_class_test(&mut self) -> Result<CharTest> {
        self.scanner.expect('[', "`[`")?;
        let negated = self.scanner.consume('^');
        let mut members: Vec<CharTest> = Vec::new();
        let mut subtracted = None;

        loop {
            match self.scanner.peek() {
                None => {
                    return Err(Error::UnexpectedEnd {
                        pos: self.scanner.tell(),
                        expected: "`]`",
                    });
                }
                Some(']') if members.is_empty() => {
                    return Err(Error::Unexpected {
                        pos: self.scanner.tell(),
                        found: "]".to_string(),
                    });
                }
                Some(']') => {
                    self.scanner.next();
                    break;
                }
                Some('-') if self.scanner.peek_at(1) == Some('[') && !members.is_empty() => {
                    // subtraction must be the last element of the class
                    self.scanner.next();
                    subtracted = Some(Box::new(self.parse_class_test()?));
                    self.scanner.expect(']', "`]` after the subtracted class")?;
                    break;
                }
                Some(_) => {
                    let member = self.parse_class_member()?;
                    let range_follows = self.scanner.peek() == Some('-')
                        && !matches!(self.scanner.peek_at(1), None | Some(']' | '['));
                    if range_follows {
                        let dash_pos = self.scanner.tell();
                        self.scanner.next();
                        let hi = self.parse_class_member()?;
                        match (member, hi) {
                            (ClassMember::Single(lo), ClassMember::Single(hi)) if lo <= hi => {
                                members.push(CharTest::Range(lo, hi));
                            }
                            _ => return Err(Error::ClassRange { pos: dash_pos }),
                        }
                    } else {
                        members.push(member.into_test());
                    }
                }
            }
        }

        let mut base = match members.len() {
            1 => members.remove(0),
            _ => CharTest::Union(members),
        };
        if negated {
            base = base.negate();
        }
        if let Some(subtracted) = subtracted {
            base = CharTest::Subtract(Box::new(base), subtracted);
        }
        Ok(base)
    }

    fn parse_class_member(&mut self) -> Result<ClassMember> {
        let pos = self.scanner.tell();
        let Some(c) = self.scanner.next() else {
            return Err(Error::UnexpectedEnd {
                pos,
                expected: "`]`",
            });
        };
        if c != '\\' {
            return Ok(ClassMember::Single(c));
        }
        let Some(escape) = self.scanner.next() else {
            return Err(Error::UnexpectedEnd {
                pos,
                expected: "an escape after `\\`",
            });
        };
        Ok(match escape {
            'd' => ClassMember::Test(CharTest::Digit),
            'D' => ClassMember::Test(CharTest::Digit.negate()),
            'w' => ClassMember::Test(CharTest::Word),
            'W' => ClassMember::Test(CharTest::Word.negate()),
            's' => ClassMember::Test(CharTest::Space),
            'S' => ClassMember::Test(CharTest::Space.negate()),
            // inside a class, `\b` is a backspace
            'b' => ClassMember::Single('\x08'),
            't' => ClassMember::Single('\t'),
            'r' => ClassMember::Single('\r'),
            'n' => ClassMember::Single('\n'),
            'a' => ClassMember::Single('\x07'),
            'e' => ClassMember::Single('\x1b'),
            'f' => ClassMember::Single('\x0c'),
            'v' => ClassMember::Single('\x0b'),
            'x' => ClassMember::Single(char::from(self.scanner.hex(2)? as u8)),
            'u' => {
                let value = self.scanner.hex(4)?;
                match char::from_u32(value) {
                    Some(c) => ClassMember::Single(c),
                    None => return Err(Error::InvalidHex { pos }),
                }
            }
            'c' => ClassMember::Single(self.control_escape(pos)?),
            '0'..='7' => ClassMember::Single(self.octal_tail(escape)),
            c if c.is_ascii_alphanumeric() => {
                return Err(Error::InvalidEscape { pos, lit: c });
            }
            c => ClassMember::Single(c),
        })
    }

    /// A backslash atom outside a character class.
    fn parse_escape_atom(&mut self) -> Result<Expr> {
        let pos = self.scanner.tell();
        self.scanner.expect('\\', "`\\`")?;
        let Some(c) = self.scanner.next() else {
            return Err(Error::UnexpectedEnd {
                pos,
                expected: "an escape after `\\`",
            });
        };
        Ok(match c {
            'd' => self.class_escape(CharTest::Digit, false),
            'D' => self.class_escape(CharTest::Digit, true),
            'w' => self.class_escape(CharTest::Word, false),
            'W' => self.class_escape(CharTest::Word, true),
            's' => self.class_escape(CharTest::Space, false),
            'S' => self.class_escape(CharTest::Space, true),
            'A' => Expr::Anchor(Anchor::caret(false)),
            'Z' => Expr::Anchor(Anchor::dollar(false)),
            'z' => Expr::Anchor(Anchor::very_end()),
            'G' => Expr::Anchor(Anchor::previous_match_end()),
            'b' => Expr::Anchor(Anchor::boundary(false)),
            'B' => Expr::Anchor(Anchor::boundary(true)),
            'k' => {
                let terminator = if self.scanner.consume('<') {
                    '>'
                } else if self.scanner.consume('\'') {
                    '\''
                } else {
                    return Err(Error::Expected {
                        pos: self.scanner.tell(),
                        expected: "`<` or `'` after `\\k`",
                    });
                };
                let name_pos = self.scanner.tell();
                let name = self.take_name();
                if name.is_empty() {
                    return Err(Error::GroupName {
                        pos: name_pos,
                        name,
                    });
                }
                self.scanner.expect(terminator, "the group name terminator")?;
                Expr::Proxy {
                    pending: Pending::Name {
                        pos: name_pos,
                        name,
                        ignore_case: self.ignore_case(),
                    },
                    inverted: false,
                }
            }
            '0' => {
                let c = self.octal_tail('0');
                self.literal(c)
            }
            '1'..='9' => {
                let mut digits = String::from(c);
                digits.push_str(&self.scanner.take_while(|c| c.is_ascii_digit()));
                Expr::Proxy {
                    pending: Pending::Number {
                        pos,
                        digits,
                        ignore_case: self.ignore_case(),
                    },
                    inverted: false,
                }
            }
            't' => self.literal('\t'),
            'r' => self.literal('\r'),
            'n' => self.literal('\n'),
            'a' => self.literal('\x07'),
            'e' => self.literal('\x1b'),
            'f' => self.literal('\x0c'),
            'v' => self.literal('\x0b'),
            'x' => {
                let value = self.scanner.hex(2)?;
                self.literal(char::from(value as u8))
            }
            'u' => {
                let value = self.scanner.hex(4)?;
                match char::from_u32(value) {
                    Some(c) => self.literal(c),
                    None => return Err(Error::InvalidHex { pos }),
                }
            }
            'c' => {
                let c = self.control_escape(pos)?;
                self.literal(c)
            }
            c if c.is_ascii_alphanumeric() => {
                return Err(Error::InvalidEscape { pos, lit: c });
            }
            c => self.literal(c),
        })
    }

    /// Consumes up to two more octal digits after `first`, modulo 0x100.
    /// Further digits stay in the pattern as literals.
    fn octal_tail(&mut self, first: char) -> char {
        let mut value = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            let Some(digit) = self.scanner.consume_if(|c| c.is_digit(8)) else {
                break;
            };
            value = value * 8 + digit.to_digit(8).unwrap_or(0);
        }
        char::from((value % 0x100) as u8)
    }

    /// `\cX`: the control letter is case-folded, then `XOR 0x40`.
    fn control_escape(&mut self, pos: usize) -> Result<char> {
        let Some(letter) = self.scanner.consume_if(|c| c.is_ascii_alphabetic()) else {
            return Err(Error::InvalidControl { pos });
        };
        Ok(char::from((letter.to_ascii_uppercase() as u8) ^ 0x40))
    }

    /// `*`, `+`, `?`, or a well-formed brace form. The brace form is literal
    /// text when its contents do not look like `{digits(,digits?)?}`.
    fn parse_quantifier(&mut self) -> Result<Option<(u32, u32)>> {
        let pos = self.scanner.tell();
        match self.scanner.peek() {
            Some('*') => {
                self.scanner.next();
                Ok(Some((0, u32::MAX)))
            }
            Some('+') => {
                self.scanner.next();
                Ok(Some((1, u32::MAX)))
            }
            Some('?') => {
                self.scanner.next();
                Ok(Some((0, 1)))
            }
            Some('{') => match self.scan_braces() {
                Some((min, max, len)) => {
                    if max < min {
                        return Err(Error::RepetitionBounds { pos, min, max });
                    }
                    for _ in 0..len {
                        self.scanner.next();
                    }
                    Ok(Some((min, max)))
                }
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn quantifier_starts_here(&self) -> bool {
        matches!(self.scanner.peek(), Some('*' | '+' | '?')) || self.scan_braces().is_some()
    }

    /// Probes (without consuming) for `{n}`, `{n,}`, or `{n,m}` at the
    /// current position, returning the bounds and the probe length.
    fn scan_braces(&self) -> Option<(u32, u32, usize)> {
        if self.scanner.peek() != Some('{') {
            return None;
        }
        let mut offset = 1;
        let min = self.scan_number(&mut offset)?;
        match self.scanner.peek_at(offset) {
            Some('}') => Some((min, min, offset + 1)),
            Some(',') => {
                offset += 1;
                let max = self.scan_number(&mut offset).unwrap_or(u32::MAX);
                (self.scanner.peek_at(offset) == Some('}')).then_some((min, max, offset + 1))
            }
            _ => None,
        }
    }

    fn scan_number(&self, offset: &mut usize) -> Option<u32> {
        let mut value: u32 = 0;
        let mut any = false;
        while let Some(digit) = self.scanner.peek_at(*offset).and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(digit);
            *offset += 1;
            any = true;
        }
        any.then_some(value)
    }

    /// Swallows `(?#...)` comments, and under `x` also whitespace and
    /// `#`-to-end-of-line comments.
    fn skip_ignored(&mut self) -> Result<()> {
        loop {
            if self.scanner.consume_str("(?#") {
                self.scanner.take_while(|c| c != ')');
                self.scanner.expect(')', "`)` to close the comment")?;
            } else if self.ignore_whitespace()
                && self
                    .scanner
                    .consume_if(|c| c.is_whitespace())
                    .is_some()
            {
            } else if self.ignore_whitespace() && self.scanner.consume('#') {
                self.scanner.take_while(|c| c != '\n');
            } else {
                return Ok(());
            }
        }
    }

    fn parse_scoped_regex(&mut self) -> Result<Expr> {
        self.flags.push();
        let result = self.parse_regex();
        self.flags.pop();
        result
    }

    fn take_name(&mut self) -> String {
        self.scanner
            .take_while(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Registers a group name used in a defining position. Numeric names
    /// must not carry a leading zero; identifier names must not start with a
    /// digit.
    fn define_group(&mut self, pos: usize, name: &str) -> Result<GroupId> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            None => false,
            // a numeric name with a leading zero can refer to a group but
            // never define one, and digits must not mix with letters
            Some(first) if first.is_ascii_digit() => {
                first != '0' && chars.all(|c| c.is_ascii_digit())
            }
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
        };
        if !valid {
            return Err(Error::GroupName {
                pos,
                name: name.to_string(),
            });
        }
        Ok(self.groups.intern(name))
    }

    fn class_escape(&self, test: CharTest, negated: bool) -> Expr {
        let test = if negated { test.negate() } else { test };
        Expr::Char {
            test,
            ignore_case: self.ignore_case(),
        }
    }

    fn literal(&self, c: char) -> Expr {
        Expr::Char {
            test: CharTest::Literal(c),
            ignore_case: self.ignore_case(),
        }
    }

    fn ignore_case(&self) -> bool {
        self.flags.is_set(Options::IGNORE_CASE)
    }

    fn multi_line(&self) -> bool {
        self.flags.is_set(Options::MULTI_LINE)
    }

    fn single_line(&self) -> bool {
        self.flags.is_set(Options::SINGLE_LINE)
    }

    fn ignore_whitespace(&self) -> bool {
        self.flags.is_set(Options::IGNORE_WHITESPACE)
    }
}

enum ClassMember {
    Single(char),
    Test(CharTest),
}

impl ClassMember {
    fn into_test(self) -> CharTest {
        match self {
            ClassMember::Single(c) => CharTest::Literal(c),
            ClassMember::Test(test) => test,
        }
    }
}

/// The post-parse pass: rewrites every placeholder left by the parser now
/// that the group table is complete.
fn resolve(expr: &mut Expr, groups: &GroupTable) -> Result<()> {
    match expr {
        Expr::Sequence(children) => {
            for child in children {
                resolve(child, groups)?;
            }
            Ok(())
        }
        Expr::Alternation(left, right) => {
            resolve(left, groups)?;
            resolve(right, groups)
        }
        Expr::Repetition { inner, .. } | Expr::Group { inner, .. } => resolve(inner, groups),
        Expr::Atomic(inner) => resolve(inner, groups),
        Expr::Balancing { pop, inner, .. } => {
            if let LateGroup::Name { pos, name } = pop {
                let id = lookup(groups, name).ok_or_else(|| Error::UndefinedGroup {
                    pos: *pos,
                    name: name.clone(),
                })?;
                *pop = LateGroup::Id(id);
            }
            resolve(inner, groups)
        }
        Expr::Anchor(anchor) => resolve_anchor(anchor, groups),
        Expr::Conditional { cond, yes, no } => {
            if let Cond::Pending {
                pos,
                name,
                ignore_case,
            } = cond
            {
                *cond = if let Some(id) = lookup(groups, name) {
                    Cond::Group(id)
                } else if name.chars().all(|c| c.is_ascii_digit()) {
                    // a number that names no group cannot fall back to a
                    // literal lookahead
                    return Err(Error::ConditionalGroup {
                        pos: *pos,
                        name: name.clone(),
                    });
                } else {
                    let ignore_case = *ignore_case;
                    let literals = name
                        .chars()
                        .map(|c| Expr::Char {
                            test: CharTest::Literal(c),
                            ignore_case,
                        })
                        .collect();
                    Cond::Test(Box::new(Anchor::lookahead(
                        Expr::Sequence(literals),
                        false,
                    )))
                };
            }
            if let Cond::Test(anchor) = cond {
                resolve_anchor(anchor, groups)?;
            }
            resolve(yes, groups)?;
            resolve(no, groups)
        }
        Expr::Proxy { pending, inverted } => {
            let mut replacement = match pending {
                Pending::Name {
                    pos,
                    name,
                    ignore_case,
                } => {
                    let id = lookup(groups, name).ok_or_else(|| Error::UndefinedGroup {
                        pos: *pos,
                        name: name.clone(),
                    })?;
                    Expr::Reference {
                        id,
                        ignore_case: *ignore_case,
                    }
                }
                Pending::Number {
                    pos,
                    digits,
                    ignore_case,
                } => match lookup(groups, digits) {
                    Some(id) => Expr::Reference {
                        id,
                        ignore_case: *ignore_case,
                    },
                    None => salvage_octal(*pos, digits, *ignore_case)?,
                },
            };
            if *inverted {
                replacement.invert();
            }
            *expr = replacement;
            Ok(())
        }
        Expr::Char { .. } | Expr::Reference { .. } => Ok(()),
    }
}

fn resolve_anchor(anchor: &mut Anchor, groups: &GroupTable) -> Result<()> {
    if let Some(left) = &mut anchor.left {
        resolve(left, groups)?;
    }
    if let Some(right) = &mut anchor.right {
        resolve(right, groups)?;
    }
    Ok(())
}

/// Resolves a reference name against the table. All-digit names refer to the
/// numbered group regardless of leading zeros.
fn lookup(groups: &GroupTable, name: &str) -> Option<GroupId> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        let normalized = name.trim_start_matches('0');
        let normalized = if normalized.is_empty() { "0" } else { normalized };
        groups.lookup(normalized)
    } else {
        groups.lookup(name)
    }
}

/// Turns an unresolvable `\NNN` into an octal escape plus literal leftover
/// digits.
fn salvage_octal(pos: usize, digits: &str, ignore_case: bool) -> Result<Expr> {
    let chars: Vec<char> = digits.chars().collect();
    if !matches!(chars.first(), Some('1'..='7')) {
        return Err(Error::UndefinedGroup {
            pos,
            name: digits.to_string(),
        });
    }
    let mut value = 0;
    let mut taken = 0;
    while taken < 3 && taken < chars.len() {
        let Some(digit) = chars[taken].to_digit(8) else {
            break;
        };
        value = value * 8 + digit;
        taken += 1;
    }
    let mut items = vec![Expr::Char {
        test: CharTest::Literal(char::from((value % 0x100) as u8)),
        ignore_case,
    }];
    items.extend(chars[taken..].iter().map(|&c| Expr::Char {
        test: CharTest::Literal(c),
        ignore_case,
    }));
    Ok(match items.len() {
        1 => items.remove(0),
        _ => Expr::Sequence(items),
    })
}
