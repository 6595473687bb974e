//! `$`-template replacement evaluation.

use super::Match;

/// What to substitute for each match during [`Regex::replace`](super::Regex::replace).
pub enum Repl<'a> {
    /// A `$`-template: `$n`, `${name}`, `$&`, `$$`, `` $` ``, `$'`, `$_`,
    /// `$+`. Unrecognized sequences stay literal.
    Template(&'a str),
    /// Called once per match with the full match object.
    Function(&'a dyn Fn(&Match) -> String),
}

/// Expands `template` against one match.
///
/// A `$`-digit run resolves to the longest prefix that names an existing
/// group; the remaining digits stay literal. A sequence that resolves to
/// nothing at all is emitted verbatim.
pub(crate) fn expand(template: &str, found: &Match) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut output = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' {
            output.push(chars[i]);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some('$') => {
                output.push('$');
                i += 2;
            }
            Some('&') => {
                output.push_str(found.value());
                i += 2;
            }
            Some('_') => {
                output.push_str(&found.whole_input());
                i += 2;
            }
            Some('`') => {
                output.push_str(&found.preceding());
                i += 2;
            }
            Some('\'') => {
                output.push_str(&found.following());
                i += 2;
            }
            Some('+') => {
                if let Some(group) = found.last_group() {
                    output.push_str(group.value());
                }
                i += 2;
            }
            Some('{') => match expand_braced(&chars, i, found) {
                Some((value, consumed)) => {
                    output.push_str(value);
                    i += consumed;
                }
                None => {
                    output.push('$');
                    i += 1;
                }
            },
            Some(c) if c.is_ascii_digit() => {
                let run: String = chars[i + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                match expand_digits(&run, found) {
                    Some((value, digits)) => {
                        output.push_str(value);
                        i += 1 + digits;
                    }
                    None => {
                        output.push('$');
                        i += 1;
                    }
                }
            }
            _ => {
                output.push('$');
                i += 1;
            }
        }
    }

    output
}

/// `${name}`: the group's value, or `None` to fall back to literal text.
fn expand_braced<'a>(chars: &[char], at: usize, found: &'a Match) -> Option<(&'a str, usize)> {
    let close = chars[at + 2..].iter().position(|&c| c == '}')?;
    let name: String = chars[at + 2..at + 2 + close].iter().collect();
    if name.is_empty() {
        return None;
    }
    let group = found.group(&name)?;
    Some((group.value(), close + 3))
}

/// `$n`: the longest digit-run prefix naming an existing group wins.
fn expand_digits<'a>(run: &str, found: &'a Match) -> Option<(&'a str, usize)> {
    for len in (1..=run.len()).rev() {
        if let Some(group) = found.group(&run[..len]) {
            return Some((group.value(), len));
        }
    }
    None
}
