//! The fixed metacharacter escape mapping.

use crate::{Error, Result};

/// Characters that [`escape`] prefixes with a backslash. Whitespace control
/// characters are rendered with their letter forms instead.
const METACHARACTERS: &str = "\\*+?|{[()^$.# ";

/// Escapes the closed metacharacter set so `text` matches itself.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\x0c' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            c if METACHARACTERS.contains(c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Decodes every backslash escape in `text`.
///
/// Recognizes the character escapes the pattern language itself accepts:
/// the control-letter forms, octal, `\xHH`, `\uHHHH`, `\cX`, and escaped
/// punctuation. A backslash before any other alphanumeric, or a trailing
/// backslash, is an error.
pub(crate) fn unescape(text: &str) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut unescaped = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        let pos = i - 1;
        let Some(&escape) = chars.get(i) else {
            return Err(Error::UnexpectedEnd {
                pos,
                expected: "an escape after `\\`",
            });
        };
        i += 1;
        match escape {
            'a' => unescaped.push('\x07'),
            'b' => unescaped.push('\x08'),
            't' => unescaped.push('\t'),
            'n' => unescaped.push('\n'),
            'v' => unescaped.push('\x0b'),
            'f' => unescaped.push('\x0c'),
            'r' => unescaped.push('\r'),
            'e' => unescaped.push('\x1b'),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                let mut taken = 1;
                while taken < 3
                    && let Some(digit) = chars.get(i).and_then(|c| c.to_digit(8))
                {
                    value = value * 8 + digit;
                    taken += 1;
                    i += 1;
                }
                unescaped.push(char::from((value % 0x100) as u8));
            }
            'x' => {
                let value = hex(&chars, &mut i, 2).ok_or(Error::InvalidHex { pos })?;
                unescaped.push(char::from(value as u8));
            }
            'u' => {
                let value = hex(&chars, &mut i, 4).ok_or(Error::InvalidHex { pos })?;
                let c = char::from_u32(value).ok_or(Error::InvalidHex { pos })?;
                unescaped.push(c);
            }
            'c' => {
                let letter = chars
                    .get(i)
                    .filter(|c| c.is_ascii_alphabetic())
                    .ok_or(Error::InvalidControl { pos })?;
                unescaped.push(char::from((letter.to_ascii_uppercase() as u8) ^ 0x40));
                i += 1;
            }
            c if c.is_ascii_alphanumeric() => {
                return Err(Error::InvalidEscape { pos, lit: c });
            }
            c => unescaped.push(c),
        }
    }

    Ok(unescaped)
}

fn hex(chars: &[char], i: &mut usize, count: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..count {
        let digit = chars.get(*i).and_then(|c| c.to_digit(16))?;
        value = value * 16 + digit;
        *i += 1;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_the_closed_set() {
        assert_eq!(escape(r"1+1=2?"), r"1\+1=2\?");
        assert_eq!(escape("a b\tc\n"), "a\\ b\\tc\\n");
        assert_eq!(escape("[](){}"), r"\[]\(\)\{}");
    }

    #[test]
    fn unescape_inverts_escape() {
        let original = r"a*b+c?$^(){}[]|\. #";
        assert_eq!(unescape(&escape(original)).unwrap(), original);
    }

    #[test]
    fn unescape_decodes_codes() {
        assert_eq!(unescape(r"\x41B\cC\101").unwrap(), "AB\x03A");
        assert_eq!(
            unescape(r"\q"),
            Err(Error::InvalidEscape { pos: 0, lit: 'q' })
        );
    }

    #[test]
    fn escape_is_stable_through_a_round_trip() {
        let text = "tab\there (and) $5.00 [ok]?";
        let once = escape(text);
        assert_eq!(escape(&unescape(&once).unwrap()), once);
    }
}
