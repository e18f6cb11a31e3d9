//! Escape Sequence Processing
//!
//! Recognized escapes: `\n`, `\r`, `\t`, `\b`, `\f`, `\\`, `\"`, `\'`, `\uXXXX`

use std::fmt;

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum EscapeError {
    /// `\q` and friends.
    Unknown(char),
    /// `\u` not followed by four hex digits, or naming a surrogate.
    BadUnicode(String),
    /// Backslash at the very end of the literal.
    Dangling,
}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeError::Unknown(c) => write!(f, "Invalid escape sequence \\{c}"),
            EscapeError::BadUnicode(digits) => write!(f, "Invalid unicode escape \\u{digits}"),
            EscapeError::Dangling => write!(f, "Dangling backslash in string"),
        }
    }
}

#[inline]
fn resolve_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Process the content between the quotes of a string literal.
pub(crate) fn unescape(s: &str) -> Result<String, EscapeError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let digits: String = chars.by_ref().take(4).collect();
                let decoded = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => result.push(ch),
                    None => return Err(EscapeError::BadUnicode(digits)),
                }
            }
            Some(esc) => match resolve_escape(esc) {
                Some(resolved) => result.push(resolved),
                None => return Err(EscapeError::Unknown(esc)),
            },
            None => return Err(EscapeError::Dangling),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_simple_escapes() {
        assert_eq!(unescape("abc"), Ok("abc".to_string()));
        assert_eq!(unescape(r"a\nb\t\\"), Ok("a\nb\t\\".to_string()));
        assert_eq!(unescape(r#"\"q\'"#), Ok("\"q'".to_string()));
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(unescape(r"\u00e9"), Ok("é".to_string()));
        assert_eq!(
            unescape(r"\u12"),
            Err(EscapeError::BadUnicode("12".to_string()))
        );
        assert!(matches!(unescape(r"\ud800"), Err(EscapeError::BadUnicode(_))));
    }

    #[test]
    fn test_unknown_escape_is_error() {
        assert_eq!(unescape(r"\q"), Err(EscapeError::Unknown('q')));
    }
}
