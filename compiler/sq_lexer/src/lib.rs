//! Lexer for Squiggle using logos.
//!
//! Whitespace and comments are skipped; instead of newline tokens, each token
//! records in [`TokenFlags`] whether trivia (and specifically a newline)
//! preceded it. The parser uses that to separate statements and to recognize
//! glued constructs such as unit suffixes (`5k`) and qualified names
//! (`Dist.normal`).

mod escape;
mod raw_token;

use bitflags::bitflags;
use logos::Logos;
use raw_token::RawToken;
use sq_ir::{FloatBits, Span};

pub use escape::EscapeError;

bitflags! {
    /// Trivia that preceded a token.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TokenFlags: u8 {
        /// Whitespace or a comment sits between this token and the previous one.
        const SPACE_BEFORE = 1 << 0;
        /// The trivia before this token contains a line break.
        const NEWLINE_BEFORE = 1 << 1;
    }
}

/// Why a region of source could not be tokenized.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexErrorKind {
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape(EscapeError),
    InvalidNumber,
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrorKind::UnexpectedCharacter(c) => write!(f, "Unexpected character {c:?}"),
            LexErrorKind::UnterminatedString => write!(f, "Unterminated string"),
            LexErrorKind::UnterminatedComment => write!(f, "Unterminated block comment"),
            LexErrorKind::InvalidEscape(e) => write!(f, "{e}"),
            LexErrorKind::InvalidNumber => write!(f, "Invalid number"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    Number(FloatBits),
    String(String),
    Ident(String),

    If,
    Then,
    Else,
    True,
    False,
    To,
    Import,
    As,
    Export,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    DoubleColon,
    Colon,
    Question,
    At,
    Bar,
    Percent,

    Arrow,
    EqEq,
    Eq,
    NotEq,
    LtEq,
    Lt,
    GtEq,
    Gt,
    AmpAmp,
    PipePipe,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    DotPlus,
    DotMinus,
    DotStar,
    DotSlash,
    DotCaret,
    Dot,

    Error(LexErrorKind),
    Eof,
}

impl TokenKind {
    /// Human-readable description used in "Expected ..." messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", sq_ir::format_number(n.get())),
            TokenKind::String(s) => format!("string {s:?}"),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Error(kind) => kind.to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("\"{}\"", other.symbol()),
        }
    }

    /// Source spelling of keyword and punctuation tokens.
    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::To => "to",
            TokenKind::Import => "import",
            TokenKind::As => "as",
            TokenKind::Export => "export",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::DoubleColon => "::",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::At => "@",
            TokenKind::Bar => "|",
            TokenKind::Percent => "%",
            TokenKind::Arrow => "->",
            TokenKind::EqEq => "==",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::Lt => "<",
            TokenKind::GtEq => ">=",
            TokenKind::Gt => ">",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::DotPlus => ".+",
            TokenKind::DotMinus => ".-",
            TokenKind::DotStar => ".*",
            TokenKind::DotSlash => "./",
            TokenKind::DotCaret => ".^",
            TokenKind::Dot => ".",
            TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::Ident(_)
            | TokenKind::Error(_)
            | TokenKind::Eof => "",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub flags: TokenFlags,
}

impl Token {
    /// True when no trivia separates this token from the previous one.
    #[inline]
    pub fn is_glued(&self) -> bool {
        !self.flags.contains(TokenFlags::SPACE_BEFORE)
    }

    #[inline]
    pub fn starts_line(&self) -> bool {
        self.flags.contains(TokenFlags::NEWLINE_BEFORE)
    }
}

/// Lex source text into tokens, always ending with `Eof`.
///
/// Lexing never fails as a whole: unrecognized input becomes an
/// `Error` token and the parser reports it with its span.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    let mut prev_end = 0usize;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let flags = trivia_flags(&source[prev_end..range.start]);
        let span = span_of(range.clone());
        let slice = lexer.slice();
        let kind = match result {
            Ok(raw) => convert(raw, slice),
            Err(()) => error_kind(slice),
        };
        tokens.push(Token { kind, span, flags });
        prev_end = range.end;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: span_of(source.len()..source.len()),
        flags: trivia_flags(&source[prev_end..]),
    });
    tokens
}

fn span_of(range: std::ops::Range<usize>) -> Span {
    // Sources above 4GiB are clamped rather than rejected; spans only feed diagnostics.
    Span::try_from_range(range).unwrap_or(Span::point(u32::MAX))
}

fn trivia_flags(gap: &str) -> TokenFlags {
    let mut flags = TokenFlags::empty();
    if !gap.is_empty() {
        flags |= TokenFlags::SPACE_BEFORE;
    }
    if gap.contains('\n') {
        flags |= TokenFlags::NEWLINE_BEFORE;
    }
    flags
}

fn error_kind(slice: &str) -> TokenKind {
    if slice.starts_with("/*") {
        return TokenKind::Error(LexErrorKind::UnterminatedComment);
    }
    let kind = match slice.chars().next() {
        Some('"' | '\'') => LexErrorKind::UnterminatedString,
        Some(c) => LexErrorKind::UnexpectedCharacter(c),
        None => LexErrorKind::UnexpectedCharacter('\0'),
    };
    TokenKind::Error(kind)
}

fn convert(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Number => match slice.parse::<f64>() {
            Ok(value) => TokenKind::Number(FloatBits::new(value)),
            Err(_) => TokenKind::Error(LexErrorKind::InvalidNumber),
        },
        RawToken::DoubleQuoted | RawToken::SingleQuoted => {
            match escape::unescape(&slice[1..slice.len() - 1]) {
                Ok(text) => TokenKind::String(text),
                Err(e) => TokenKind::Error(LexErrorKind::InvalidEscape(e)),
            }
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        // The callback only ever skips or fails.
        RawToken::BlockComment => TokenKind::Error(LexErrorKind::UnterminatedComment),

        RawToken::If => TokenKind::If,
        RawToken::Then => TokenKind::Then,
        RawToken::Else => TokenKind::Else,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::To => TokenKind::To,
        RawToken::Import => TokenKind::Import,
        RawToken::As => TokenKind::As,
        RawToken::Export => TokenKind::Export,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::DoubleColon => TokenKind::DoubleColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::At => TokenKind::At,
        RawToken::Bar => TokenKind::Bar,
        RawToken::Percent => TokenKind::Percent,

        RawToken::Arrow => TokenKind::Arrow,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Caret => TokenKind::Caret,
        RawToken::DotPlus => TokenKind::DotPlus,
        RawToken::DotMinus => TokenKind::DotMinus,
        RawToken::DotStar => TokenKind::DotStar,
        RawToken::DotSlash => TokenKind::DotSlash,
        RawToken::DotCaret => TokenKind::DotCaret,
        RawToken::Dot => TokenKind::Dot,
    }
}

#[cfg(test)]
mod tests;
