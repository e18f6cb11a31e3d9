use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

fn num(value: f64) -> TokenKind {
    TokenKind::Number(FloatBits::new(value))
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("1 1.5e-3 .5 1e+3"),
        vec![num(1.0), num(1.5e-3), num(0.5), num(1000.0), TokenKind::Eof]
    );
}

#[test]
fn test_strings_both_quotes() {
    assert_eq!(
        kinds(r#""a\nb" 'c'"#),
        vec![
            TokenKind::String("a\nb".to_string()),
            TokenKind::String("c".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("if x then y else to_x"),
        vec![
            TokenKind::If,
            TokenKind::Ident("x".to_string()),
            TokenKind::Then,
            TokenKind::Ident("y".to_string()),
            TokenKind::Else,
            TokenKind::Ident("to_x".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_dot_operators_win_over_dot() {
    assert_eq!(
        kinds("a .* b .^ c -> d"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::DotStar,
            TokenKind::Ident("b".to_string()),
            TokenKind::DotCaret,
            TokenKind::Ident("c".to_string()),
            TokenKind::Arrow,
            TokenKind::Ident("d".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_comments_are_trivia() {
    let tokens = lex("x // line\n/* block\n */ y");
    assert_eq!(tokens.len(), 3);
    assert!(tokens[1].starts_line());
    assert_eq!(tokens[1].kind, TokenKind::Ident("y".to_string()));
}

#[test]
fn test_block_comments_inline() {
    assert_eq!(
        kinds("x /* b */ y"),
        vec![
            TokenKind::Ident("x".to_string()),
            TokenKind::Ident("y".to_string()),
            TokenKind::Eof,
        ]
    );
    assert_eq!(kinds("1 /** starred **/ / 2")[1], TokenKind::Slash);
    let tokens = lex("a/* glued */b");
    assert!(!tokens[1].is_glued());
    assert!(!tokens[1].starts_line());
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(
        kinds("1 /* never closed"),
        vec![
            num(1.0),
            TokenKind::Error(LexErrorKind::UnterminatedComment),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_flags_record_glued_and_newline() {
    let tokens = lex("5k\nx = 1");
    assert_eq!(tokens[0].kind, num(5.0));
    assert!(tokens[1].is_glued());
    assert!(!tokens[2].is_glued());
    assert!(tokens[2].starts_line());
    assert!(!tokens[3].starts_line());
    assert!(tokens[3].flags.contains(TokenFlags::SPACE_BEFORE));
}

#[test]
fn test_spans() {
    let tokens = lex("ab + 12");
    assert_eq!(tokens[0].span, Span::new(0, 2));
    assert_eq!(tokens[1].span, Span::new(3, 4));
    assert_eq!(tokens[2].span, Span::new(5, 7));
    assert_eq!(tokens[3].span, Span::new(7, 7));
}

#[test]
fn test_unexpected_character() {
    assert_eq!(
        kinds("1 # 2")[1],
        TokenKind::Error(LexErrorKind::UnexpectedCharacter('#'))
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        kinds("\"abc")[0],
        TokenKind::Error(LexErrorKind::UnterminatedString)
    );
}

#[test]
fn test_invalid_escape() {
    assert_eq!(
        kinds(r#""\q""#)[0],
        TokenKind::Error(LexErrorKind::InvalidEscape(EscapeError::Unknown('q')))
    );
}

#[test]
fn test_describe() {
    assert_eq!(TokenKind::RParen.describe(), "\")\"");
    assert_eq!(TokenKind::Eof.describe(), "end of input");
    assert_eq!(TokenKind::Ident("x".into()).describe(), "identifier `x`");
}
