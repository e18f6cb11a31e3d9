use super::*;
use pretty_assertions::assert_eq;
use sq_diagnostic::ErrorCode;
use sq_ir::NodeKind;

fn sexpr(source: &str) -> String {
    parse(source, "test").unwrap().to_sexpr()
}

fn error(source: &str) -> SyntaxError {
    parse(source, "test").unwrap_err()
}

#[test]
fn test_let_statement_wraps_value_in_block() {
    assert_eq!(sexpr("x = 1"), "(Program (LetStatement :x (Block 1)))");
}

#[test]
fn test_infix_and_precedence() {
    assert_eq!(sexpr("1 + 2"), "(Program (InfixCall + 1 2))");
    assert_eq!(
        sexpr("1 + 2 * 3"),
        "(Program (InfixCall + 1 (InfixCall * 2 3)))"
    );
    assert_eq!(
        sexpr("1 - 2 - 3"),
        "(Program (InfixCall - (InfixCall - 1 2) 3))"
    );
    assert_eq!(
        sexpr("2 ^ 3 ^ 2"),
        "(Program (InfixCall ^ 2 (InfixCall ^ 3 2)))"
    );
    assert_eq!(
        sexpr("a < b && c || d"),
        "(Program (InfixCall || (InfixCall && (InfixCall < :a :b) :c) :d))"
    );
    assert_eq!(
        sexpr("1 to 2 + 3"),
        "(Program (InfixCall to 1 (InfixCall + 2 3)))"
    );
}

#[test]
fn test_unary() {
    assert_eq!(sexpr("-x"), "(Program (UnaryCall - :x))");
    assert_eq!(sexpr("!true"), "(Program (UnaryCall ! true))");
}

#[test]
fn test_pipe() {
    assert_eq!(sexpr("1 -> add(2)"), "(Program (Pipe 1 :add 2))");
    assert_eq!(
        sexpr("x -> Dist.normal(1) -> mean"),
        "(Program (Pipe (Pipe :x :Dist.normal 1) :mean))"
    );
}

#[test]
fn test_defun() {
    assert_eq!(
        sexpr("f(x) = x"),
        "(Program (DefunStatement :f (Lambda :x (Block :x))))"
    );
    assert_eq!(
        sexpr("f(x: [0, 10]) = x"),
        "(Program (DefunStatement :f (Lambda (IdentifierWithAnnotation :x (Array 0 10)) (Block :x))))"
    );
}

#[test]
fn test_call_is_not_defun() {
    assert_eq!(sexpr("f(1)"), "(Program (Call :f 1))");
    assert_eq!(
        sexpr("f(x, y) = x + y\nf(1)"),
        "(Program (DefunStatement :f (Lambda :x :y (Block (InfixCall + :x :y)))) (Call :f 1))"
    );
}

#[test]
fn test_lambda_let_is_named_not_wrapped() {
    let program = parse("f = {|x, y| x + y}", "test").unwrap();
    assert_eq!(
        program.to_sexpr(),
        "(Program (LetStatement :f (Lambda :x :y (Block (InfixCall + :x :y)))))"
    );
    let NodeKind::Program { statements, .. } = &program.kind else {
        panic!("expected program");
    };
    let NodeKind::LetStatement { value, .. } = &statements[0].kind else {
        panic!("expected let");
    };
    assert!(matches!(&value.kind, NodeKind::Lambda { name: Some(n), .. } if n == "f"));
}

#[test]
fn test_zero_arg_lambda() {
    assert_eq!(sexpr("{|| 5}"), "(Program (Lambda (Block 5)))");
}

#[test]
fn test_dict_and_shorthand() {
    assert_eq!(
        sexpr("{a: 1, b}"),
        "(Program (Dict (KeyValue 'a' 1) :b))"
    );
    assert_eq!(
        sexpr("{\"a b\": 1,\n c: 2,\n}"),
        "(Program (Dict (KeyValue 'a b' 1) (KeyValue 'c' 2)))"
    );
    assert_eq!(sexpr("{}"), "(Program (Dict))");
}

#[test]
fn test_block_with_statements() {
    assert_eq!(
        sexpr("x = {y = 2; y * 2}"),
        "(Program (LetStatement :x (Block (LetStatement :y (Block 2)) (InfixCall * :y 2))))"
    );
}

#[test]
fn test_ternaries() {
    assert_eq!(
        sexpr("if true then {2} else {3}"),
        "(Program (Ternary true (Block 2) (Block 3)))"
    );
    assert_eq!(sexpr("true ? 1 : 2"), "(Program (Ternary true 1 2))");
    assert_eq!(
        sexpr("if a then 1 else if b then 2 else 3"),
        "(Program (Ternary :a 1 (Ternary :b 2 3)))"
    );
}

#[test]
fn test_units() {
    assert_eq!(sexpr("1m"), "(Program (UnitValue 1 m))");
    assert_eq!(sexpr("5%"), "(Program (UnitValue 5 %))");
    let err = error("1q");
    assert_eq!(err.code, ErrorCode::E1002);
    assert_eq!(err.message, "Unknown unit `q`");
}

#[test]
fn test_export() {
    assert_eq!(
        sexpr("export x = 5"),
        "(Program (LetStatement export :x (Block 5)))"
    );
}

#[test]
fn test_decorators() {
    assert_eq!(
        sexpr("@name(\"X\")\n@hide\nx = 1"),
        "(Program (LetStatement (Decorator :name 'X') (Decorator :hide) :x (Block 1)))"
    );
    assert_eq!(
        error("@hide\n1").message,
        "Expected variable definition, but number 1 found."
    );
}

#[test]
fn test_qualified_identifiers() {
    assert_eq!(sexpr("Math.pi"), "(Program :Math.pi)");
    assert_eq!(sexpr("a.b.c"), "(Program (DotLookup (DotLookup :a b) c))");
    assert_eq!(sexpr("a[0]"), "(Program (BracketLookup :a 0))");
    assert_eq!(sexpr("Math . pi"), "(Program (DotLookup :Math pi))");
}

#[test]
fn test_imports() {
    assert_eq!(
        sexpr("import \"./a\" as a\na.x"),
        "(Program (Import './a' :a) (DotLookup :a x))"
    );
    assert_eq!(error("x = 1\nimport \"a\" as a").code, ErrorCode::E1003);
}

#[test]
fn test_newlines_separate_statements() {
    assert_eq!(
        sexpr("x = 1\ny = 2\nx + y"),
        "(Program (LetStatement :x (Block 1)) (LetStatement :y (Block 2)) (InfixCall + :x :y))"
    );
    assert_eq!(
        sexpr("x = 1\n  + 2"),
        "(Program (LetStatement :x (Block (InfixCall + 1 2))))"
    );
    assert_eq!(
        sexpr("x = 1\n-2"),
        "(Program (LetStatement :x (Block 1)) (UnaryCall - 2))"
    );
    assert_eq!(sexpr("f(\n1,\n2,\n)"), "(Program (Call :f 1 2))");
    assert_eq!(sexpr("x = 1;\ny = 2;"), "(Program (LetStatement :x (Block 1)) (LetStatement :y (Block 2)))");
}

#[test]
fn test_statements_need_separator() {
    let err = error("x = 1 y = 2");
    assert_eq!(err.code, ErrorCode::E1001);
    assert_eq!(
        err.message,
        "Expected \";\" or a new line, but identifier `y` found."
    );
}

#[test]
fn test_expression_must_be_last() {
    assert_eq!(
        error("1\nx = 2").message,
        "Expected end of input, but identifier `x` found."
    );
}

#[test]
fn test_unclosed_paren() {
    let err = error("(1 + 2");
    assert_eq!(err.message, "Expected \")\", but end of input found.");
    assert_eq!(err.span, Span::new(6, 6));
}

#[test]
fn test_block_requires_final_expression() {
    assert!(error("x = {y = 1}")
        .message
        .starts_with("Expected a final expression in block"));
}

#[test]
fn test_lex_errors_have_lexer_codes() {
    assert_eq!(error("1 # 2").code, ErrorCode::E0001);
    assert_eq!(error("\"abc").code, ErrorCode::E0002);
    assert_eq!(error(r#""\q""#).code, ErrorCode::E0003);
}

#[test]
fn test_spans() {
    let program = parse("x = 1\ny = 22", "test").unwrap();
    assert_eq!(program.span, Span::new(0, 12));
    let NodeKind::Program { statements, .. } = &program.kind else {
        panic!("expected program");
    };
    assert_eq!(statements[0].span, Span::new(0, 5));
    assert_eq!(statements[1].span, Span::new(6, 12));
}

#[test]
fn test_comments_ignored() {
    assert_eq!(
        sexpr("// leading\nx = 1 /* inline */\nx // trailing"),
        "(Program (LetStatement :x (Block 1)) :x)"
    );
}

#[test]
fn test_block_comment_inside_expression() {
    assert_eq!(
        sexpr("x = /* c */ 3"),
        "(Program (LetStatement :x (Block 3)))"
    );
    assert_eq!(error("x = 1 /* open").message, "Unterminated block comment");
}

#[test]
fn test_syntax_error_to_diagnostic() {
    let diag = error("1 +").to_diagnostic();
    assert_eq!(diag.code, ErrorCode::E1001);
    assert_eq!(diag.primary_span(), Some(Span::new(3, 3)));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_parse_never_panics(source in "[ -~\\n]{0,40}") {
            let _ = parse(&source, "fuzz");
        }

        #[test]
        fn test_integer_literals_roundtrip(n in 0u32..1_000_000) {
            let expected = format!("(Program {n})");
            prop_assert_eq!(sexpr(&n.to_string()), expected);
        }
    }
}
