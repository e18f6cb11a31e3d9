use std::path::PathBuf;

use pretty_assertions::assert_eq;
use salsa::Setter;
use sq_project::RunnerKind;
use sq_value::Env;

use super::*;
use crate::commands::Terminal;
use crate::options::{parse_args, run_env, Command, Input, RunOptions};
use crate::query::{compiled, parsed, CompileFailure};

fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn run_options(line: &str) -> RunOptions {
    match parse_args(&args(line)).unwrap() {
        Command::Run(options) => options,
        other => panic!("expected a run command, got {other:?}"),
    }
}

/// Run a command against in-memory writers; returns (code, stdout, stderr).
fn capture(f: impl FnOnce(&mut Terminal<'_>) -> i32) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = f(&mut Terminal {
        out: &mut out,
        err: &mut err,
        colors: false,
    });
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn run_eval(code: &str, show_bindings: bool) -> (i32, String, String) {
    let options = RunOptions {
        input: Input::Eval(code.to_string()),
        quiet: false,
        show_bindings,
        time: false,
        runner: RunnerKind::Embedded,
        seed: None,
        sample_count: Some(100),
    };
    let env = run_env(&options, None).unwrap();
    capture(|terminal| commands::run(&options, env, false, terminal))
}

#[test]
fn test_parse_run_args() {
    let options = run_options("run model.squiggle --show-bindings --time --runner worker --seed abc --sample-count 500");
    assert_eq!(options.input, Input::File(PathBuf::from("model.squiggle")));
    assert!(options.show_bindings && options.time && !options.quiet);
    assert_eq!(options.runner, RunnerKind::Worker);
    assert_eq!(options.seed.as_deref(), Some("abc"));
    assert_eq!(options.sample_count, Some(500));

    let eval = run_options("run --eval 1 --quiet");
    assert_eq!(eval.input, Input::Eval("1".to_string()));
    assert!(eval.quiet);
    assert_eq!(eval.runner, RunnerKind::Embedded);
}

#[test]
fn test_bad_args_are_errors() {
    for line in [
        "run",
        "run a.squiggle --eval 1",
        "run --eval 1 --quiet --show-bindings",
        "run --eval 1 --runner remote",
        "run --eval 1 --sample-count 0",
        "run --eval",
        "run --eval 1 --frobnicate",
        "parse a b",
        "frobnicate",
    ] {
        assert!(parse_args(&args(line)).is_err(), "`{line}` should be rejected");
    }
}

#[test]
fn test_other_commands() {
    assert_eq!(
        parse_args(&args("parse --eval 1 --raw")).unwrap(),
        Command::Parse {
            input: Input::Eval("1".to_string()),
            raw: true
        }
    );
    assert_eq!(
        parse_args(&args("print-ir x.squiggle")).unwrap(),
        Command::PrintIr {
            input: Input::File(PathBuf::from("x.squiggle"))
        }
    );
    assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    assert_eq!(parse_args(&args("help")).unwrap(), Command::Help);
    assert_eq!(parse_args(&args("version")).unwrap(), Command::Version);
}

#[test]
fn test_run_env_layers() {
    let defaults = run_env(&run_options("run --eval 1"), None).unwrap();
    assert_eq!(defaults, Env::default());

    let from_var = run_env(&run_options("run --eval 1"), Some("300")).unwrap();
    assert_eq!(from_var.sample_count, 300);
    assert_eq!(from_var.xy_point_length, 300);

    let flag_wins = run_env(
        &run_options("run --eval 1 --sample-count 50 --seed s"),
        Some("300"),
    )
    .unwrap();
    assert_eq!(flag_wins.sample_count, 50);
    assert_eq!(flag_wins.seed, "s");

    assert!(run_env(&run_options("run --eval 1"), Some("lots")).is_err());
}

#[test]
fn test_queries_are_cached() {
    let mut db = CompilerDb::default();
    let file = SourceFile::new(&db, "main".to_string(), "x = 1\nx + 1".to_string());
    db.enable_logging();

    assert!(parsed(&db, file).is_ok());
    assert!(compiled(&db, file).is_ok());
    assert!(!db.take_logs().is_empty());

    assert!(compiled(&db, file).is_ok());
    assert!(db.take_logs().is_empty());

    file.set_text(&mut db).to("x = (".to_string());
    assert!(matches!(compiled(&db, file), Err(CompileFailure::Syntax(_))));
    assert!(!db.take_logs().is_empty());
}

#[test]
fn test_compiled_treats_imports_as_externals() {
    let db = CompilerDb::default();
    let file = SourceFile::new(
        &db,
        "main".to_string(),
        "import \"./lib.squiggle\" as lib\nlib.x".to_string(),
    );
    assert!(compiled(&db, file).is_ok());

    let undefined = SourceFile::new(&db, "other".to_string(), "y + 1".to_string());
    let err = compiled(&db, undefined).unwrap_err();
    assert!(matches!(err, CompileFailure::Compile(_)));
    assert_eq!(err.to_diagnostic().message, "`y` is not defined");
}

#[test]
fn test_run_prints_result_or_bindings() {
    assert_eq!(run_eval("1 + 2", false), (0, "3\n".to_string(), String::new()));
    assert_eq!(run_eval("x = 5", false), (0, "{x: 5}\n".to_string(), String::new()));
    assert_eq!(
        run_eval("x = 5\nx * 2", true),
        (0, "Bindings: {x: 5}\nResult: 10\n".to_string(), String::new())
    );
}

#[test]
fn test_run_reports_errors() {
    let (code, out, err) = run_eval("f(x, y) = x + y\nf(1)", false);
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert!(err.contains("2 arguments expected. Instead 1 argument(s) were passed."));

    let (code, _, err) = run_eval("g(h) = h(1, 2)\ng({|x| x})", false);
    assert_eq!(code, 1);
    assert!(err.contains("1 arguments expected"));
    assert!(err.contains("note"));
}

#[test]
fn test_parse_and_print_ir() {
    let input = Input::Eval("x = 1".to_string());
    let (code, out, _) = capture(|terminal| commands::parse(&input, false, terminal));
    assert_eq!(code, 0);
    assert_eq!(out, "(Program (LetStatement :x (Block 1)))\n");

    let (code, out, _) = capture(|terminal| commands::parse(&input, true, terminal));
    assert_eq!(code, 0);
    assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());

    let (code, out, _) = capture(|terminal| commands::print_ir(&input, terminal));
    assert_eq!(code, 0);
    assert!(!out.trim().is_empty());

    let bad = Input::Eval("x = (".to_string());
    let (code, out, err) = capture(|terminal| commands::parse(&bad, false, terminal));
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert!(err.contains("error"));
}
