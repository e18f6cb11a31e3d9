#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test code; panics give clear failure messages"
)]

//! End-to-end runs of the `sqc` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn sqc(args: &[&str]) -> Output {
    sqc_in(Path::new("."), args, &[])
}

fn sqc_in(dir: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sqc"));
    command
        .args(args)
        .current_dir(dir)
        .env_remove("SAMPLE_COUNT")
        .env_remove("RUST_LOG")
        .env_remove("PRINT_SERIALIZED_BUNDLE");
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output().expect("sqc should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("sqc-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }

    fn write(&self, name: &str, code: &str) {
        let path = self.0.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, code).unwrap();
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn eval_prints_the_result() {
    let output = sqc(&["run", "--eval", "1 + 2"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "3\n");
}

#[test]
fn eval_without_a_result_prints_bindings() {
    let output = sqc(&["run", "--eval", "x = 5"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "{x: 5}\n");
}

#[test]
fn errors_exit_non_zero() {
    let output = sqc(&["run", "--eval", "f(x, y) = x + y\nf(1)"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("2 arguments expected"));
}

#[test]
fn quiet_prints_nothing_on_success() {
    let output = sqc(&["run", "--eval", "1 + 2", "--quiet"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn time_is_reported() {
    let output = sqc(&["run", "--eval", "1", "--time"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("1\nTime: "), "{text}");
}

#[test]
fn bad_arguments_print_usage() {
    let output = sqc(&["run", "--eval", "1", "--quiet", "--show-bindings"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage: sqc"));
}

#[test]
fn every_runner_agrees() {
    for runner in ["embedded", "embedded-with-serialization", "worker"] {
        let output = sqc(&["run", "--eval", "x = 3\nx * 4", "--runner", runner]);
        assert!(output.status.success(), "{runner}: {}", stderr(&output));
        assert_eq!(stdout(&output), "12\n", "{runner}");
    }
}

#[test]
fn serialized_bundles_can_be_dumped() {
    let output = sqc_in(
        Path::new("."),
        &["run", "--eval", "1", "--runner", "embedded-with-serialization"],
        &[("PRINT_SERIALIZED_BUNDLE", "1")],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1\n");
    assert!(stderr(&output).contains("\"values\""));
}

#[test]
fn sample_count_comes_from_the_environment() {
    let output = sqc_in(
        Path::new("."),
        &["run", "--eval", "List.length(SampleSet.toList(SampleSet.fromDist(normal(0, 1))))"],
        &[("SAMPLE_COUNT", "123")],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "123\n");

    let flag = sqc_in(
        Path::new("."),
        &[
            "run",
            "--eval",
            "List.length(SampleSet.toList(SampleSet.fromDist(normal(0, 1))))",
            "--sample-count",
            "7",
        ],
        &[("SAMPLE_COUNT", "123")],
    );
    assert_eq!(stdout(&flag), "7\n");
}

#[test]
fn files_import_their_neighbours() {
    let dir = TempDir::new("imports");
    dir.write("lib/constants.squiggle", "rate = 2");
    dir.write("main.squiggle", "import \"./lib/constants.squiggle\" as c\nc.rate * 21");

    let output = sqc_in(&dir.0, &["run", "main.squiggle"], &[]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "42\n");
}

#[test]
fn parse_and_print_ir() {
    let parsed = sqc(&["parse", "--eval", "1 + 2"]);
    assert!(parsed.status.success());
    assert_eq!(stdout(&parsed), "(Program (InfixCall + 1 2))\n");

    let raw = sqc(&["parse", "--eval", "1 + 2", "--raw"]);
    assert!(raw.status.success());
    assert!(stdout(&raw).trim_start().starts_with('{'));

    let ir = sqc(&["print-ir", "--eval", "1 + 2"]);
    assert!(ir.status.success());
    assert!(!stdout(&ir).trim().is_empty());
}

#[test]
fn version_and_help() {
    let version = sqc(&["version"]);
    assert!(version.status.success());
    assert!(stdout(&version).starts_with("sqc "));

    let help = sqc(&["help"]);
    assert!(help.status.success());
    assert!(stdout(&help).contains("print-ir"));
}
