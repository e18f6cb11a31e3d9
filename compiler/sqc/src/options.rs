//! Hand-parsed command line.

use std::path::PathBuf;

use sq_project::RunnerKind;
use sq_value::Env;

/// Where the program text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Eval(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub input: Input,
    pub quiet: bool,
    pub show_bindings: bool,
    pub time: bool,
    pub runner: RunnerKind,
    pub seed: Option<String>,
    pub sample_count: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    Parse { input: Input, raw: bool },
    PrintIr { input: Input },
    Help,
    Version,
}

pub const USAGE: &str = "\
Usage: sqc <command> [options]

Commands:
  run [file | --eval code]        Run a program and print its result
      --quiet                     Print nothing; only the exit code reports failure
      --show-bindings             Print top-level bindings as well as the result
      --time                      Print how long the run took
      --runner <kind>             embedded, embedded-with-serialization or worker
      --seed <seed>               Seed for random sampling
      --sample-count <n>          Samples per distribution (overrides SAMPLE_COUNT)
  parse [file | --eval code]      Print the syntax tree
      --raw                       Print the tree as JSON
  print-ir [file | --eval code]   Print the compiled expression
  help                            Show this message
  version                         Show the version

Environment:
  SAMPLE_COUNT                    Default sample count and point-set resolution
  RUST_LOG                        Enable logging, e.g. RUST_LOG=sq_project=debug
  PRINT_SERIALIZED_BUNDLE         Dump bundles from the embedded-with-serialization runner";

/// Parse `args`, not including the program name.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    match command.as_str() {
        "run" => parse_run(rest).map(Command::Run),
        "parse" => {
            let mut raw = false;
            let input = parse_input(rest, |flag| {
                if flag == "--raw" {
                    raw = true;
                    true
                } else {
                    false
                }
            })?;
            Ok(Command::Parse { input, raw })
        }
        "print-ir" => Ok(Command::PrintIr {
            input: parse_input(rest, |_| false)?,
        }),
        "help" | "--help" | "-h" => Ok(Command::Help),
        "version" | "--version" | "-V" => Ok(Command::Version),
        other => Err(format!("Unknown command `{other}`")),
    }
}

fn parse_run(args: &[String]) -> Result<RunOptions, String> {
    let mut quiet = false;
    let mut show_bindings = false;
    let mut time = false;
    let mut runner = RunnerKind::default();
    let mut seed = None;
    let mut sample_count = None;

    let mut file = None;
    let mut eval = None;
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{arg} needs a value"))
        };
        match arg {
            "--quiet" | "-q" => quiet = true,
            "--show-bindings" | "-b" => show_bindings = true,
            "--time" | "-t" => time = true,
            "--eval" | "-e" => eval = Some(value()?),
            "--runner" => runner = value()?.parse()?,
            "--seed" => seed = Some(value()?),
            "--sample-count" => sample_count = Some(parse_count(&value()?)?),
            flag if flag.starts_with('-') => return Err(format!("Unknown option `{flag}`")),
            path => {
                if file.is_some() {
                    return Err(format!("Unexpected argument `{path}`"));
                }
                file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    if quiet && show_bindings {
        return Err("--quiet and --show-bindings can't be combined".to_string());
    }
    Ok(RunOptions {
        input: choose_input(file, eval)?,
        quiet,
        show_bindings,
        time,
        runner,
        seed,
        sample_count,
    })
}

/// File or `--eval`, plus whatever flags `flag` accepts.
fn parse_input(args: &[String], mut flag: impl FnMut(&str) -> bool) -> Result<Input, String> {
    let mut file = None;
    let mut eval = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--eval" | "-e" => {
                eval = Some(
                    args.next()
                        .cloned()
                        .ok_or_else(|| format!("{arg} needs a value"))?,
                );
            }
            other if flag(other) => {}
            other if other.starts_with('-') => return Err(format!("Unknown option `{other}`")),
            path => {
                if file.is_some() {
                    return Err(format!("Unexpected argument `{path}`"));
                }
                file = Some(PathBuf::from(path));
            }
        }
    }
    choose_input(file, eval)
}

fn choose_input(file: Option<PathBuf>, eval: Option<String>) -> Result<Input, String> {
    match (file, eval) {
        (Some(_), Some(_)) => Err("Pass either a file or --eval, not both".to_string()),
        (Some(path), None) => Ok(Input::File(path)),
        (None, Some(code)) => Ok(Input::Eval(code)),
        (None, None) => Err("Missing input: pass a file or --eval <code>".to_string()),
    }
}

fn parse_count(text: &str) -> Result<usize, String> {
    match text.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(format!("Sample count must be a positive integer, got `{text}`")),
    }
}

/// The environment a run uses: defaults, then `SAMPLE_COUNT`, then flags.
pub fn run_env(options: &RunOptions, sample_count_var: Option<&str>) -> Result<Env, String> {
    let mut env = Env::default();
    if let Some(var) = sample_count_var {
        env = env.with_sample_count(parse_count(var)?);
    }
    if let Some(count) = options.sample_count {
        env = env.with_sample_count(count);
    }
    if let Some(seed) = &options.seed {
        env = env.with_seed(seed.clone());
    }
    Ok(env)
}
