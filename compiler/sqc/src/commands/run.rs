use std::sync::Arc;
use std::time::Instant;

use sq_eval::{Registry, RunOutput};
use sq_project::{FsLinker, Project, ProjectConfig, ProjectError};
use sq_value::{Env, Value};

use super::{position, Source, Terminal};
use crate::options::RunOptions;

const HEAD: &str = "main";

/// Run a program through a project rooted at the file's directory, so
/// relative imports resolve from disk.
pub fn run(options: &RunOptions, env: Env, print_bundle: bool, terminal: &mut Terminal<'_>) -> i32 {
    let source = match Source::load(&options.input) {
        Ok(source) => source,
        Err(message) => return terminal.fail(&message),
    };
    let config = ProjectConfig {
        env,
        runner: options.runner,
        print_bundle,
        ..ProjectConfig::default()
    };
    let linker = Arc::new(FsLinker::new(&source.root));
    let project = match Project::from_config(linker, &config, Arc::new(Registry::standard())) {
        Ok(project) => project,
        Err(err) => return terminal.fail(&format!("Can't start the {} runner: {err}", config.runner)),
    };
    project.set_source(&source.name, &source.text);
    project.set_head(HEAD, &source.name);

    let started = Instant::now();
    let result = project.run(HEAD).and_then(|output| output.result.clone());
    let elapsed = started.elapsed();
    tracing::debug!(?elapsed, ok = result.is_ok(), "run finished");

    match result {
        Ok(output) => {
            if !options.quiet {
                print_output(&output, options.show_bindings, terminal);
                if options.time {
                    let _ = writeln!(terminal.out, "Time: {:.3}s", elapsed.as_secs_f64());
                }
            }
            0
        }
        Err(err) => {
            report(&project, &source, &err, terminal);
            1
        }
    }
}

fn print_output(output: &RunOutput, show_bindings: bool, terminal: &mut Terminal<'_>) {
    let bindings = Value::dict(output.bindings.clone());
    if show_bindings {
        let _ = writeln!(terminal.out, "Bindings: {bindings}");
        let _ = writeln!(terminal.out, "Result: {}", output.result);
    } else if output.result.is_void() {
        let _ = writeln!(terminal.out, "{bindings}");
    } else {
        let _ = writeln!(terminal.out, "{}", output.result);
    }
}

fn report(project: &Project, source: &Source, err: &ProjectError, terminal: &mut Terminal<'_>) {
    let state = project.state();
    let text_of = |name: &str| state.module(name).map(|module| module.code.as_str());
    let diagnostic = err.to_diagnostic(&source.name, position(text_of));
    terminal.report(&diagnostic, source);
}
