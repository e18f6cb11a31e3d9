use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sq_eval::Registry;
use sq_value::{Env, Value};

use super::*;
use crate::runner::{EmbeddedRunner, EmbeddedWithSerializationRunner, WorkerRunner};

fn env() -> Env {
    Env::default().with_sample_count(100)
}

fn registry() -> Arc<Registry> {
    Arc::new(Registry::standard())
}

fn project_with(linker: MapLinker) -> Project {
    Project::new(
        Arc::new(linker),
        Arc::new(EmbeddedRunner::new(registry())),
        env(),
    )
}

fn project() -> Project {
    project_with(MapLinker::new())
}

/// Names of the modules each `run` actually evaluates.
fn record_runs(project: &Project) -> Arc<Mutex<Vec<String>>> {
    let runs = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&runs);
    project.on_event(move |event| {
        if let ProjectEvent::StartRun { name } = event {
            sink.lock().push(name.clone());
        }
    });
    runs
}

fn take(runs: &Mutex<Vec<String>>) -> Vec<String> {
    std::mem::take(&mut *runs.lock())
}

fn run_ok(project: &Project, head: &str) -> sq_eval::RunOutput {
    let output = project.run(head).unwrap();
    output.result.clone().unwrap()
}

#[test]
fn test_import_exports() {
    let project = project();
    project.set_source("p1", "export x = 1");
    project.set_source("p2", "import \"p1\" as p1\nz = p1.x + 1");
    project.set_head("main", "p2");

    let output = run_ok(&project, "main");
    assert!(output.result.is_void());
    assert_eq!(output.bindings.len(), 1);
    assert_eq!(output.bindings["z"], Value::number(2.0));
}

#[test]
fn test_sources_load_on_demand() {
    let linker = MapLinker::new()
        .with_source("lib", "export scale = 10")
        .with_source("unused", "1");
    let project = project_with(linker);
    project.set_source("main", "import \"lib\" as lib\nlib.scale * 2");
    project.set_head("main", "main");

    assert_eq!(run_ok(&project, "main").result, Value::number(20.0));
    assert_eq!(
        project.state().module_names(),
        vec!["lib".to_string(), "main".to_string()]
    );
}

#[test]
fn test_cycles_are_rejected_before_running() {
    let project = project();
    let runs = record_runs(&project);
    project.set_source("a", "import \"b\" as b\nx = 1");
    project.set_source("b", "import \"c\" as c\ny = 1");
    project.set_source("c", "import \"a\" as a\nz = 1");
    project.set_head("main", "a");

    let err = project.run("main").unwrap_err();
    assert_eq!(
        err,
        ProjectError::Resolution(ResolutionError::CyclicImport(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ]))
    );
    assert_eq!(err.to_string(), "Cyclic import: a -> b -> c -> a");
    assert!(take(&runs).is_empty());
}

#[test]
fn test_run_order_is_topological() {
    let project = project();
    project.set_source("d", "export d = 1");
    project.set_source("b", "import \"d\" as d\nexport b = d.d");
    project.set_source("c", "import \"d\" as d\nexport c = d.d");
    project.set_source("main", "import \"b\" as b\nimport \"c\" as c\nb.b + c.c");
    project.set_head("main", "main");

    assert_eq!(
        project.run_order("main").unwrap(),
        vec!["d", "b", "c", "main"]
    );
    assert_eq!(project.dependencies("main").unwrap(), vec!["b", "c"]);
    assert_eq!(project.dependents("d"), vec!["b", "c"]);

    let runs = record_runs(&project);
    assert_eq!(run_ok(&project, "main").result, Value::number(2.0));
    assert_eq!(take(&runs), vec!["d", "b", "c", "main"]);
}

#[test]
fn test_outputs_are_cached() {
    let project = project();
    let runs = record_runs(&project);
    project.set_source("a", "export a = 1");
    project.set_source("main", "import \"a\" as a\na.a");
    project.set_head("main", "main");

    let first = project.run("main").unwrap();
    assert_eq!(take(&runs), vec!["a", "main"]);
    let second = project.run("main").unwrap();
    assert!(take(&runs).is_empty());
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&project.output("main").unwrap(), &first));
}

#[test]
fn test_edit_invalidates_dependents_only() {
    let project = project();
    let runs = record_runs(&project);
    project.set_source("a", "export a = 1");
    project.set_source("b", "import \"a\" as a\nexport b = a.a + 1");
    project.set_source("main", "import \"b\" as b\nb.b * 10");
    project.set_source("other", "5");
    project.set_head("main", "main");
    project.set_head("other", "other");
    project.run("main").unwrap();
    project.run("other").unwrap();
    take(&runs);
    let outputs_before = project.state().output_count();
    assert_eq!(outputs_before, 4);

    project.set_source("a", "export a = 2");
    // The three outputs in a's chain are gone, the unrelated one stays.
    assert_eq!(project.state().output_count(), 1);
    assert!(project.output("main").is_none());
    assert!(project.output("other").is_some());

    assert_eq!(run_ok(&project, "main").result, Value::number(30.0));
    assert_eq!(take(&runs), vec!["a", "b", "main"]);
    project.run("other").unwrap();
    assert!(take(&runs).is_empty());
}

#[test]
fn test_identical_edit_keeps_cache() {
    let project = project();
    let runs = record_runs(&project);
    project.set_source("main", "1 + 1");
    project.set_head("main", "main");
    project.run("main").unwrap();
    project.set_source("main", "1 + 1");
    project.run("main").unwrap();
    assert_eq!(take(&runs), vec!["main"]);
}

#[test]
fn test_failed_import_is_reported_without_running() {
    let project = project();
    let runs = record_runs(&project);
    project.set_source("p1", "x = (1 +");
    project.set_source("main", "import \"p1\" as p1\n1");
    project.set_head("main", "main");

    let output = project.run("main").unwrap();
    let err = output.result.clone().unwrap_err();
    match &err {
        ProjectError::Import { name, inner } => {
            assert_eq!(name, "p1");
            assert!(matches!(**inner, ProjectError::Syntax(_)));
        }
        other => panic!("expected an import error, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), ProjectError::Syntax(_)));
    // Both modules get an output.
    assert_eq!(take(&runs), vec!["p1", "main"]);
}

#[test]
fn test_module_errors() {
    let project = project();
    project.set_source("arity", "f(x, y) = x + y\nf(1)");
    project.set_source("runtime", "g(h) = h(1, 2)\ng({|x| x})");
    project.set_head("arity", "arity");
    project.set_head("runtime", "runtime");

    let arity = project.run("arity").unwrap().result.clone().unwrap_err();
    assert!(matches!(arity, ProjectError::Compile(_)));
    assert_eq!(
        arity.to_string(),
        "2 arguments expected. Instead 1 argument(s) were passed."
    );

    project.set_source("units", "a :: meters = 1\nb :: seconds = a\nb");
    project.set_head("units", "units");
    let units = project.run("units").unwrap().result.clone().unwrap_err();
    assert!(matches!(units, ProjectError::Compile(_)));
    assert!(units.to_string().starts_with("Conflicting unit types:"));

    let runtime = project.run("runtime").unwrap().result.clone().unwrap_err();
    match runtime {
        ProjectError::Runtime(err) => assert!(!err.trace.is_empty()),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn test_resolution_errors() {
    let project = project();
    assert_eq!(
        project.run("nothing").unwrap_err(),
        ProjectError::UnknownHead("nothing".to_string())
    );

    project.set_source("main", "import \"nope\" as nope\n1");
    project.set_head("main", "main");
    assert_eq!(
        project.run("main").unwrap_err(),
        ProjectError::Resolution(ResolutionError::MissingModule("nope".to_string()))
    );
}

#[test]
fn test_pins() {
    let project = project();
    project.set_source("lib", "export v = 1");
    let pinned = Module::new("lib", "export v = 1").hash();
    project.set_module(Module::new("main", "import \"lib\" as lib\nlib.v").with_pin("lib", pinned));
    project.set_head("main", "main");
    // `lib.v` keeps its export tags, so compare the number only.
    assert_eq!(run_ok(&project, "main").result.as_number(), Some(1.0));

    project.set_source("lib", "export v = 2");
    let err = project.run("main").unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Resolution(ResolutionError::PinMismatch { ref dependency, expected, .. })
            if dependency == "lib" && expected == pinned
    ));
}

#[test]
fn test_state_snapshots_are_immutable() {
    let project = project();
    project.set_source("main", "1");
    let before = project.state();
    project.set_source("main", "2");
    project.remove_source("other");
    assert_eq!(before.module("main").unwrap().code, "1");
    assert_eq!(project.state().module("main").unwrap().code, "2");

    project.remove_source("main");
    assert!(project.state().module("main").is_none());
    assert!(before.module("main").is_some());
}

#[test]
fn test_exports_carry_provenance() {
    let project = project();
    project.set_source("lib", "export rate = 0.5");
    project.set_head("lib", "lib");
    let output = run_ok(&project, "lib");
    let export = output.exports["rate"].tags().unwrap().export_data.clone().unwrap();
    assert_eq!(export.source_id, "lib");
    assert_eq!(export.path, vec!["rate".to_string()]);
}

const RUNNER_PROGRAM: &str = "import \"lib\" as lib\n\
    @name(\"Scaled\")\n\
    scaled = lib.base * 3\n\
    f(x) = x + lib.base\n\
    d = normal(scaled, 1)\n\
    {f: f, d: d, total: f(scaled), plain: [1, \"two\", true]}";

fn runner_project(runner: Arc<dyn Runner>) -> Project {
    let project = Project::new(Arc::new(MapLinker::new()), runner, env());
    project.set_source("lib", "export base = 2");
    project.set_source("main", RUNNER_PROGRAM);
    project.set_head("main", "main");
    project
}

#[test]
fn test_runners_agree() {
    let registry = registry();
    let embedded = run_ok(
        &runner_project(Arc::new(EmbeddedRunner::new(registry.clone()))),
        "main",
    );
    let serialized = run_ok(
        &runner_project(Arc::new(EmbeddedWithSerializationRunner::new(
            registry.clone(),
        ))),
        "main",
    );
    let worker = run_ok(
        &runner_project(Arc::new(WorkerRunner::new(registry, 2).unwrap())),
        "main",
    );

    assert_eq!(serialized, embedded);
    assert_eq!(worker, embedded);
    let total = embedded.result.as_dict().unwrap()["total"].as_number();
    assert_eq!(total, Some(8.0));
    assert_eq!(
        embedded.bindings["scaled"].tags().unwrap().name.as_deref(),
        Some("Scaled")
    );
}

#[test]
fn test_serializing_runners_carry_symbolic_distributions() {
    let registry = registry();
    for runner in [
        Arc::new(EmbeddedWithSerializationRunner::new(registry.clone())) as Arc<dyn Runner>,
        Arc::new(WorkerRunner::new(registry.clone(), 1).unwrap()),
    ] {
        let project = Project::new(Arc::new(MapLinker::new()), runner, env());
        project.set_source("dist", "normal(0, 1)");
        project.set_source("binding", "a = normal(0, 1)\nb = 2 * a\n3");
        project.set_head("dist", "dist");
        project.set_head("binding", "binding");
        let dist = run_ok(&project, "dist");
        assert!(dist.result.as_dist().is_some());
        assert_eq!(run_ok(&project, "binding").result, Value::number(3.0));
    }
}

#[test]
fn test_worker_errors_keep_message_and_trace() {
    let project = runner_project(Arc::new(WorkerRunner::new(registry(), 1).unwrap()));
    project.set_source("main", "g(h) = h(1, 2)\ng({|x| x})");
    let err = project.run("main").unwrap().result.clone().unwrap_err();
    match err {
        ProjectError::Runtime(err) => {
            assert_eq!(
                err.message.to_string(),
                "1 arguments expected. Instead 2 argument(s) were passed."
            );
            assert!(!err.trace.is_empty());
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn test_worker_timeout() {
    let registry = registry();
    let runner = WorkerRunner::new(registry.clone(), 1).unwrap();
    assert_eq!(runner.threads(), 1);
    let ast = sq_parse::parse("SampleSet.fromDist(normal(0, 1)) * 2", "slow").unwrap();
    let job = RunJob {
        source_id: "slow".to_string(),
        expression: Arc::new(sq_compile::compile(&ast, registry.as_ref(), &[]).unwrap()),
        externals: Value::void(),
        env: Env::default().with_sample_count(2_000_000),
    };
    let err = runner
        .run_with_timeout(&job, Some(Duration::from_nanos(1)))
        .unwrap_err();
    assert_eq!(
        err,
        ProjectError::Runner("slow timed out after 1ns".to_string())
    );
}

#[test]
fn test_runner_kind_parsing() {
    assert_eq!("worker".parse::<RunnerKind>(), Ok(RunnerKind::Worker));
    assert_eq!(
        "embedded-with-serialization".parse::<RunnerKind>(),
        Ok(RunnerKind::EmbeddedWithSerialization)
    );
    assert!("remote".parse::<RunnerKind>().is_err());
    for kind in RunnerKind::ALL {
        assert_eq!(kind.to_string().parse::<RunnerKind>(), Ok(kind));
    }
}

#[test]
fn test_project_from_config() {
    let config = ProjectConfig {
        runner: RunnerKind::EmbeddedWithSerialization,
        env: env(),
        ..ProjectConfig::default()
    };
    let project = Project::from_config(Arc::new(MapLinker::new()), &config, registry()).unwrap();
    project.set_source("main", "x = 2\nx * x");
    project.set_head("main", "main");
    assert_eq!(run_ok(&project, "main").result, Value::number(4.0));
    assert_eq!(project.env(), &env());
}
