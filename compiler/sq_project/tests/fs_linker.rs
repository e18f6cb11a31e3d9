#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test code; panics give clear failure messages"
)]

//! Projects whose sources live on disk.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sq_eval::Registry;
use sq_project::runner::EmbeddedRunner;
use sq_project::{FsLinker, LinkerError, Project, ProjectError, ResolutionError};
use sq_value::{Env, Value};

struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("sq_project-{name}-{}", std::process::id()));
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

fn project(root: &TempDir) -> Project {
    Project::new(
        Arc::new(FsLinker::new(&root.0)),
        Arc::new(EmbeddedRunner::new(Arc::new(Registry::standard()))),
        Env::default(),
    )
}

#[test]
fn relative_imports_resolve_against_the_importer() {
    let dir = TempDir::new("relative");
    dir.write("models/main.squiggle", "import \"../lib/rates.squiggle\" as rates\nrates.base * 4");
    dir.write("lib/rates.squiggle", "import \"./shared.squiggle\" as shared\nexport base = shared.one + 1");
    dir.write("lib/shared.squiggle", "export one = 1");

    let project = project(&dir);
    project.set_head("main", "models/main.squiggle");
    let output = project.run("main").unwrap();
    assert_eq!(output.result.as_ref().unwrap().result, Value::number(8.0));
    assert_eq!(
        project.run_order("main").unwrap(),
        vec![
            "lib/shared.squiggle",
            "lib/rates.squiggle",
            "models/main.squiggle"
        ]
    );
}

#[test]
fn bare_import_paths_are_rejected() {
    let dir = TempDir::new("bare");
    dir.write("main.squiggle", "import \"lib.squiggle\" as lib\n1");

    let project = project(&dir);
    project.set_head("main", "main.squiggle");
    let err = project.run("main").unwrap_err();
    assert_eq!(
        err,
        ProjectError::Resolution(ResolutionError::Linker {
            from: "main.squiggle".to_string(),
            source: LinkerError::NotRelative {
                path: "lib.squiggle".to_string()
            },
        })
    );
    assert!(err.to_string().contains("Only relative paths in imports are allowed"));
}

#[test]
fn missing_files_are_missing_modules() {
    let dir = TempDir::new("missing");
    dir.write("main.squiggle", "import \"./gone.squiggle\" as gone\n1");

    let project = project(&dir);
    project.set_head("main", "main.squiggle");
    assert_eq!(
        project.run("main").unwrap_err(),
        ProjectError::Resolution(ResolutionError::MissingModule("gone.squiggle".to_string()))
    );
}
