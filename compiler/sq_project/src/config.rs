use std::sync::Arc;

use sq_eval::Registry;
use sq_value::Env;

use crate::runner::{
    EmbeddedRunner, EmbeddedWithSerializationRunner, Runner, RunnerKind, WorkerRunner,
};

/// How a project evaluates its modules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectConfig {
    pub env: Env,
    pub runner: RunnerKind,
    /// Used by the worker runner only.
    pub worker_threads: usize,
    /// Dump output bundles to stderr; embedded-with-serialization only.
    pub print_bundle: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            env: Env::default(),
            runner: RunnerKind::default(),
            worker_threads: std::thread::available_parallelism().map_or(2, usize::from),
            print_bundle: false,
        }
    }
}

impl ProjectConfig {
    pub fn build_runner(&self, registry: Arc<Registry>) -> std::io::Result<Arc<dyn Runner>> {
        Ok(match self.runner {
            RunnerKind::Embedded => Arc::new(EmbeddedRunner::new(registry)),
            RunnerKind::EmbeddedWithSerialization => Arc::new(
                EmbeddedWithSerializationRunner::new(registry).with_bundle_dump(self.print_bundle),
            ),
            RunnerKind::Worker => Arc::new(WorkerRunner::new(registry, self.worker_threads)?),
        })
    }
}
