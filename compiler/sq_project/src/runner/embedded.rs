use std::sync::Arc;

use sq_eval::{Reducer, Registry};

use crate::runner::{RunJob, RunResult, Runner};

/// Evaluates on the calling thread.
#[derive(Clone, Debug)]
pub struct EmbeddedRunner {
    registry: Arc<Registry>,
}

impl EmbeddedRunner {
    pub fn new(registry: Arc<Registry>) -> Self {
        EmbeddedRunner { registry }
    }
}

impl Runner for EmbeddedRunner {
    fn run(&self, job: RunJob) -> RunResult {
        Ok(Reducer::new(job.env, &self.registry)
            .with_source_id(job.source_id)
            .evaluate_program(&job.expression, &job.externals)?)
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }
}
