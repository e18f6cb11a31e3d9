use std::sync::Arc;

use sq_eval::{Reducer, Registry};

use crate::runner::codec::{decode_job, encode_job, output_bundle, read_output};
use crate::runner::{RunJob, RunResult, Runner};

/// Evaluates on the calling thread, but sends the job and the output
/// through the bundle codec first. Anything the codec loses shows up here
/// without the cost of a worker pool.
#[derive(Clone, Debug)]
pub struct EmbeddedWithSerializationRunner {
    registry: Arc<Registry>,
    print_bundle: bool,
}

impl EmbeddedWithSerializationRunner {
    pub fn new(registry: Arc<Registry>) -> Self {
        EmbeddedWithSerializationRunner {
            registry,
            print_bundle: false,
        }
    }

    /// Also write each output bundle to stderr as JSON.
    #[must_use]
    pub fn with_bundle_dump(mut self, print_bundle: bool) -> Self {
        self.print_bundle = print_bundle;
        self
    }
}

impl Runner for EmbeddedWithSerializationRunner {
    fn run(&self, job: RunJob) -> RunResult {
        let job = decode_job(&encode_job(&job)?, &self.registry)?;
        let output = Reducer::new(job.env, &self.registry)
            .with_source_id(job.source_id)
            .evaluate_program(&job.expression, &job.externals)?;

        let (bundle, entrypoints) = output_bundle(&output);
        if self.print_bundle {
            eprintln!("{}", bundle.to_json()?);
        }
        let bundle = sq_serial::Bundle::from_bytes(&bundle.to_bytes()?)?;
        Ok(read_output(&bundle, entrypoints, &self.registry)?)
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }
}
