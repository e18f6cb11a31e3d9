use std::time::Duration;

use sq_eval::RunOutput;
use sq_value::Env;

use crate::{ContentHash, ProjectError};

/// The cached result of running one resolved module in one environment.
#[derive(Clone, Debug)]
pub struct ModuleOutput {
    pub name: String,
    pub resolved_hash: ContentHash,
    pub hash: ContentHash,
    pub execution_time: Duration,
    pub result: Result<RunOutput, ProjectError>,
}

impl ModuleOutput {
    /// Key under which the output of `resolved_hash` run in `env` is cached.
    pub fn hash_for(resolved_hash: ContentHash, env: &Env) -> ContentHash {
        ContentHash::of([
            "output/",
            &resolved_hash.to_hex(),
            &format!(
                "/{}/{}/{}:{}",
                env.sample_count,
                env.xy_point_length,
                env.seed.len(),
                env.seed
            ),
        ])
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
