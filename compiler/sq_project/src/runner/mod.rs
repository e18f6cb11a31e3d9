//! Where compiled modules get evaluated.
//!
//! A [`Runner`] takes one compiled module plus the values its imports are
//! bound to and produces a [`RunOutput`]. The project layer never evaluates
//! anything itself, so the same project can run in-process, through the
//! bundle codec, or on a worker pool.

mod codec;
mod embedded;
mod serialization;
mod worker;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use sq_eval::{Registry, RunOutput};
use sq_ir::Expression;
use sq_value::{Env, Value};

use crate::ProjectError;

pub use codec::SerializedError;
pub use embedded::EmbeddedRunner;
pub use serialization::EmbeddedWithSerializationRunner;
pub use worker::{WorkerRequest, WorkerResponse, WorkerRunner};

/// One module evaluation.
#[derive(Clone, Debug)]
pub struct RunJob {
    pub source_id: String,
    pub expression: Arc<Expression>,
    /// Dict from import variable to the imported module's exports.
    pub externals: Value,
    pub env: Env,
}

pub type RunResult = Result<RunOutput, ProjectError>;

pub trait Runner: Send + Sync {
    fn run(&self, job: RunJob) -> RunResult;

    /// The builtins jobs are compiled and evaluated against.
    fn registry(&self) -> &Registry;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RunnerKind {
    #[default]
    Embedded,
    EmbeddedWithSerialization,
    Worker,
}

impl RunnerKind {
    pub const ALL: [RunnerKind; 3] = [
        RunnerKind::Embedded,
        RunnerKind::EmbeddedWithSerialization,
        RunnerKind::Worker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunnerKind::Embedded => "embedded",
            RunnerKind::EmbeddedWithSerialization => "embedded-with-serialization",
            RunnerKind::Worker => "worker",
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunnerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = RunnerKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown runner `{s}`, expected one of: {}", names.join(", "))
            })
    }
}
