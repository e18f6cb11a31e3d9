//! A pool of evaluation threads fed through a channel.
//!
//! Only bincode bytes cross between the caller and a worker: the job goes
//! in as an encoded bundle and the output comes back as one. Each worker
//! owns nothing but a handle to the shared registry.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use sq_eval::{Reducer, Registry};

use crate::runner::codec::{decode_job, decode_output, encode_job, encode_output, SerializedError};
use crate::runner::{RunJob, RunResult, Runner};
use crate::ProjectError;

pub enum WorkerRequest {
    Run {
        job_bytes: Vec<u8>,
        reply: Sender<WorkerResponse>,
    },
}

#[derive(Debug)]
pub enum WorkerResponse {
    Ok(Vec<u8>),
    Err(SerializedError),
}

pub struct WorkerRunner {
    registry: Arc<Registry>,
    sender: Option<Sender<WorkerRequest>>,
    workers: Vec<JoinHandle<()>>,
    timeout: Option<Duration>,
}

impl WorkerRunner {
    /// Start `threads` workers (at least one).
    pub fn new(registry: Arc<Registry>, threads: usize) -> std::io::Result<Self> {
        let (sender, receiver) = channel::unbounded::<WorkerRequest>();
        let mut workers = Vec::with_capacity(threads.max(1));
        for index in 0..threads.max(1) {
            let receiver = receiver.clone();
            let registry = Arc::clone(&registry);
            workers.push(
                thread::Builder::new()
                    .name(format!("sq-worker-{index}"))
                    .spawn(move || worker_loop(&receiver, &registry))?,
            );
        }
        tracing::debug!(threads = workers.len(), "started worker pool");
        Ok(WorkerRunner {
            registry,
            sender: Some(sender),
            workers,
            timeout: None,
        })
    }

    /// Give up on jobs that take longer than `timeout`. The worker is not
    /// interrupted; its eventual result is discarded.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    pub fn run_with_timeout(&self, job: &RunJob, timeout: Option<Duration>) -> RunResult {
        let job_bytes = encode_job(job)?;
        let (reply, response) = channel::bounded(1);
        self.sender
            .as_ref()
            .ok_or_else(|| ProjectError::Runner("worker pool is shut down".to_string()))?
            .send(WorkerRequest::Run { job_bytes, reply })
            .map_err(|_| ProjectError::Runner("worker pool is shut down".to_string()))?;

        let response = match timeout {
            Some(timeout) => response.recv_timeout(timeout).map_err(|err| match err {
                RecvTimeoutError::Timeout => {
                    ProjectError::Runner(format!("{} timed out after {timeout:?}", job.source_id))
                }
                RecvTimeoutError::Disconnected => {
                    ProjectError::Runner("worker exited without replying".to_string())
                }
            })?,
            None => response
                .recv()
                .map_err(|_| ProjectError::Runner("worker exited without replying".to_string()))?,
        };
        match response {
            WorkerResponse::Ok(bytes) => Ok(decode_output(&bytes, &self.registry)?),
            WorkerResponse::Err(err) => Err(ProjectError::Runtime(err.into())),
        }
    }
}

impl Runner for WorkerRunner {
    fn run(&self, job: RunJob) -> RunResult {
        self.run_with_timeout(&job, self.timeout)
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for WorkerRunner {
    fn drop(&mut self) {
        // Closing the channel ends every worker loop.
        self.sender = None;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
        }
    }
}

fn worker_loop(requests: &Receiver<WorkerRequest>, registry: &Registry) {
    for request in requests {
        match request {
            WorkerRequest::Run { job_bytes, reply } => {
                let response = handle(&job_bytes, registry);
                if reply.send(response).is_err() {
                    tracing::debug!("caller stopped waiting for a job");
                }
            }
        }
    }
}

fn handle(job_bytes: &[u8], registry: &Registry) -> WorkerResponse {
    let job = match decode_job(job_bytes, registry) {
        Ok(job) => job,
        Err(err) => {
            return WorkerResponse::Err(SerializedError {
                message: err.to_string(),
                frames: Vec::new(),
            })
        }
    };
    tracing::trace!(source_id = %job.source_id, "worker picked up job");
    let output = Reducer::new(job.env, registry)
        .with_source_id(job.source_id)
        .evaluate_program(&job.expression, &job.externals);
    match output {
        Ok(output) => match encode_output(&output) {
            Ok(bytes) => WorkerResponse::Ok(bytes),
            Err(err) => WorkerResponse::Err(SerializedError {
                message: err.to_string(),
                frames: Vec::new(),
            }),
        },
        Err(err) => WorkerResponse::Err(SerializedError::from(&err)),
    }
}
