//! Byte encodings of jobs and results for runners that cross a boundary.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sq_eval::{Registry, RunOutput};
use sq_serial::{Bundle, Deserializer, Entrypoint, SerializationError, Serializer};
use sq_value::{Env, EvalError, ErrorMessage, Location, StackFrame, StackTrace, Value, ValueMap};

use crate::runner::RunJob;

#[derive(Serialize, Deserialize)]
struct JobPayload {
    source_id: String,
    env: Env,
    bundle: Bundle,
    expression: Entrypoint,
    externals: Entrypoint,
}

#[derive(Serialize, Deserialize)]
struct OutputPayload {
    bundle: Bundle,
    result: Entrypoint,
    bindings: Entrypoint,
    exports: Entrypoint,
}

/// A runtime error reduced to what survives a trip through bytes. The
/// message keeps its text but loses its variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedError {
    pub message: String,
    pub frames: Vec<(String, Option<Location>)>,
}

impl From<&EvalError> for SerializedError {
    fn from(err: &EvalError) -> Self {
        SerializedError {
            message: err.message.to_string(),
            frames: err
                .trace
                .frames()
                .iter()
                .map(|frame| (frame.name.clone(), frame.location.clone()))
                .collect(),
        }
    }
}

impl From<SerializedError> for EvalError {
    fn from(err: SerializedError) -> Self {
        EvalError {
            message: ErrorMessage::Other(err.message),
            trace: StackTrace::new(
                err.frames
                    .into_iter()
                    .map(|(name, location)| StackFrame { name, location })
                    .collect(),
            ),
        }
    }
}

pub(crate) fn encode_job(job: &RunJob) -> Result<Vec<u8>, SerializationError> {
    let mut serializer = Serializer::new();
    let expression = serializer.expression(&job.expression);
    let externals = serializer.value(&job.externals);
    let payload = JobPayload {
        source_id: job.source_id.clone(),
        env: job.env.clone(),
        bundle: serializer.finish(),
        expression,
        externals,
    };
    Ok(bincode::serialize(&payload)?)
}

pub(crate) fn decode_job(bytes: &[u8], registry: &Registry) -> Result<RunJob, SerializationError> {
    let payload: JobPayload = bincode::deserialize(bytes)?;
    let mut deserializer = Deserializer::new(&payload.bundle, registry);
    let expression = deserializer.expression_at(payload.expression)?;
    let externals = deserializer.value_at(payload.externals)?;
    Ok(RunJob {
        source_id: payload.source_id,
        expression: Arc::new(expression),
        externals,
        env: payload.env,
    })
}

/// The bundle an output travels in, plus its three entrypoints.
pub(crate) fn output_bundle(output: &RunOutput) -> (Bundle, [Entrypoint; 3]) {
    let mut serializer = Serializer::new();
    let result = serializer.value(&output.result);
    let bindings = serializer.value(&Value::dict(output.bindings.clone()));
    let exports = serializer.value(&Value::dict(output.exports.clone()));
    (serializer.finish(), [result, bindings, exports])
}

pub(crate) fn encode_output(output: &RunOutput) -> Result<Vec<u8>, SerializationError> {
    let (bundle, [result, bindings, exports]) = output_bundle(output);
    Ok(bincode::serialize(&OutputPayload {
        bundle,
        result,
        bindings,
        exports,
    })?)
}

pub(crate) fn decode_output(
    bytes: &[u8],
    registry: &Registry,
) -> Result<RunOutput, SerializationError> {
    let payload: OutputPayload = bincode::deserialize(bytes)?;
    read_output(
        &payload.bundle,
        [payload.result, payload.bindings, payload.exports],
        registry,
    )
}

pub(crate) fn read_output(
    bundle: &Bundle,
    [result, bindings, exports]: [Entrypoint; 3],
    registry: &Registry,
) -> Result<RunOutput, SerializationError> {
    let mut deserializer = Deserializer::new(bundle, registry);
    let mut dict = |entrypoint| -> Result<ValueMap, SerializationError> {
        deserializer
            .value_at(entrypoint)?
            .as_dict()
            .cloned()
            .ok_or(SerializationError::TypeMismatch { expected: "dict" })
    };
    let bindings = dict(bindings)?;
    let exports = dict(exports)?;
    Ok(RunOutput {
        result: deserializer.value_at(result)?,
        bindings,
        exports,
    })
}
