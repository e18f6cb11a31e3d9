//! Errors raised while linking and running modules.

use sq_compile::CompileError;
use sq_diagnostic::{Diagnostic, ErrorCode};
use sq_parse::SyntaxError;
use sq_serial::SerializationError;
use sq_value::EvalError;

use crate::ContentHash;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkerError {
    #[error("Only relative paths in imports are allowed")]
    NotRelative { path: String },
    #[error("Can't find source with id {name}")]
    NotFound { name: String },
    #[error("Can't read {name}: {message}")]
    Io { name: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// The chain starts and ends with the same module.
    #[error("Cyclic import: {}", .0.join(" -> "))]
    CyclicImport(Vec<String>),
    #[error("Module {0} is missing")]
    MissingModule(String),
    #[error("Failed to link an import of {from}: {source}")]
    Linker {
        from: String,
        #[source]
        source: LinkerError,
    },
    #[error("{module} is pinned to {dependency} {expected}, but the current version is {found}")]
    PinMismatch {
        module: String,
        dependency: String,
        expected: ContentHash,
        found: ContentHash,
    },
}

impl ResolutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolutionError::CyclicImport(_) => ErrorCode::E4001,
            ResolutionError::MissingModule(_) | ResolutionError::PinMismatch { .. } => {
                ErrorCode::E4002
            }
            ResolutionError::Linker { .. } => ErrorCode::E4003,
        }
    }
}

/// Everything that can go wrong between a head name and its output.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProjectError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Runtime(#[from] EvalError),
    #[error("{0}")]
    Resolution(#[from] ResolutionError),
    #[error("Failed to import {name}: {inner}")]
    Import {
        name: String,
        inner: Box<ProjectError>,
    },
    #[error("{0}")]
    Serialization(#[from] SerializationError),
    #[error("Runner failed: {0}")]
    Runner(String),
    #[error("Unknown head {0}")]
    UnknownHead(String),
}

impl ProjectError {
    /// The error that started an import chain.
    pub fn root_cause(&self) -> &ProjectError {
        match self {
            ProjectError::Import { inner, .. } => inner.root_cause(),
            other => other,
        }
    }

    /// Diagnostic for a terminal. Runtime positions are rendered by
    /// `position`, since only the caller knows the sources.
    pub fn to_diagnostic(
        &self,
        source_id: &str,
        position: impl Fn(&sq_value::Location) -> String,
    ) -> Diagnostic {
        match self {
            ProjectError::Syntax(err) => err.to_diagnostic(),
            ProjectError::Compile(err) => err.to_diagnostic(),
            ProjectError::Runtime(err) => err.to_diagnostic(source_id, position),
            ProjectError::Resolution(err) => {
                Diagnostic::error(err.code()).with_message(err.to_string())
            }
            ProjectError::Import { .. } => Diagnostic::error(ErrorCode::E4004)
                .with_message(self.to_string())
                .with_note(format!("caused by: {}", self.root_cause())),
            ProjectError::Serialization(err) => {
                Diagnostic::error(ErrorCode::E5001).with_message(err.to_string())
            }
            ProjectError::Runner(_) | ProjectError::UnknownHead(_) => {
                Diagnostic::error(ErrorCode::E9001).with_message(self.to_string())
            }
        }
    }
}
