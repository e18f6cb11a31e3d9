//! Error reporting shared by every engine phase.
//!
//! Each phase keeps its own error enum and converts it with a
//! `to_diagnostic` method. Codes are grouped by phase (see [`ErrorCode`]),
//! and runtime errors carry their stack trace as notes.
//!
//! [`TerminalEmitter`] prints a diagnostic with a source snippet when the
//! source text is available.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use error_code::ErrorCode;
