//! The module layer: many named sources, linked by imports, run in
//! dependency order with content-addressed caching.
//!
//! # Pipeline Position
//!
//! ```text
//! Linker → Resolve → (Parse → Compile → Reduce per module) → Outputs
//! ```
//!
//! # Caching
//!
//! Three hashes drive the cache:
//!
//! - a module hash covers one module's name, code and pins;
//! - a resolved hash covers the module hash and the resolved hash of every
//!   import, so an edit anywhere below a module changes it;
//! - an output hash covers a resolved hash and the [`sq_value::Env`].
//!
//! Outputs are stored by output hash and never overwritten. Editing a source
//! drops every output whose chain included it and keeps the rest.

mod config;
mod error;
mod hash;
mod linker;
mod module;
mod output;
mod project;
mod resolve;
pub mod runner;
mod state;

pub use config::ProjectConfig;
pub use error::{LinkerError, ProjectError, ResolutionError};
pub use hash::ContentHash;
pub use linker::{FsLinker, Linker, MapLinker};
pub use module::{Module, ResolvedImport, ResolvedModule};
pub use output::ModuleOutput;
pub use project::{ModuleOutputResult, Project, ProjectEvent};
pub use runner::{RunJob, RunResult, Runner, RunnerKind};
pub use state::ProjectState;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
