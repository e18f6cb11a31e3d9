//! Evaluation of compiled Squiggle programs.
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Lex → Parse → Compile → **Reduce**
//! ```
//!
//! The [`Reducer`] walks the expression IR against a value stack. Every name
//! the compiler resolved to a builtin is looked up in a [`Registry`], which
//! is passed explicitly to both the compiler and the reducer; there is no
//! global function table.

mod reducer;
mod registry;
mod stdlib;

pub use reducer::{Reducer, RunOutput, MAX_CALL_DEPTH};
pub use registry::Registry;
