//! Squiggle command-line driver.
//!
//! `parse` and `print-ir` go through a salsa [`CompilerDb`]; `run` goes
//! through an [`sq_project::Project`] so imports are linked from disk.

pub mod commands;
mod db;
mod input;
pub mod options;
pub mod query;

use std::sync::Once;

pub use db::{CompilerDb, Db};
pub use input::SourceFile;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=sq_project=debug`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
