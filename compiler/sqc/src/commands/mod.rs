//! Command implementations. Each writes to the [`Terminal`] it is given
//! and returns the process exit code.

mod parse;
mod print_ir;
mod run;

use std::io::Write;
use std::path::{Path, PathBuf};

use sq_diagnostic::{ColorMode, Diagnostic, DiagnosticEmitter, TerminalEmitter};
use sq_ir::LineCol;
use sq_value::Location;

use crate::options::Input;

pub use parse::parse;
pub use print_ir::print_ir;
pub use run::run;

pub struct Terminal<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    pub colors: bool,
}

impl Terminal<'_> {
    /// Write `diagnostic` to stderr, with snippets from `source`.
    fn report(&mut self, diagnostic: &Diagnostic, source: &Source) {
        let mode = if self.colors {
            ColorMode::Always
        } else {
            ColorMode::Never
        };
        let mut emitter = TerminalEmitter::with_color_mode(&mut *self.err, mode, self.colors)
            .with_source(&source.name, &source.text);
        emitter.emit(diagnostic);
        emitter.flush();
    }

    fn fail(&mut self, message: &str) -> i32 {
        let _ = writeln!(self.err, "error: {message}");
        1
    }
}

/// The entry module's text, its name, and the directory imports are
/// resolved from.
pub struct Source {
    pub name: String,
    pub text: String,
    pub root: PathBuf,
}

impl Source {
    pub fn load(input: &Input) -> Result<Source, String> {
        match input {
            Input::File(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|err| format!("Can't read {}: {err}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| format!("{} is not a file", path.display()))?;
                let root = path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                Ok(Source { name, text, root })
            }
            Input::Eval(code) => Ok(Source {
                name: "main".to_string(),
                text: code.clone(),
                root: PathBuf::from("."),
            }),
        }
    }
}

/// `name:line:col` for a location, when `text_of` knows the module's text.
fn position<'s>(text_of: impl Fn(&str) -> Option<&'s str>) -> impl Fn(&Location) -> String {
    move |location| match text_of(&location.source_id) {
        Some(text) => format!(
            "{}:{}",
            location.source_id,
            LineCol::of_offset(text, location.span.start as usize)
        ),
        None => format!("{}:{}", location.source_id, location.span),
    }
}
