use std::sync::Arc;

use sq_eval::Registry;

use super::{Source, Terminal};
use crate::options::Input;
use crate::query::parsed;
use crate::{CompilerDb, SourceFile};

/// Print the syntax tree as an s-expression, or as JSON with `raw`.
pub fn parse(input: &Input, raw: bool, terminal: &mut Terminal<'_>) -> i32 {
    let source = match Source::load(input) {
        Ok(source) => source,
        Err(message) => return terminal.fail(&message),
    };
    // Parsing never consults the registry.
    let db = CompilerDb::new(Arc::new(Registry::new()));
    let file = SourceFile::new(&db, source.name.clone(), source.text.clone());

    match parsed(&db, file) {
        Ok(ast) if raw => match serde_json::to_string_pretty(&ast) {
            Ok(json) => {
                let _ = writeln!(terminal.out, "{json}");
                0
            }
            Err(err) => terminal.fail(&err.to_string()),
        },
        Ok(ast) => {
            let _ = writeln!(terminal.out, "{}", ast.to_sexpr());
            0
        }
        Err(err) => {
            terminal.report(&err.to_diagnostic(), &source);
            1
        }
    }
}
