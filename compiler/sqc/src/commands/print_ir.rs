use super::{Source, Terminal};
use crate::options::Input;
use crate::query::compiled;
use crate::{CompilerDb, SourceFile};

pub fn print_ir(input: &Input, terminal: &mut Terminal<'_>) -> i32 {
    let source = match Source::load(input) {
        Ok(source) => source,
        Err(message) => return terminal.fail(&message),
    };
    let db = CompilerDb::default();
    let file = SourceFile::new(&db, source.name.clone(), source.text.clone());

    match compiled(&db, file) {
        Ok(expression) => {
            let _ = writeln!(terminal.out, "{}", expression.to_sexpr());
            0
        }
        Err(err) => {
            terminal.report(&err.to_diagnostic(), &source);
            1
        }
    }
}
