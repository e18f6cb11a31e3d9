//! Tracked queries. Results are cached per [`SourceFile`] and recomputed
//! only when its text changes.

use sq_compile::CompileError;
use sq_diagnostic::Diagnostic;
use sq_ir::{Expression, SyntaxNode};
use sq_parse::SyntaxError;

use crate::db::Db;
use crate::input::SourceFile;

/// Why `compiled` produced no expression. Salsa compares query results, so
/// this stays `Eq`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileFailure {
    Syntax(SyntaxError),
    Compile(CompileError),
}

impl CompileFailure {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileFailure::Syntax(err) => err.to_diagnostic(),
            CompileFailure::Compile(err) => err.to_diagnostic(),
        }
    }
}

impl From<SyntaxError> for CompileFailure {
    fn from(err: SyntaxError) -> Self {
        CompileFailure::Syntax(err)
    }
}

impl From<CompileError> for CompileFailure {
    fn from(err: CompileError) -> Self {
        CompileFailure::Compile(err)
    }
}

#[salsa::tracked]
pub fn parsed(db: &dyn Db, file: SourceFile) -> Result<SyntaxNode, SyntaxError> {
    sq_parse::parse(file.text(db), file.name(db))
}

/// Compile against the database's registry. Import variables are treated
/// as externals; nothing is linked.
#[salsa::tracked]
pub fn compiled(db: &dyn Db, file: SourceFile) -> Result<Expression, CompileFailure> {
    let ast = parsed(db, file)?;
    let externals: Vec<String> = ast
        .imports()
        .iter()
        .map(|import| import.variable.name.clone())
        .collect();
    Ok(sq_compile::compile(&ast, db.registry(), &externals)?)
}
