//! Salsa inputs.

/// One module's source text. Queries that read it re-run when the text
/// changes.
#[salsa::input]
pub struct SourceFile {
    /// Module name, used as the source id in spans and traces.
    #[return_ref]
    pub name: String,

    #[return_ref]
    pub text: String,
}
