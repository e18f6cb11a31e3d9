//! Source modules and their resolved import graphs.

use std::collections::BTreeMap;
use std::sync::Arc;

use sq_ir::{Span, SyntaxNode};
use sq_parse::SyntaxError;

use crate::ContentHash;

/// Length-prefixed, so field boundaries can't shift between hashes.
fn framed(field: &str) -> String {
    format!("{}:{field}", field.len())
}

/// A named piece of source code.
///
/// `pins` maps dependency names to the module hash this module was written
/// against. A pinned import only resolves while the dependency still has
/// that hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub code: String,
    pub pins: BTreeMap<String, ContentHash>,
}

impl Module {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            code: code.into(),
            pins: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_pin(mut self, dependency: impl Into<String>, hash: ContentHash) -> Self {
        self.pins.insert(dependency.into(), hash);
        self
    }

    /// Changes whenever the name, the code or any pin changes.
    pub fn hash(&self) -> ContentHash {
        let mut parts = vec![
            "module/".to_string(),
            framed(&self.name),
            framed(&self.code),
        ];
        for (dependency, hash) in &self.pins {
            parts.push(framed(dependency));
            parts.push(hash.to_hex());
        }
        ContentHash::of(parts.iter().map(String::as_str))
    }
}

/// One `import "path" as variable`, after the linker named its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: String,
    pub variable: String,
    /// Module name returned by the linker.
    pub name: String,
    pub span: Span,
    pub module_hash: ContentHash,
    pub resolved_hash: ContentHash,
}

/// A module together with the resolution of every module it imports.
///
/// The hash covers the module's own hash and the resolved hash of each
/// import, so editing any transitive dependency changes it.
#[derive(Clone, Debug)]
pub struct ResolvedModule {
    pub module: Arc<Module>,
    pub syntax: Result<Arc<SyntaxNode>, SyntaxError>,
    pub imports: Vec<ResolvedImport>,
    pub hash: ContentHash,
}

impl ResolvedModule {
    pub fn new(
        module: Arc<Module>,
        syntax: Result<Arc<SyntaxNode>, SyntaxError>,
        imports: Vec<ResolvedImport>,
    ) -> Self {
        let module_hash = module.hash().to_hex();
        let mut parts = vec!["resolved/".to_string(), module_hash];
        for import in &imports {
            parts.push(framed(&import.variable));
            parts.push(import.resolved_hash.to_hex());
        }
        let hash = ContentHash::of(parts.iter().map(String::as_str));
        ResolvedModule {
            module,
            syntax,
            imports,
            hash,
        }
    }

    pub fn name(&self) -> &str {
        &self.module.name
    }

    /// Names of the variables imports are bound to, in source order.
    pub fn import_variables(&self) -> Vec<String> {
        self.imports.iter().map(|i| i.variable.clone()).collect()
    }
}
