//! Import resolution.
//!
//! A depth-first walk from one module through its imports. Modules on the
//! current path are kept on `visiting`; reaching one again is a cycle, and
//! the error carries the path from that module back to itself. Nothing is
//! evaluated until the whole graph resolves.

use std::sync::Arc;

use crate::{
    LinkerError, Linker, Module, ProjectState, ResolutionError, ResolvedImport, ResolvedModule,
};

pub(crate) struct Resolver<'a> {
    linker: &'a dyn Linker,
    state: ProjectState,
    visiting: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(linker: &'a dyn Linker, state: ProjectState) -> Self {
        Resolver {
            linker,
            state,
            visiting: Vec::new(),
        }
    }

    pub(crate) fn into_state(self) -> ProjectState {
        self.state
    }

    pub(crate) fn resolve(&mut self, name: &str) -> Result<Arc<ResolvedModule>, ResolutionError> {
        if let Some(start) = self.visiting.iter().position(|n| n == name) {
            let mut chain = self.visiting[start..].to_vec();
            chain.push(name.to_string());
            tracing::debug!(?chain, "cyclic import");
            return Err(ResolutionError::CyclicImport(chain));
        }
        if let Some(resolved) = self.state.resolution(name) {
            return Ok(resolved.clone());
        }

        let module = self.module(name)?;
        self.visiting.push(name.to_string());
        let resolved = self.resolve_imports(module);
        self.visiting.pop();

        let resolved = Arc::new(resolved?);
        tracing::trace!(name, hash = %resolved.hash, "resolved module");
        self.state = self.state.with_resolution(resolved.clone());
        Ok(resolved)
    }

    /// The module's current source, loaded through the linker if the
    /// project doesn't have it yet.
    fn module(&mut self, name: &str) -> Result<Arc<Module>, ResolutionError> {
        if let Some(module) = self.state.module(name) {
            return Ok(module.clone());
        }
        let code = self.linker.load_source(name).map_err(|err| match err {
            LinkerError::NotFound { .. } => ResolutionError::MissingModule(name.to_string()),
            source => ResolutionError::Linker {
                from: self.visiting.last().cloned().unwrap_or_default(),
                source,
            },
        })?;
        self.state = self.state.with_module(Module::new(name, code));
        self.state
            .module(name)
            .cloned()
            .ok_or_else(|| ResolutionError::MissingModule(name.to_string()))
    }

    fn resolve_imports(&mut self, module: Arc<Module>) -> Result<ResolvedModule, ResolutionError> {
        let syntax = sq_parse::parse(&module.code, &module.name).map(Arc::new);
        let mut imports = Vec::new();
        // A module that doesn't parse has no imports; running it reports
        // the syntax error.
        if let Ok(ast) = &syntax {
            for import in ast.imports() {
                let name = self
                    .linker
                    .resolve(&import.path, &module.name)
                    .map_err(|source| ResolutionError::Linker {
                        from: module.name.clone(),
                        source,
                    })?;
                let dependency = self.resolve(&name)?;
                let module_hash = dependency.module.hash();
                if let Some(&expected) = module.pins.get(&name) {
                    if expected != module_hash {
                        return Err(ResolutionError::PinMismatch {
                            module: module.name.clone(),
                            dependency: name,
                            expected,
                            found: module_hash,
                        });
                    }
                }
                imports.push(ResolvedImport {
                    path: import.path.clone(),
                    variable: import.variable.name.clone(),
                    name,
                    span: import.span,
                    module_hash,
                    resolved_hash: dependency.hash,
                });
            }
        }
        Ok(ResolvedModule::new(module, syntax, imports))
    }
}
