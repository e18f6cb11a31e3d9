//! Immutable project state.
//!
//! Every transition returns a new [`ProjectState`]; the old one stays valid.
//! The maps are persistent, so a clone shares structure with its original
//! and costs little.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::{ContentHash, Module, ModuleOutput, ResolvedModule};

#[derive(Clone, Debug, Default)]
pub struct ProjectState {
    modules: im::HashMap<String, Arc<Module>>,
    heads: im::HashMap<String, String>,
    /// Latest resolution of each module name.
    resolutions: im::HashMap<String, Arc<ResolvedModule>>,
    resolved: im::HashMap<ContentHash, Arc<ResolvedModule>>,
    outputs: im::HashMap<ContentHash, Arc<ModuleOutput>>,
}

impl ProjectState {
    pub fn new() -> Self {
        ProjectState::default()
    }

    pub fn module(&self, name: &str) -> Option<&Arc<Module>> {
        self.modules.get(name)
    }

    /// Module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn head(&self, head: &str) -> Option<&str> {
        self.heads.get(head).map(String::as_str)
    }

    /// The latest resolution of `name`, if it still matches the current
    /// source of every module in its chain.
    pub fn resolution(&self, name: &str) -> Option<&Arc<ResolvedModule>> {
        self.resolutions
            .get(name)
            .filter(|resolved| self.is_current(resolved, self))
    }

    pub fn resolved(&self, hash: ContentHash) -> Option<&Arc<ResolvedModule>> {
        self.resolved.get(&hash)
    }

    pub fn output(&self, hash: ContentHash) -> Option<&Arc<ModuleOutput>> {
        self.outputs.get(&hash)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Add or replace a module. Resolutions of it and of everything that
    /// imports it are dropped, unless the module is unchanged.
    #[must_use]
    pub fn with_module(&self, module: Module) -> Self {
        if self.modules.get(&module.name).is_some_and(|m| **m == module) {
            return self.clone();
        }
        let mut next = self.invalidated(&module.name);
        next.modules.insert(module.name.clone(), Arc::new(module));
        next
    }

    #[must_use]
    pub fn without_module(&self, name: &str) -> Self {
        let mut next = self.invalidated(name);
        next.modules.remove(name);
        next
    }

    #[must_use]
    pub fn with_head(&self, head: impl Into<String>, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.heads.insert(head.into(), name.into());
        next
    }

    #[must_use]
    pub fn with_resolution(&self, resolved: Arc<ResolvedModule>) -> Self {
        let mut next = self.clone();
        next.resolved
            .entry(resolved.hash)
            .or_insert_with(|| resolved.clone());
        next.resolutions
            .insert(resolved.name().to_string(), resolved);
        next
    }

    /// Outputs are immutable once cached; a second output under the same
    /// hash is ignored.
    #[must_use]
    pub fn with_output(&self, output: Arc<ModuleOutput>) -> Self {
        let mut next = self.clone();
        next.outputs.entry(output.hash).or_insert(output);
        next
    }

    /// Direct importers of `name` among the current resolutions, sorted.
    pub fn dependents(&self, name: &str) -> Vec<String> {
        let mut dependents: Vec<String> = self
            .resolutions
            .values()
            .filter(|resolved| resolved.imports.iter().any(|i| i.name == name))
            .map(|resolved| resolved.name().to_string())
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// Everything that imports `name`, directly or indirectly.
    pub fn transitive_dependents(&self, name: &str) -> FxHashSet<String> {
        let mut visited = FxHashSet::default();
        let mut queue: VecDeque<String> = self.dependents(name).into();
        while let Some(current) = queue.pop_front() {
            if visited.insert(current.clone()) {
                for dependent in self.dependents(&current) {
                    if !visited.contains(&dependent) {
                        queue.push_back(dependent);
                    }
                }
            }
        }
        visited
    }

    /// Drop resolved modules no current resolution reaches, and outputs
    /// whose resolved module was dropped.
    #[must_use]
    pub fn prune(&self) -> Self {
        let mut live = FxHashSet::default();
        let mut stack: Vec<ContentHash> = self.resolutions.values().map(|r| r.hash).collect();
        while let Some(hash) = stack.pop() {
            if !live.insert(hash) {
                continue;
            }
            if let Some(resolved) = self.resolved.get(&hash) {
                stack.extend(resolved.imports.iter().map(|i| i.resolved_hash));
            }
        }

        let mut next = self.clone();
        next.resolved.retain(|hash, _| live.contains(hash));
        next.outputs
            .retain(|_, output| live.contains(&output.resolved_hash));
        tracing::trace!(
            resolved = next.resolved.len(),
            outputs = next.outputs.len(),
            dropped = self.outputs.len() - next.outputs.len(),
            "pruned project state"
        );
        next
    }

    /// Fold in the sources, resolutions and outputs `other` computed from
    /// an older snapshot of this state. Work on sources edited since then is
    /// dropped; sources `other` loaded on demand are kept.
    #[must_use]
    pub fn absorb(&self, other: &ProjectState) -> Self {
        let mut next = self.clone();
        for (name, module) in &other.modules {
            if !next.modules.contains_key(name) {
                next.modules.insert(name.clone(), module.clone());
            }
        }
        for resolved in other.resolutions.values() {
            if next.is_current(resolved, other) {
                next.add_chain(resolved, other);
            }
        }
        for output in other.outputs.values() {
            if next.resolved.contains_key(&output.resolved_hash) {
                next.outputs
                    .entry(output.hash)
                    .or_insert_with(|| output.clone());
            }
        }
        next
    }

    fn add_chain(&mut self, resolved: &Arc<ResolvedModule>, lookup: &ProjectState) {
        for import in &resolved.imports {
            if let Some(dependency) = lookup.resolved.get(&import.resolved_hash) {
                self.add_chain(dependency, lookup);
            }
        }
        self.resolved
            .entry(resolved.hash)
            .or_insert_with(|| resolved.clone());
        self.resolutions
            .insert(resolved.name().to_string(), resolved.clone());
    }

    /// Whether every module in `resolved`'s chain still has the source it
    /// was resolved from. Dependencies are looked up in `lookup`.
    fn is_current(&self, resolved: &ResolvedModule, lookup: &ProjectState) -> bool {
        let own = self
            .modules
            .get(resolved.name())
            .is_some_and(|module| **module == *resolved.module);
        own && resolved.imports.iter().all(|import| {
            lookup
                .resolved
                .get(&import.resolved_hash)
                .is_some_and(|dependency| self.is_current(dependency, lookup))
        })
    }

    fn invalidated(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.resolutions.remove(name);
        for dependent in self.transitive_dependents(name) {
            next.resolutions.remove(&dependent);
        }
        next
    }
}
