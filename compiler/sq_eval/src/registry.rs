//! Builtin function table.

use rustc_hash::FxHashMap;
use sq_compile::Builtins;
use sq_value::{BuiltinLambda, FnDefinition, Lambda, Value};

/// Names the compiler may resolve to builtins, and the values behind them.
///
/// Most entries are builtin lambdas; a few are constants such as `Math.pi`.
#[derive(Clone, Default)]
pub struct Registry {
    entries: FxHashMap<String, Value>,
}

impl Registry {
    /// An empty registry. Most callers want [`Registry::standard`].
    pub fn new() -> Self {
        Registry::default()
    }

    /// The full standard library.
    pub fn standard() -> Self {
        let mut registry = Registry::new();
        crate::stdlib::register(&mut registry);
        tracing::debug!(entries = registry.len(), "built standard registry");
        registry
    }

    pub fn define(&mut self, name: &str, definitions: Vec<FnDefinition>) {
        let lambda = BuiltinLambda::new(name, definitions);
        self.entries
            .insert(name.to_string(), Value::lambda(Lambda::Builtin(lambda)));
    }

    /// A builtin also usable as `@name` when registered as `Tag.name`.
    pub fn define_decorator(&mut self, name: &str, definitions: Vec<FnDefinition>) {
        let lambda = BuiltinLambda::new(name, definitions).decorator();
        self.entries
            .insert(name.to_string(), Value::lambda(Lambda::Builtin(lambda)));
    }

    pub fn define_value(&mut self, name: &str, value: Value) {
        self.entries.insert(name.to_string(), value);
    }

    /// Register `alias` as a second name for `existing`. The alias keeps
    /// its own name so traces and serialization refer to it.
    pub fn alias(&mut self, alias: &str, existing: &str) {
        let Some(value) = self.entries.get(existing) else {
            return;
        };
        let aliased = match value.as_lambda() {
            Some(Lambda::Builtin(b)) => {
                let lambda = BuiltinLambda::new(alias, b.definitions().to_vec());
                let lambda = if b.is_decorator() { lambda.decorator() } else { lambda };
                Value::lambda(Lambda::Builtin(lambda))
            }
            _ => value.clone(),
        };
        self.entries.insert(alias.to_string(), aliased);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// The builtin lambda registered under `name`.
    pub fn builtin(&self, name: &str) -> Option<&BuiltinLambda> {
        match self.entries.get(name)?.as_lambda()? {
            Lambda::Builtin(b) => Some(b),
            Lambda::User(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Builtins for Registry {
    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn fixed_arity(&self, name: &str) -> Option<usize> {
        self.builtin(name)?.fixed_arity()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
