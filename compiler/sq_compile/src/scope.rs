//! Lexical scopes and name resolution.
//!
//! Scopes mirror the runtime value stack. A block scope extends the stack of
//! its enclosing scope; a function scope starts a fresh stack region (the
//! callee's parameters) and reaches outer names only through captures,
//! which are registered lazily on first use.

use rustc_hash::FxHashMap;
use sq_ir::CaptureSource;

use crate::Builtins;

/// What a name resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// Offset from the top of the stack.
    Stack(usize),
    Capture(usize),
    External(String),
    Builtin(String),
}

/// A resolved name plus the parameter count when it is bound to a lambda
/// literal, used for static arity checks.
pub(crate) type Resolution = (Resolved, Option<usize>);

#[derive(Default)]
struct FunctionCaptures {
    sources: Vec<CaptureSource>,
    index: FxHashMap<String, (usize, Option<usize>)>,
}

struct Scope {
    /// Slot to name, in definition order.
    names: Vec<String>,
    /// Name to its latest slot.
    slots: FxHashMap<String, usize>,
    /// Slot to arity, for slots bound to lambda literals.
    arities: FxHashMap<usize, usize>,
    function: Option<FunctionCaptures>,
}

impl Scope {
    fn new(function: Option<FunctionCaptures>) -> Self {
        Scope {
            names: Vec::new(),
            slots: FxHashMap::default(),
            arities: FxHashMap::default(),
            function,
        }
    }
}

pub(crate) struct Scopes<'a> {
    scopes: Vec<Scope>,
    builtins: &'a dyn Builtins,
    externals: &'a [String],
}

impl<'a> Scopes<'a> {
    /// Start with the top-level block scope.
    pub(crate) fn new(builtins: &'a dyn Builtins, externals: &'a [String]) -> Self {
        Scopes {
            scopes: vec![Scope::new(None)],
            builtins,
            externals,
        }
    }

    pub(crate) fn start_block(&mut self) {
        self.scopes.push(Scope::new(None));
    }

    pub(crate) fn start_function(&mut self) {
        self.scopes.push(Scope::new(Some(FunctionCaptures::default())));
    }

    /// Pop the innermost scope, returning its captures if it was a function.
    pub(crate) fn finish(&mut self) -> Vec<CaptureSource> {
        self.scopes
            .pop()
            .and_then(|scope| scope.function)
            .map(|captures| captures.sources)
            .unwrap_or_default()
    }

    /// Push a binding onto the innermost scope.
    pub(crate) fn define(&mut self, name: &str, arity: Option<usize>) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        let slot = scope.names.len();
        scope.names.push(name.to_string());
        scope.slots.insert(name.to_string(), slot);
        if let Some(arity) = arity {
            scope.arities.insert(slot, arity);
        }
    }

    /// Bindings of the innermost scope as `(name, absolute slot)`, latest
    /// definition per name, in definition order.
    pub(crate) fn local_bindings(&self) -> Vec<(String, usize)> {
        let Some(scope) = self.scopes.last() else {
            return Vec::new();
        };
        scope
            .names
            .iter()
            .enumerate()
            .filter(|(slot, name)| scope.slots.get(name.as_str()) == Some(slot))
            .map(|(slot, name)| (name.clone(), slot))
            .collect()
    }

    pub(crate) fn resolve(&mut self, name: &str) -> Option<Resolution> {
        let depth = self.scopes.len() - 1;
        self.resolve_from(name, depth)
    }

    fn resolve_from(&mut self, name: &str, depth: usize) -> Option<Resolution> {
        let mut offset = 0;
        for i in (0..=depth).rev() {
            let scope = &self.scopes[i];
            if let Some(&slot) = scope.slots.get(name) {
                let stack_offset = offset + scope.names.len() - 1 - slot;
                return Some((Resolved::Stack(stack_offset), scope.arities.get(&slot).copied()));
            }
            offset += scope.names.len();

            let Some(function) = &scope.function else {
                continue;
            };
            if let Some(&(index, arity)) = function.index.get(name) {
                return Some((Resolved::Capture(index), arity));
            }

            // Function scopes are never outermost, so `i >= 1` here.
            let (outer, arity) = self.resolve_from(name, i - 1)?;
            let source = match outer {
                Resolved::Builtin(_) => return Some((outer, arity)),
                Resolved::Stack(offset) => CaptureSource::StackRef(offset),
                Resolved::Capture(index) => CaptureSource::CaptureRef(index),
                Resolved::External(external) => CaptureSource::External(external),
            };
            let function = self.scopes[i].function.get_or_insert_with(Default::default);
            let index = function.sources.len();
            function.sources.push(source);
            function.index.insert(name.to_string(), (index, arity));
            return Some((Resolved::Capture(index), arity));
        }
        self.resolve_global(name)
    }

    /// Imports shadow builtins.
    fn resolve_global(&self, name: &str) -> Option<Resolution> {
        if self.externals.iter().any(|e| e == name) {
            return Some((Resolved::External(name.to_string()), None));
        }
        if self.builtins.contains(name) {
            return Some((
                Resolved::Builtin(name.to_string()),
                self.builtins.fixed_arity(name),
            ));
        }
        None
    }
}
