use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use sq_eval::Registry;
use sq_value::{Env, Value, ValueMap};

use crate::resolve::Resolver;
use crate::runner::{RunJob, RunResult, Runner};
use crate::{
    Linker, Module, ModuleOutput, ProjectConfig, ProjectError, ProjectState, ResolvedModule,
};

pub type ModuleOutputResult = Result<Arc<ModuleOutput>, ProjectError>;

/// Progress notifications from [`Project::run`].
#[derive(Clone, Debug)]
pub enum ProjectEvent {
    StartRun {
        name: String,
    },
    EndRun {
        name: String,
        execution_time: Duration,
    },
    Output(Arc<ModuleOutput>),
}

type Listener = Box<dyn Fn(&ProjectEvent) + Send + Sync>;

/// A set of named modules, the heads pointing into them, and every output
/// computed so far.
///
/// The state is an immutable [`ProjectState`] behind a lock. Readers take a
/// snapshot; `run` resolves and evaluates against its own snapshot and folds
/// the results back in when it's done, so edits made meanwhile win.
pub struct Project {
    linker: Arc<dyn Linker>,
    runner: Arc<dyn Runner>,
    env: Env,
    state: RwLock<ProjectState>,
    listeners: Mutex<Vec<Listener>>,
}

impl Project {
    pub fn new(linker: Arc<dyn Linker>, runner: Arc<dyn Runner>, env: Env) -> Self {
        Project {
            linker,
            runner,
            env,
            state: RwLock::new(ProjectState::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(
        linker: Arc<dyn Linker>,
        config: &ProjectConfig,
        registry: Arc<Registry>,
    ) -> std::io::Result<Self> {
        let runner = config.build_runner(registry)?;
        Ok(Project::new(linker, runner, config.env.clone()))
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn state(&self) -> ProjectState {
        self.state.read().clone()
    }

    pub fn on_event(&self, listener: impl Fn(&ProjectEvent) + Send + Sync + 'static) {
        self.listeners.lock().push(Box::new(listener));
    }

    pub fn set_source(&self, name: impl Into<String>, code: impl Into<String>) {
        self.set_module(Module::new(name, code));
    }

    pub fn set_module(&self, module: Module) {
        tracing::debug!(name = %module.name, hash = %module.hash(), "set source");
        let mut state = self.state.write();
        *state = state.with_module(module).prune();
    }

    pub fn set_head(&self, head: impl Into<String>, name: impl Into<String>) {
        let mut state = self.state.write();
        *state = state.with_head(head, name);
    }

    pub fn remove_source(&self, name: &str) {
        let mut state = self.state.write();
        *state = state.without_module(name).prune();
    }

    /// Resolve, then run `head`'s module after everything it imports.
    /// Cached outputs are reused.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run(&self, head: &str) -> ModuleOutputResult {
        let snapshot = self.state();
        let name = snapshot
            .head(head)
            .ok_or_else(|| ProjectError::UnknownHead(head.to_string()))?
            .to_string();

        let mut resolver = Resolver::new(self.linker.as_ref(), snapshot);
        let root = resolver.resolve(&name);
        let mut state = resolver.into_state();
        let result = match root {
            Ok(root) => {
                for resolved in run_order(&state, &root) {
                    state = self.run_module(&state, &resolved);
                }
                state
                    .output(ModuleOutput::hash_for(root.hash, &self.env))
                    .cloned()
                    .ok_or_else(|| ProjectError::Runner(format!("{name} produced no output")))
            }
            Err(err) => Err(err.into()),
        };
        self.absorb(&state);
        result
    }

    /// The cached output of `head`'s current module, if it has run.
    pub fn output(&self, head: &str) -> Option<Arc<ModuleOutput>> {
        let state = self.state();
        let resolved = state.resolution(state.head(head)?)?;
        state
            .output(ModuleOutput::hash_for(resolved.hash, &self.env))
            .cloned()
    }

    /// Names `name` imports directly, in source order.
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>, ProjectError> {
        let resolved = self.resolve(name)?;
        Ok(resolved.imports.iter().map(|i| i.name.clone()).collect())
    }

    /// Modules known to import `name` directly. Only modules resolved so
    /// far are considered.
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.state().dependents(name)
    }

    /// The order `run(head)` evaluates modules in: dependencies first, ties
    /// broken by import order.
    pub fn run_order(&self, head: &str) -> Result<Vec<String>, ProjectError> {
        let name = self
            .state()
            .head(head)
            .ok_or_else(|| ProjectError::UnknownHead(head.to_string()))?
            .to_string();
        let root = self.resolve(&name)?;
        let state = self.state();
        Ok(run_order(&state, &root)
            .iter()
            .map(|resolved| resolved.name().to_string())
            .collect())
    }

    fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>, ProjectError> {
        let mut resolver = Resolver::new(self.linker.as_ref(), self.state());
        let resolved = resolver.resolve(name);
        self.absorb(&resolver.into_state());
        Ok(resolved?)
    }

    fn absorb(&self, computed: &ProjectState) {
        let mut state = self.state.write();
        *state = state.absorb(computed);
    }

    fn emit(&self, event: &ProjectEvent) {
        for listener in self.listeners.lock().iter() {
            listener(event);
        }
    }

    fn run_module(&self, state: &ProjectState, resolved: &ResolvedModule) -> ProjectState {
        let hash = ModuleOutput::hash_for(resolved.hash, &self.env);
        if state.output(hash).is_some() {
            return state.clone();
        }
        let name = resolved.name().to_string();
        self.emit(&ProjectEvent::StartRun { name: name.clone() });
        let started = Instant::now();
        let result = self.evaluate(state, resolved);
        let execution_time = started.elapsed();
        if let Err(err) = &result {
            tracing::debug!(%name, error = %err, "module failed");
        }
        self.emit(&ProjectEvent::EndRun {
            name: name.clone(),
            execution_time,
        });

        let output = Arc::new(ModuleOutput {
            name,
            resolved_hash: resolved.hash,
            hash,
            execution_time,
            result,
        });
        self.emit(&ProjectEvent::Output(output.clone()));
        state.with_output(output)
    }

    fn evaluate(&self, state: &ProjectState, resolved: &ResolvedModule) -> RunResult {
        let mut externals = ValueMap::with_capacity(resolved.imports.len());
        for import in &resolved.imports {
            let output = state
                .output(ModuleOutput::hash_for(import.resolved_hash, &self.env))
                .ok_or_else(|| ProjectError::Runner(format!("{} has not run", import.name)))?;
            match &output.result {
                Ok(run) => {
                    externals.insert(import.variable.clone(), Value::dict(run.exports.clone()));
                }
                Err(err) => {
                    return Err(ProjectError::Import {
                        name: import.name.clone(),
                        inner: Box::new(err.clone()),
                    })
                }
            }
        }

        let ast = resolved.syntax.as_ref().map_err(|err| err.clone())?;
        let expression =
            sq_compile::compile(ast, self.runner.registry(), &resolved.import_variables())?;
        self.runner.run(RunJob {
            source_id: resolved.name().to_string(),
            expression: Arc::new(expression),
            externals: Value::dict(externals),
            env: self.env.clone(),
        })
    }
}

/// Post-order walk of the import graph from `root`.
fn run_order(state: &ProjectState, root: &Arc<ResolvedModule>) -> Vec<Arc<ResolvedModule>> {
    fn visit(
        state: &ProjectState,
        resolved: &Arc<ResolvedModule>,
        seen: &mut FxHashSet<String>,
        order: &mut Vec<Arc<ResolvedModule>>,
    ) {
        if !seen.insert(resolved.name().to_string()) {
            return;
        }
        for import in &resolved.imports {
            if let Some(dependency) = state.resolved(import.resolved_hash) {
                visit(state, dependency, seen, order);
            }
        }
        order.push(resolved.clone());
    }

    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    visit(state, root, &mut seen, &mut order);
    order
}
