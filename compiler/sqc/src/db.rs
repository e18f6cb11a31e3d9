//! The salsa database behind `parse` and `print-ir`.

use std::sync::Arc;

use parking_lot::Mutex;
use sq_eval::Registry;

/// Database access for queries. Carries the registry names compile against.
#[salsa::db]
pub trait Db: salsa::Database {
    fn registry(&self) -> &Registry;
}

#[salsa::db]
#[derive(Clone)]
pub struct CompilerDb {
    storage: salsa::Storage<Self>,
    registry: Arc<Registry>,
    /// Executed queries, recorded only once logging is enabled.
    logs: Arc<Mutex<Option<Vec<String>>>>,
}

impl CompilerDb {
    pub fn new(registry: Arc<Registry>) -> Self {
        CompilerDb {
            storage: salsa::Storage::default(),
            registry,
            logs: Arc::default(),
        }
    }

    #[cfg(test)]
    pub fn enable_logging(&self) {
        let mut logs = self.logs.lock();
        if logs.is_none() {
            *logs = Some(Vec::new());
        }
    }

    #[cfg(test)]
    pub fn take_logs(&self) -> Vec<String> {
        self.logs.lock().as_mut().map(std::mem::take).unwrap_or_default()
    }
}

impl Default for CompilerDb {
    fn default() -> Self {
        CompilerDb::new(Arc::new(Registry::standard()))
    }
}

#[salsa::db]
impl Db for CompilerDb {
    fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[salsa::db]
impl salsa::Database for CompilerDb {
    fn salsa_event(&self, event: &dyn Fn() -> salsa::Event) {
        if let Some(logs) = &mut *self.logs.lock() {
            let event = event();
            if let salsa::EventKind::WillExecute { .. } = event.kind {
                logs.push(format!("{event:?}"));
            }
        }
    }
}
