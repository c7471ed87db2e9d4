use super::backend::CollectionBackend;
use crate::error::{DrumlogError, Result};
use crate::model::{Collection, Item, Scope};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory storage backend for testing.
///
/// Stores must be `Send + Sync` to sit behind the async `ItemStore` trait,
/// so state lives behind a `Mutex` rather than a `RefCell`.
#[derive(Default)]
pub struct MemBackend {
    collections: Mutex<HashMap<(Scope, Collection), Vec<Item>>>,
    corrupt: Mutex<HashSet<(Scope, Collection)>>,
    simulate_write_error: AtomicBool,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Make subsequent loads of a collection fail as if its data were unreadable.
    pub fn set_corrupt(&self, scope: &Scope, collection: Collection) {
        self.corrupt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((scope.clone(), collection));
    }
}

impl CollectionBackend for MemBackend {
    fn load(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>> {
        let key = (scope.clone(), collection);
        if self
            .corrupt
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key)
        {
            return Err(DrumlogError::Store(format!(
                "Simulated corrupt data for {}",
                collection
            )));
        }
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections.get(&key).cloned().unwrap_or_default())
    }

    fn save(&self, scope: &Scope, collection: Collection, items: &[Item]) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(DrumlogError::Store("Simulated write error".to_string()));
        }
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections.insert((scope.clone(), collection), items.to_vec());
        Ok(())
    }
}
