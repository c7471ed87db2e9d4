use crate::error::Result;
use crate::model::{Collection, Item, Scope};

/// Raw storage I/O for the local adapter.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `LocalStore` handles the "what" (id assignment, merging, absence).
pub trait CollectionBackend: Send + Sync {
    /// Load every item of a collection.
    /// A collection that was never written is empty, not an error.
    /// Unreadable or corrupt data is an error.
    fn load(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>>;

    /// Replace the whole collection.
    /// MUST be atomic: a failed save leaves the previous contents loadable.
    fn save(&self, scope: &Scope, collection: Collection, items: &[Item]) -> Result<()>;
}
