use super::backend::CollectionBackend;
use super::ItemStore;
use crate::error::Result;
use crate::id::{IdGenerator, RandomIds};
use crate::model::{now, Collection, Item, ItemDraft, ItemPatch, Scope};
use async_trait::async_trait;

/// Item repository over a collection-wide backend.
///
/// Every mutation is load, edit in memory, save the whole collection.
/// Storage order is insertion order. There is no protection against two
/// writers racing: the last save wins.
pub struct LocalStore<B: CollectionBackend> {
    backend: B,
    ids: Box<dyn IdGenerator>,
}

impl<B: CollectionBackend> LocalStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ids: Box::new(RandomIds),
        }
    }

    pub fn with_ids(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: CollectionBackend> ItemStore for LocalStore<B> {
    async fn list(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>> {
        self.backend.load(scope, collection)
    }

    async fn get(&self, scope: &Scope, collection: Collection, id: &str) -> Result<Option<Item>> {
        let items = self.backend.load(scope, collection)?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    async fn add(&self, scope: &Scope, collection: Collection, draft: ItemDraft) -> Result<Item> {
        let mut items = self.backend.load(scope, collection)?;
        let item = Item::from_draft(self.ids.new_id(), draft, now());
        items.push(item.clone());
        self.backend.save(scope, collection, &items)?;

        tracing::debug!(%collection, id = %item.id, "item added");
        Ok(item)
    }

    async fn update(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        patch: ItemPatch,
    ) -> Result<Option<Item>> {
        let mut items = self.backend.load(scope, collection)?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        patch.apply(item);
        item.updated_at = Some(now());
        let updated = item.clone();
        self.backend.save(scope, collection, &items)?;

        tracing::debug!(%collection, %id, "item updated");
        Ok(Some(updated))
    }

    async fn delete(&self, scope: &Scope, collection: Collection, id: &str) -> Result<bool> {
        let mut items = self.backend.load(scope, collection)?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.backend.save(scope, collection, &items)?;

        tracing::debug!(%collection, %id, "item deleted");
        Ok(true)
    }
}
