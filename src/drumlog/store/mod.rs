//! # Storage Layer
//!
//! This module defines the storage abstraction for drumlog. The [`ItemStore`] trait
//! is the item repository contract: `list`, `get`, `add`, `update` and `delete` per
//! collection. Everything above this layer is written against the trait only.
//!
//! ## Two Adapters
//!
//! - [`local::LocalStore`]: collection-wide read/write over a [`backend::CollectionBackend`].
//!   Every mutation loads the whole collection, edits it and writes it back in one go.
//!   Fine for a personal practice list of tens to hundreds of items.
//! - [`remote::RemoteStore`]: per-document access over a [`documents::DocumentClient`]
//!   (Cloud Firestore in production). Every mutation is one targeted document write.
//!
//! Both take the same explicit [`Scope`] on every call. Nothing is cached.
//!
//! ## Absence Is Not an Error
//!
//! `get` and `update` return `Ok(None)` for an unknown id, `delete` returns
//! `Ok(false)`. `Err` is reserved for storage that could not be read or written.
//! Callers that prefer to degrade a failed load into an empty list can use
//! [`list_or_empty`].
//!
//! ## Storage Layout
//!
//! Local (`FsBackend`):
//! ```text
//! <data dir>/
//! ├── config.json
//! ├── drumofir_songs.json      # JSON array of items
//! ├── drumofir_skills.json
//! └── users/<uid>/…            # same layout for a user scope
//! ```
//!
//! Remote (`FirestoreClient`):
//! ```text
//! users/{uid}/songs/{id}       # item fields minus `id`
//! users/{uid}/skills/{id}
//! ```

use crate::error::Result;
use crate::model::{Collection, Item, ItemDraft, ItemPatch, Scope};
use async_trait::async_trait;

pub mod backend;
pub mod documents;
pub mod firestore;
pub mod fs_backend;
pub mod local;
pub mod mem_backend;
pub mod remote;

/// The item repository contract.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items in the collection, in adapter order. Callers must not rely on it.
    async fn list(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>>;

    /// The item with `id`, or `None`.
    async fn get(&self, scope: &Scope, collection: Collection, id: &str) -> Result<Option<Item>>;

    /// Assign an id and creation time, persist, and return the stored record.
    async fn add(&self, scope: &Scope, collection: Collection, draft: ItemDraft) -> Result<Item>;

    /// Merge `patch` over the stored item. `None` (and no write) if it does not exist.
    async fn update(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        patch: ItemPatch,
    ) -> Result<Option<Item>>;

    /// Remove the item. Returns whether anything was removed.
    async fn delete(&self, scope: &Scope, collection: Collection, id: &str) -> Result<bool>;
}

#[async_trait]
impl<T: ItemStore + ?Sized> ItemStore for Box<T> {
    async fn list(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>> {
        (**self).list(scope, collection).await
    }

    async fn get(&self, scope: &Scope, collection: Collection, id: &str) -> Result<Option<Item>> {
        (**self).get(scope, collection, id).await
    }

    async fn add(&self, scope: &Scope, collection: Collection, draft: ItemDraft) -> Result<Item> {
        (**self).add(scope, collection, draft).await
    }

    async fn update(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        patch: ItemPatch,
    ) -> Result<Option<Item>> {
        (**self).update(scope, collection, id, patch).await
    }

    async fn delete(&self, scope: &Scope, collection: Collection, id: &str) -> Result<bool> {
        (**self).delete(scope, collection, id).await
    }
}

/// Lists a collection, logging and swallowing any storage failure.
///
/// A failed load looks exactly like an empty collection to the caller.
pub async fn list_or_empty<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
) -> Vec<Item> {
    match store.list(scope, collection).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(%collection, error = %e, "could not load collection, showing it empty");
            Vec::new()
        }
    }
}
