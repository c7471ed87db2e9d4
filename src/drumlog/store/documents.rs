use crate::error::{DrumlogError, Result};
use crate::model::Collection;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub type Fields = Map<String, Value>;

/// A stored document: its key plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Raw per-user document access for the remote adapter.
///
/// Each call is an independent request. Nothing orders concurrent calls on the
/// same document, and the last write wins.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// All documents of a user's collection, newest `createdAt` first.
    async fn list(&self, uid: &str, collection: Collection) -> Result<Vec<Document>>;

    async fn get(&self, uid: &str, collection: Collection, id: &str) -> Result<Option<Fields>>;

    /// Write a full document at a client-chosen id.
    async fn create(&self, uid: &str, collection: Collection, id: &str, fields: Fields)
        -> Result<()>;

    /// Field-level merge: only the given fields are written.
    async fn patch(&self, uid: &str, collection: Collection, id: &str, fields: Fields)
        -> Result<()>;

    async fn delete(&self, uid: &str, collection: Collection, id: &str) -> Result<()>;
}

type DocKey = (String, Collection);

/// In-memory document client for testing.
#[derive(Default)]
pub struct MemDocuments {
    docs: Mutex<HashMap<DocKey, HashMap<String, Fields>>>,
    offline: AtomicBool,
}

impl MemDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Raw fields of a stored document, bypassing the offline switch.
    pub fn raw(&self, uid: &str, collection: Collection, id: &str) -> Option<Fields> {
        let docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        docs.get(&(uid.to_string(), collection))
            .and_then(|c| c.get(id))
            .cloned()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DrumlogError::Remote("Simulated network failure".to_string()));
        }
        Ok(())
    }
}

fn created_at(fields: &Fields) -> &str {
    fields
        .get("createdAt")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[async_trait]
impl DocumentClient for MemDocuments {
    async fn list(&self, uid: &str, collection: Collection) -> Result<Vec<Document>> {
        self.check_online()?;
        let docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        let mut listed: Vec<Document> = docs
            .get(&(uid.to_string(), collection))
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        listed.sort_by(|a, b| created_at(&b.fields).cmp(created_at(&a.fields)));
        Ok(listed)
    }

    async fn get(&self, uid: &str, collection: Collection, id: &str) -> Result<Option<Fields>> {
        self.check_online()?;
        Ok(self.raw(uid, collection, id))
    }

    async fn create(
        &self,
        uid: &str,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<()> {
        self.check_online()?;
        let mut docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        docs.entry((uid.to_string(), collection))
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn patch(
        &self,
        uid: &str,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<()> {
        self.check_online()?;
        let mut docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        let doc = docs
            .entry((uid.to_string(), collection))
            .or_default()
            .entry(id.to_string())
            .or_default();
        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, uid: &str, collection: Collection, id: &str) -> Result<()> {
        self.check_online()?;
        let mut docs = self.docs.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(c) = docs.get_mut(&(uid.to_string(), collection)) {
            c.remove(id);
        }
        Ok(())
    }
}
