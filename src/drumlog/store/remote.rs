use super::documents::{DocumentClient, Fields};
use super::ItemStore;
use crate::error::{DrumlogError, Result};
use crate::id::{IdGenerator, RandomIds};
use crate::model::{check_user_id, now, Collection, Item, ItemDraft, ItemPatch, Scope};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::Value;

/// Item repository over a per-user document collection.
///
/// Documents are keyed by the item id and hold every other field.
/// Failures from the client are returned as-is; nothing is retried.
pub struct RemoteStore<C: DocumentClient> {
    client: C,
    ids: Box<dyn IdGenerator>,
}

impl<C: DocumentClient> RemoteStore<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            ids: Box::new(RandomIds),
        }
    }

    pub fn with_ids(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

fn user(scope: &Scope) -> Result<&str> {
    let uid = scope.user_id().ok_or(DrumlogError::Unauthenticated)?;
    check_user_id(uid)?;
    Ok(uid)
}

/// Item fields minus `id`, which is the document key.
pub fn item_to_fields(item: &Item) -> Result<Fields> {
    match serde_json::to_value(item)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        _ => Err(DrumlogError::Remote(
            "Item did not serialize to an object".to_string(),
        )),
    }
}

pub fn item_from_document(id: &str, mut fields: Fields) -> Result<Item> {
    fields.insert("id".to_string(), Value::String(id.to_string()));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

#[async_trait]
impl<C: DocumentClient> ItemStore for RemoteStore<C> {
    async fn list(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>> {
        let uid = user(scope)?;
        let docs = self.client.list(uid, collection).await?;
        docs.into_iter()
            .map(|doc| item_from_document(&doc.id, doc.fields))
            .collect()
    }

    async fn get(&self, scope: &Scope, collection: Collection, id: &str) -> Result<Option<Item>> {
        let uid = user(scope)?;
        match self.client.get(uid, collection, id).await? {
            Some(fields) => Ok(Some(item_from_document(id, fields)?)),
            None => Ok(None),
        }
    }

    async fn add(&self, scope: &Scope, collection: Collection, draft: ItemDraft) -> Result<Item> {
        let uid = user(scope)?;
        let item = Item::from_draft(self.ids.new_id(), draft, now());
        let fields = item_to_fields(&item)?;
        self.client.create(uid, collection, &item.id, fields).await?;

        tracing::debug!(%collection, id = %item.id, "document created");
        Ok(item)
    }

    async fn update(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        patch: ItemPatch,
    ) -> Result<Option<Item>> {
        let uid = user(scope)?;
        let Some(mut item) = self.get(scope, collection, id).await? else {
            return Ok(None);
        };

        let stamp = now();
        let mut fields = patch.to_fields()?;
        fields.insert(
            "updatedAt".to_string(),
            Value::String(stamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        self.client.patch(uid, collection, id, fields).await?;

        patch.apply(&mut item);
        item.updated_at = Some(stamp);
        tracing::debug!(%collection, %id, "document patched");
        Ok(Some(item))
    }

    async fn delete(&self, scope: &Scope, collection: Collection, id: &str) -> Result<bool> {
        let uid = user(scope)?;
        if self.client.get(uid, collection, id).await?.is_none() {
            return Ok(false);
        }
        self.client.delete(uid, collection, id).await?;

        tracing::debug!(%collection, %id, "document deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::documents::MemDocuments;
    use serde_json::json;

    fn signed_in() -> Scope {
        Scope::User("uid-42".into())
    }

    fn store() -> RemoteStore<MemDocuments> {
        RemoteStore::new(MemDocuments::new())
    }

    #[tokio::test]
    async fn test_device_scope_is_rejected() {
        let store = store();
        let result = store.list(&Scope::Device, Collection::Songs).await;
        assert!(matches!(result, Err(DrumlogError::Unauthenticated)));

        let result = store
            .add(&Scope::Device, Collection::Songs, ItemDraft::new("Aja"))
            .await;
        assert!(matches!(result, Err(DrumlogError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_path_like_user_id_is_rejected() {
        let store = store();
        let scope = Scope::User("../other-user".into());
        let result = store
            .add(&scope, Collection::Songs, ItemDraft::new("Aja"))
            .await;
        assert!(matches!(result, Err(DrumlogError::Api(_))));
        assert!(store
            .list(&Scope::User("other-user".into()), Collection::Songs)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_document_has_no_id_field() {
        let store = store();
        let item = store
            .add(
                &signed_in(),
                Collection::Songs,
                ItemDraft::new("Rosanna").artist("Toto"),
            )
            .await
            .unwrap();

        let raw = store
            .client()
            .raw("uid-42", Collection::Songs, &item.id)
            .unwrap();
        assert!(raw.get("id").is_none());
        assert_eq!(raw["title"], json!("Rosanna"));
        assert!(raw["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_add_then_get_roundtrip() {
        let store = store();
        let item = store
            .add(&signed_in(), Collection::Skills, ItemDraft::new("Linear fills"))
            .await
            .unwrap();
        let fetched = store
            .get(&signed_in(), Collection::Skills, &item.id)
            .await
            .unwrap();
        assert_eq!(fetched, Some(item));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = store();
        let client = store.client();
        for (id, created) in [
            ("a", "2024-01-01T00:00:00.000Z"),
            ("b", "2024-03-01T00:00:00.000Z"),
            ("c", "2024-02-01T00:00:00.000Z"),
        ] {
            let fields = json!({"title": id, "difficulty": 1, "progress": 0, "createdAt": created});
            client
                .create(
                    "uid-42",
                    Collection::Songs,
                    id,
                    fields.as_object().unwrap().clone(),
                )
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .list(&signed_in(), Collection::Songs)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_update_patches_only_changed_fields() {
        let store = store();
        let item = store
            .add(
                &signed_in(),
                Collection::Songs,
                ItemDraft::new("Rosanna").artist("Toto").notes("shuffle"),
            )
            .await
            .unwrap();

        let updated = store
            .update(
                &signed_in(),
                Collection::Songs,
                &item.id,
                ItemPatch::progress(80),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.progress, 80);
        assert_eq!(updated.notes.as_deref(), Some("shuffle"));

        let fetched = store
            .get(&signed_in(), Collection::Songs, &item.id)
            .await
            .unwrap();
        assert_eq!(fetched, Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_is_absent() {
        let store = store();
        let result = store
            .update(
                &signed_in(),
                Collection::Songs,
                "missing",
                ItemPatch::progress(10),
            )
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(store
            .client()
            .raw("uid-42", Collection::Songs, "missing")
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = store();
        let item = store
            .add(&signed_in(), Collection::Skills, ItemDraft::new("Flams"))
            .await
            .unwrap();
        assert!(store
            .delete(&signed_in(), Collection::Skills, &item.id)
            .await
            .unwrap());
        assert!(!store
            .delete(&signed_in(), Collection::Skills, &item.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let store = store();
        store.client().set_offline(true);
        let result = store.list(&signed_in(), Collection::Songs).await;
        assert!(matches!(result, Err(DrumlogError::Remote(_))));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = store();
        store
            .add(&signed_in(), Collection::Songs, ItemDraft::new("Aja"))
            .await
            .unwrap();
        let other = store
            .list(&Scope::User("someone-else".into()), Collection::Songs)
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
