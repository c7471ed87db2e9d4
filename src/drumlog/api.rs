//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for all drumlog operations, regardless of the UI in front of it.
//!
//! The API:
//! - **Dispatches** to the matching command function
//! - **Normalizes inputs** (user-typed ids are resolved by the commands, which
//!   accept an exact id or a unique prefix)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints, never exits, and holds no business logic.
//!
//! ## Generic Over ItemStore
//!
//! `DrumlogApi<S: ItemStore>` works with any repository:
//! - Production: `DrumlogApi<Box<dyn ItemStore>>`, local or remote chosen at startup
//! - Testing: `DrumlogApi<LocalStore<MemBackend>>`
//!
//! The scope and collection are passed on every call, the same way the store
//! takes them.

use crate::catalog::CatalogClient;
use crate::checklist::ChecklistKind;
use crate::commands;
use crate::error::Result;
use crate::model::{Collection, ItemDraft, ItemPatch, Scope};
use crate::store::ItemStore;

pub struct DrumlogApi<S: ItemStore> {
    store: S,
    paths: commands::DataPaths,
    catalog: CatalogClient,
}

impl<S: ItemStore> DrumlogApi<S> {
    pub fn new(store: S, paths: commands::DataPaths) -> Self {
        Self {
            store,
            paths,
            catalog: CatalogClient::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = catalog;
        self
    }

    pub async fn add_item(
        &self,
        scope: &Scope,
        collection: Collection,
        draft: ItemDraft,
    ) -> Result<commands::CmdResult> {
        commands::add::run(&self.store, scope, collection, draft).await
    }

    pub async fn list_items(
        &self,
        scope: &Scope,
        collection: Collection,
        filter: &ListFilter,
    ) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, scope, collection, filter).await
    }

    pub async fn view_items<I: AsRef<str>>(
        &self,
        scope: &Scope,
        collection: Collection,
        ids: &[I],
    ) -> Result<commands::CmdResult> {
        commands::view::run(&self.store, scope, collection, ids).await
    }

    pub async fn update_item(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        patch: ItemPatch,
    ) -> Result<commands::CmdResult> {
        commands::update::run(&self.store, scope, collection, id, patch).await
    }

    pub async fn set_progress(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        progress: i64,
    ) -> Result<commands::CmdResult> {
        commands::progress::run(&self.store, scope, collection, id, progress).await
    }

    pub async fn delete_items<I: AsRef<str>>(
        &self,
        scope: &Scope,
        collection: Collection,
        ids: &[I],
    ) -> Result<commands::CmdResult> {
        commands::delete::run(&self.store, scope, collection, ids).await
    }

    pub async fn edit_checklist(
        &self,
        scope: &Scope,
        collection: Collection,
        id: &str,
        kind: ChecklistKind,
        action: ChecklistAction,
    ) -> Result<commands::CmdResult> {
        commands::checklist::run(&self.store, scope, collection, id, kind, action).await
    }

    pub async fn search_catalog(&self, query: &str, limit: usize) -> Result<commands::CmdResult> {
        commands::find::run(&self.catalog, query, limit).await
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub use crate::commands::checklist::ChecklistAction;
pub use crate::commands::config::ConfigAction;
pub use commands::list::ListFilter;
pub use commands::{CmdMessage, CmdResult, DataPaths, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrumlogError;
    use crate::model::SortMethod;
    use crate::store::local::LocalStore;
    use crate::store::mem_backend::MemBackend;
    use tempfile::tempdir;

    fn api(dir: &std::path::Path) -> DrumlogApi<LocalStore<MemBackend>> {
        DrumlogApi::new(
            LocalStore::new(MemBackend::new()),
            DataPaths::new(dir.to_path_buf()),
        )
    }

    #[tokio::test]
    async fn add_then_list_dispatches_to_store() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        api.add_item(
            &Scope::Device,
            Collection::Songs,
            ItemDraft::new("Aja").artist("Steely Dan"),
        )
        .await
        .unwrap();

        let result = api
            .list_items(&Scope::Device, Collection::Songs, &ListFilter::default())
            .await
            .unwrap();
        assert_eq!(result.listed_items.len(), 1);
        assert_eq!(api.store().list(&Scope::Device, Collection::Songs).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn scopes_are_kept_apart() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        let user = Scope::User("drummer-1".into());
        api.add_item(&user, Collection::Skills, ItemDraft::new("Flams"))
            .await
            .unwrap();

        let device = api
            .list_items(&Scope::Device, Collection::Skills, &ListFilter::default())
            .await
            .unwrap();
        assert!(device.listed_items.is_empty());
    }

    #[tokio::test]
    async fn progress_and_checklist_go_through_id_prefix() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        let added = api
            .add_item(
                &Scope::Device,
                Collection::Skills,
                ItemDraft::new("Linear fills"),
            )
            .await
            .unwrap()
            .affected_items
            .remove(0);
        let prefix = &added.id[..6];

        api.set_progress(&Scope::Device, Collection::Skills, prefix, 30)
            .await
            .unwrap();
        api.edit_checklist(
            &Scope::Device,
            Collection::Skills,
            prefix,
            ChecklistKind::Struggles,
            ChecklistAction::Add("left hand lead".into()),
        )
        .await
        .unwrap();

        let viewed = api
            .view_items(&Scope::Device, Collection::Skills, &[prefix])
            .await
            .unwrap();
        let item = &viewed.listed_items[0];
        assert_eq!(item.progress, 30);
        assert_eq!(item.struggles.as_deref(), Some("left hand lead"));
    }

    #[tokio::test]
    async fn unknown_id_is_api_error() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        let result = api
            .delete_items(&Scope::Device, Collection::Songs, &["missing"])
            .await;
        assert!(matches!(result, Err(DrumlogError::Api(_))));
    }

    #[tokio::test]
    async fn list_uses_requested_sort() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        for (title, progress) in [("A", 10), ("B", 90), ("C", 50)] {
            api.add_item(
                &Scope::Device,
                Collection::Skills,
                ItemDraft::new(title).progress(progress),
            )
            .await
            .unwrap();
        }
        let filter = ListFilter {
            search: None,
            sort: SortMethod::ProgressDesc,
        };
        let result = api
            .list_items(&Scope::Device, Collection::Skills, &filter)
            .await
            .unwrap();
        let titles: Vec<&str> = result.listed_items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[test]
    fn config_dispatches() {
        let temp = tempdir().unwrap();
        let api = api(temp.path());
        let result = api.config(ConfigAction::ShowAll).unwrap();
        assert!(result.config.is_some());
    }
}
