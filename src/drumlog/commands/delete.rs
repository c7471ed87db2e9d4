use crate::commands::{display_name, noun, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Collection, Scope};
use crate::store::ItemStore;

use super::helpers::resolve_items;

pub async fn run<S: ItemStore + ?Sized, I: AsRef<str>>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    ids: &[I],
) -> Result<CmdResult> {
    let resolved = resolve_items(store, scope, collection, ids).await?;
    let mut result = CmdResult::default();

    for item in resolved {
        if store.delete(scope, collection, &item.id).await? {
            result.add_message(CmdMessage::success(format!(
                "{} deleted: {}",
                noun(collection),
                display_name(&item)
            )));
            result.affected_items.push(item);
        } else {
            result.add_message(CmdMessage::warning(format!(
                "Already gone: {}",
                display_name(&item)
            )));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemDraft;
    use crate::store::local::LocalStore;
    use crate::store::mem_backend::MemBackend;

    #[tokio::test]
    async fn deletes_items() {
        let store = LocalStore::new(MemBackend::new());
        let keep = store
            .add(&Scope::Device, Collection::Skills, ItemDraft::new("Keep"))
            .await
            .unwrap();
        let gone = store
            .add(&Scope::Device, Collection::Skills, ItemDraft::new("Drop"))
            .await
            .unwrap();

        let result = run(&store, &Scope::Device, Collection::Skills, &[&gone.id])
            .await
            .unwrap();
        assert_eq!(result.affected_items, vec![gone]);
        assert_eq!(result.messages[0].content, "Skill deleted: Drop");

        let left = store.list(&Scope::Device, Collection::Skills).await.unwrap();
        assert_eq!(left, vec![keep]);
    }

    #[tokio::test]
    async fn same_id_twice_warns_on_second() {
        let store = LocalStore::new(MemBackend::new());
        let added = store
            .add(&Scope::Device, Collection::Skills, ItemDraft::new("Once"))
            .await
            .unwrap();

        let result = run(
            &store,
            &Scope::Device,
            Collection::Skills,
            &[&added.id, &added.id],
        )
        .await
        .unwrap();
        assert_eq!(result.affected_items.len(), 1);
        assert_eq!(result.messages[1].content, "Already gone: Once");
    }
}
