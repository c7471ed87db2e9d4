use crate::commands::{display_name, CmdMessage, CmdResult};
use crate::error::{DrumlogError, Result};
use crate::model::{Collection, ItemPatch, Scope};
use crate::store::ItemStore;

use super::helpers::resolve_item;

/// Set an item's mastery percentage.
pub async fn run<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    id: &str,
    progress: i64,
) -> Result<CmdResult> {
    let item = resolve_item(store, scope, collection, id).await?;
    let updated = store
        .update(scope, collection, &item.id, ItemPatch::progress(progress))
        .await?
        .ok_or_else(|| DrumlogError::ItemNotFound(item.id.clone()))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{}: {}% mastered",
        display_name(&updated),
        updated.progress
    )));
    Ok(result.with_affected_items(vec![updated]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemDraft;
    use crate::store::local::LocalStore;
    use crate::store::mem_backend::MemBackend;

    #[tokio::test]
    async fn sets_progress() {
        let store = LocalStore::new(MemBackend::new());
        let added = store
            .add(
                &Scope::Device,
                Collection::Songs,
                ItemDraft::new("Aja").artist("Steely Dan"),
            )
            .await
            .unwrap();

        let result = run(&store, &Scope::Device, Collection::Songs, &added.id, 65)
            .await
            .unwrap();
        assert_eq!(result.affected_items[0].progress, 65);
        assert_eq!(result.messages[0].content, "Aja - Steely Dan: 65% mastered");

        let stored = store
            .get(&Scope::Device, Collection::Songs, &added.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.progress, 65);
    }
}
