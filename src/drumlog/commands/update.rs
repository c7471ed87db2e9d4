use crate::commands::{display_name, noun, CmdMessage, CmdResult};
use crate::error::{DrumlogError, Result};
use crate::model::{Collection, ItemPatch, Scope};
use crate::store::ItemStore;

use super::helpers::resolve_item;

pub async fn run<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    id: &str,
    mut patch: ItemPatch,
) -> Result<CmdResult> {
    let item = resolve_item(store, scope, collection, id).await?;
    if !collection.has_artist() {
        patch.artist = None;
    }

    let mut result = CmdResult::default();
    if patch.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Nothing to update for {}",
            display_name(&item)
        )));
        return Ok(result);
    }

    let updated = store
        .update(scope, collection, &item.id, patch)
        .await?
        .ok_or_else(|| DrumlogError::ItemNotFound(item.id.clone()))?;
    result.add_message(CmdMessage::success(format!(
        "{} updated: {}",
        noun(collection),
        display_name(&updated)
    )));
    Ok(result.with_affected_items(vec![updated]))
}
