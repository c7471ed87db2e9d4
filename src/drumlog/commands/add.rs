use crate::commands::{display_name, noun, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Collection, ItemDraft, Scope};
use crate::store::ItemStore;

pub async fn run<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    mut draft: ItemDraft,
) -> Result<CmdResult> {
    // Skills have no artist.
    if !collection.has_artist() {
        draft.artist = None;
    }

    let item = store.add(scope, collection, draft).await?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{} added: {}",
        noun(collection),
        display_name(&item)
    )));
    Ok(result.with_affected_items(vec![item]))
}
