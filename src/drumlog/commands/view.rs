use crate::commands::CmdResult;
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
    let items = resolve_items(store, scope, collection, ids).await?;
    Ok(CmdResult::default().with_listed_items(items))
}
