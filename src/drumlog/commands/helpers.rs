use crate::error::{DrumlogError, Result};
use crate::model::{Collection, Item, Scope};
use crate::store::ItemStore;

/// Find the item a user-typed id refers to: an exact id, or else a prefix
/// shared by exactly one item.
pub fn match_id<'a>(items: &'a [Item], input: &str, collection: Collection) -> Result<&'a Item> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DrumlogError::Api("Id cannot be empty".into()));
    }

    if let Some(item) = items.iter().find(|item| item.id == input) {
        return Ok(item);
    }

    let matches: Vec<&Item> = items
        .iter()
        .filter(|item| item.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [item] => Ok(*item),
        [] => Err(DrumlogError::Api(format!(
            "No {} with id {}",
            collection.singular(),
            input
        ))),
        many => Err(DrumlogError::Api(format!(
            "Id {} is ambiguous: {} {} match",
            input,
            many.len(),
            collection
        ))),
    }
}

pub async fn resolve_item<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    input: &str,
) -> Result<Item> {
    let items = store.list(scope, collection).await?;
    match_id(&items, input, collection).cloned()
}

pub async fn resolve_items<S: ItemStore + ?Sized, I: AsRef<str>>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    inputs: &[I],
) -> Result<Vec<Item>> {
    let items = store.list(scope, collection).await?;
    inputs
        .iter()
        .map(|input| match_id(&items, input.as_ref(), collection).cloned())
        .collect()
}
