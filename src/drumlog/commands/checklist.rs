use crate::checklist::{self, ChecklistKind};
use crate::commands::{display_name, CmdMessage, CmdResult};
use crate::error::{DrumlogError, Result};
use crate::model::{Collection, Item, ItemPatch, Scope};
use crate::store::ItemStore;

use super::helpers::resolve_item;

/// An edit to one of an item's checklists. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistAction {
    Add(String),
    Toggle(u32),
    Remove(u32),
}

fn check_index(item: &Item, kind: ChecklistKind, index: u32) -> Result<()> {
    let count = checklist::entries(item.checklist(kind)).len();
    if (index as usize) < count {
        Ok(())
    } else {
        Err(DrumlogError::Api(format!(
            "{} has no {} #{} ({} listed)",
            display_name(item),
            kind.singular(),
            index + 1,
            count
        )))
    }
}

pub async fn run<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    id: &str,
    kind: ChecklistKind,
    action: ChecklistAction,
) -> Result<CmdResult> {
    let item = resolve_item(store, scope, collection, id).await?;
    let mut result = CmdResult::default();

    let (patch, message) = match action {
        ChecklistAction::Add(text) => match checklist::append(item.checklist(kind), &text) {
            Some(raw) => (
                ItemPatch::checklist(kind, raw),
                format!("Added {}: {}", kind.singular(), text.trim()),
            ),
            None => {
                result.add_message(CmdMessage::warning(format!(
                    "Nothing to add: the {} is empty",
                    kind.singular()
                )));
                return Ok(result);
            }
        },
        ChecklistAction::Toggle(index) => {
            check_index(&item, kind, index)?;
            let marks = checklist::toggle(item.completed(kind), index);
            let done = marks.contains(&index);
            (
                ItemPatch::completed(kind, marks),
                format!(
                    "{} #{} marked {}",
                    kind.singular(),
                    index + 1,
                    if done { "done" } else { "not done" }
                ),
            )
        }
        ChecklistAction::Remove(index) => {
            check_index(&item, kind, index)?;
            let (raw, marks) = checklist::remove(item.checklist(kind), item.completed(kind), index)
                .ok_or_else(|| {
                    DrumlogError::Api(format!("No {} #{}", kind.singular(), index + 1))
                })?;
            let mut patch = ItemPatch::checklist(kind, raw);
            patch.set_completed(kind, marks);
            (patch, format!("Removed {} #{}", kind.singular(), index + 1))
        }
    };

    let updated = store
        .update(scope, collection, &item.id, patch)
        .await?
        .ok_or_else(|| DrumlogError::ItemNotFound(item.id.clone()))?;
    result.add_message(CmdMessage::success(format!(
        "{} ({})",
        message,
        display_name(&updated)
    )));
    Ok(result.with_affected_items(vec![updated]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::ItemDraft;
    use crate::store::local::LocalStore;
    use crate::store::mem_backend::MemBackend;

    async fn setup() -> (LocalStore<MemBackend>, Item) {
        let store = LocalStore::new(MemBackend::new());
        let item = store
            .add(
                &Scope::Device,
                Collection::Songs,
                ItemDraft::new("Rosanna")
                    .artist("Toto")
                    .notes("half-time shuffle\n\nghost notes\nhi-hat"),
            )
            .await
            .unwrap();
        (store, item)
    }

    async fn act(
        store: &LocalStore<MemBackend>,
        id: &str,
        kind: ChecklistKind,
        action: ChecklistAction,
    ) -> Result<CmdResult> {
        run(store, &Scope::Device, Collection::Songs, id, kind, action).await
    }

    #[tokio::test]
    async fn add_appends_to_checklist() {
        let (store, item) = setup().await;
        let result = act(
            &store,
            &item.id,
            ChecklistKind::Struggles,
            ChecklistAction::Add("  bar 12 fill ".into()),
        )
        .await
        .unwrap();

        let updated = &result.affected_items[0];
        assert_eq!(updated.struggles.as_deref(), Some("bar 12 fill"));
        assert_eq!(updated.notes, item.notes);
    }

    #[tokio::test]
    async fn add_blank_text_changes_nothing() {
        let (store, item) = setup().await;
        let result = act(
            &store,
            &item.id,
            ChecklistKind::Notes,
            ChecklistAction::Add("   ".into()),
        )
        .await
        .unwrap();
        assert!(result.affected_items.is_empty());
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let (store, item) = setup().await;
        let first = act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Toggle(1))
            .await
            .unwrap();
        assert_eq!(first.affected_items[0].completed(ChecklistKind::Notes), &[1]);

        let second = act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Toggle(1))
            .await
            .unwrap();
        assert!(second.affected_items[0]
            .completed(ChecklistKind::Notes)
            .is_empty());
    }

    #[tokio::test]
    async fn toggle_out_of_range_fails() {
        let (store, item) = setup().await;
        let result = act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Toggle(3)).await;
        assert!(matches!(result, Err(DrumlogError::Api(_))));

        let result =
            act(&store, &item.id, ChecklistKind::Struggles, ChecklistAction::Toggle(0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_reindexes_marks() {
        let (store, item) = setup().await;
        act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Toggle(0))
            .await
            .unwrap();
        act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Toggle(2))
            .await
            .unwrap();

        let result = act(&store, &item.id, ChecklistKind::Notes, ChecklistAction::Remove(0))
            .await
            .unwrap();
        let updated = &result.affected_items[0];
        assert_eq!(updated.notes.as_deref(), Some("ghost notes\nhi-hat"));
        assert_eq!(updated.completed(ChecklistKind::Notes), &[1]);
    }
}
