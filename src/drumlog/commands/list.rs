use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{Collection, Item, Scope, SortMethod};
use crate::store::ItemStore;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub search: Option<String>,
    pub sort: SortMethod,
}

/// Case-insensitive substring match. Songs match on title or artist,
/// skills on title only. A blank term matches everything.
pub fn matches_search(item: &Item, collection: Collection, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    if item.title.to_lowercase().contains(&term) {
        return true;
    }
    collection.has_artist()
        && item
            .artist
            .as_deref()
            .is_some_and(|artist| artist.to_lowercase().contains(&term))
}

/// Stable sort: items that compare equal keep their incoming order.
pub fn sort_items(items: &mut [Item], method: SortMethod) {
    match method {
        SortMethod::Recent => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMethod::ProgressDesc => items.sort_by(|a, b| b.progress.cmp(&a.progress)),
        SortMethod::ProgressAsc => items.sort_by(|a, b| a.progress.cmp(&b.progress)),
        SortMethod::DifficultyDesc => items.sort_by(|a, b| b.difficulty.cmp(&a.difficulty)),
        SortMethod::DifficultyAsc => items.sort_by(|a, b| a.difficulty.cmp(&b.difficulty)),
        SortMethod::Title => items.sort_by_key(|item| item.title.to_lowercase()),
    }
}

pub fn filter_and_sort(items: Vec<Item>, collection: Collection, filter: &ListFilter) -> Vec<Item> {
    let mut listed: Vec<Item> = match filter.search.as_deref() {
        Some(term) => items
            .into_iter()
            .filter(|item| matches_search(item, collection, term))
            .collect(),
        None => items,
    };
    sort_items(&mut listed, filter.sort);
    listed
}

pub async fn run<S: ItemStore + ?Sized>(
    store: &S,
    scope: &Scope,
    collection: Collection,
    filter: &ListFilter,
) -> Result<CmdResult> {
    let items = store.list(scope, collection).await?;
    let listed = filter_and_sort(items, collection, filter);
    Ok(CmdResult::default().with_listed_items(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDraft, ItemPatch};
    use crate::store::local::LocalStore;
    use crate::store::mem_backend::MemBackend;
    use chrono::{Duration, TimeZone, Utc};

    fn song(id: &str, title: &str, artist: &str, progress: i64, difficulty: i64) -> Item {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let offset: i64 = id.parse().unwrap_or(0);
        Item::from_draft(
            id.into(),
            ItemDraft::new(title)
                .artist(artist)
                .progress(progress)
                .difficulty(difficulty),
            base + Duration::minutes(offset),
        )
    }

    fn songs() -> Vec<Item> {
        vec![
            song("1", "rosanna", "Toto", 40, 4),
            song("2", "Aja", "Steely Dan", 80, 5),
            song("3", "Billie Jean", "Michael Jackson", 40, 2),
        ]
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn recent_puts_newest_first() {
        let mut items = songs();
        sort_items(&mut items, SortMethod::Recent);
        assert_eq!(ids(&items), vec!["3", "2", "1"]);
    }

    #[test]
    fn progress_sorts_are_stable() {
        let mut items = songs();
        sort_items(&mut items, SortMethod::ProgressDesc);
        assert_eq!(ids(&items), vec!["2", "1", "3"]);

        let mut items = songs();
        sort_items(&mut items, SortMethod::ProgressAsc);
        assert_eq!(ids(&items), vec!["1", "3", "2"]);
    }

    #[test]
    fn difficulty_sorts() {
        let mut items = songs();
        sort_items(&mut items, SortMethod::DifficultyDesc);
        assert_eq!(ids(&items), vec!["2", "1", "3"]);

        sort_items(&mut items, SortMethod::DifficultyAsc);
        assert_eq!(ids(&items), vec!["3", "1", "2"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut items = songs();
        sort_items(&mut items, SortMethod::Title);
        assert_eq!(ids(&items), vec!["2", "3", "1"]);
    }

    #[test]
    fn sorting_keeps_the_same_items() {
        for method in SortMethod::ALL {
            let mut items = songs();
            sort_items(&mut items, method);
            let mut sorted_ids = ids(&items);
            sorted_ids.sort();
            assert_eq!(sorted_ids, vec!["1", "2", "3"], "{}", method);
        }
    }

    #[test]
    fn search_matches_title_or_artist_for_songs() {
        let items = songs();
        let filter = ListFilter {
            search: Some("STEELY".into()),
            sort: SortMethod::Recent,
        };
        let listed = filter_and_sort(items, Collection::Songs, &filter);
        assert_eq!(ids(&listed), vec!["2"]);
    }

    #[test]
    fn search_ignores_artist_for_skills() {
        let items = songs();
        let filter = ListFilter {
            search: Some("toto".into()),
            sort: SortMethod::Recent,
        };
        assert!(filter_and_sort(items, Collection::Skills, &filter).is_empty());
    }

    #[test]
    fn blank_search_matches_everything() {
        let filter = ListFilter {
            search: Some("  ".into()),
            sort: SortMethod::Title,
        };
        assert_eq!(filter_and_sort(songs(), Collection::Songs, &filter).len(), 3);
    }

    #[tokio::test]
    async fn lists_from_store() {
        let store = LocalStore::new(MemBackend::new());
        for title in ["One", "Two"] {
            store
                .add(&Scope::Device, Collection::Skills, ItemDraft::new(title))
                .await
                .unwrap();
        }
        let filter = ListFilter {
            search: None,
            sort: SortMethod::Title,
        };
        let result = run(&store, &Scope::Device, Collection::Skills, &filter)
            .await
            .unwrap();
        let titles: Vec<&str> = result.listed_items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn updated_progress_moves_item_up() {
        let store = LocalStore::new(MemBackend::new());
        let first = store
            .add(&Scope::Device, Collection::Skills, ItemDraft::new("A"))
            .await
            .unwrap();
        store
            .add(&Scope::Device, Collection::Skills, ItemDraft::new("B"))
            .await
            .unwrap();
        store
            .update(
                &Scope::Device,
                Collection::Skills,
                &first.id,
                ItemPatch::progress(80),
            )
            .await
            .unwrap();

        let filter = ListFilter {
            search: None,
            sort: SortMethod::ProgressDesc,
        };
        let result = run(&store, &Scope::Device, Collection::Skills, &filter)
            .await
            .unwrap();
        assert_eq!(result.listed_items[0].id, first.id);
        assert_eq!(result.listed_items[0].progress, 80);
    }
}
