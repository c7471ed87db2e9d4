use super::backend::CollectionBackend;
use crate::error::{DrumlogError, Result};
use crate::model::{check_user_id, Collection, Item, Scope};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One JSON file per collection under a data directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn scope_dir(&self, scope: &Scope) -> Result<PathBuf> {
        match scope {
            Scope::Device => Ok(self.root.clone()),
            Scope::User(uid) => {
                check_user_id(uid)?;
                Ok(self.root.join("users").join(uid))
            }
        }
    }

    fn collection_path(&self, scope: &Scope, collection: Collection) -> Result<PathBuf> {
        Ok(self
            .scope_dir(scope)?
            .join(format!("{}.json", collection.storage_key())))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(DrumlogError::Io)?;
        }
        Ok(())
    }
}

impl CollectionBackend for FsBackend {
    fn load(&self, scope: &Scope, collection: Collection) -> Result<Vec<Item>> {
        let path = self.collection_path(scope, collection)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(DrumlogError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<Item> =
            serde_json::from_str(&content).map_err(DrumlogError::Serialization)?;
        Ok(items)
    }

    fn save(&self, scope: &Scope, collection: Collection, items: &[Item]) -> Result<()> {
        let dir = self.scope_dir(scope)?;
        self.ensure_dir(&dir)?;

        let target = self.collection_path(scope, collection)?;
        let content = serde_json::to_string_pretty(items).map_err(DrumlogError::Serialization)?;

        // Atomic write
        let tmp = dir.join(format!(".{}-{}.tmp", collection.storage_key(), Uuid::new_v4()));
        fs::write(&tmp, content).map_err(DrumlogError::Io)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(DrumlogError::Io(e));
        }

        tracing::debug!(path = %target.display(), count = items.len(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now, ItemDraft};
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path().to_path_buf());
        (dir, backend)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, backend) = setup();
        let items = backend.load(&Scope::Device, Collection::Songs).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_save_writes_under_storage_key() {
        let (dir, backend) = setup();
        let item = Item::from_draft("a".into(), ItemDraft::new("Rudiments"), now());
        backend
            .save(&Scope::Device, Collection::Skills, &[item])
            .unwrap();

        assert!(dir.path().join("drumofir_skills.json").exists());
        assert!(!dir.path().join("drumofir_songs.json").exists());
    }

    #[test]
    fn test_user_scope_is_partitioned() {
        let (dir, backend) = setup();
        let item = Item::from_draft("a".into(), ItemDraft::new("Rudiments"), now());
        let scope = Scope::User("drummer-1".into());
        backend.save(&scope, Collection::Skills, &[item]).unwrap();

        assert!(dir
            .path()
            .join("users/drummer-1/drumofir_skills.json")
            .exists());
        assert!(backend
            .load(&Scope::Device, Collection::Skills)
            .unwrap()
            .is_empty());
        assert_eq!(backend.load(&scope, Collection::Skills).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (dir, backend) = setup();
        fs::write(dir.path().join("drumofir_songs.json"), "[{not json").unwrap();
        let result = backend.load(&Scope::Device, Collection::Songs);
        assert!(matches!(result, Err(DrumlogError::Serialization(_))));
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let (dir, backend) = setup();
        let item = Item::from_draft("a".into(), ItemDraft::new("Rudiments"), now());
        backend
            .save(&Scope::Device, Collection::Songs, &[item])
            .unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[test]
    fn test_user_scope_cannot_leave_data_dir() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("data");
        let backend = FsBackend::new(root.clone());
        let item = Item::from_draft("a".into(), ItemDraft::new("Rudiments"), now());

        for uid in ["../../escaped", "..", "a/b"] {
            let scope = Scope::User(uid.into());
            let saved = backend.save(&scope, Collection::Songs, &[item.clone()]);
            assert!(matches!(saved, Err(DrumlogError::Api(_))), "saved for {:?}", uid);
            assert!(backend.load(&scope, Collection::Songs).is_err());
        }
        assert!(!outer.path().join("escaped").exists());
        assert!(!root.exists());
    }

    #[test]
    fn test_resave_is_byte_identical() {
        let (dir, backend) = setup();
        let mut first = Item::from_draft(
            "1714557600123".into(),
            ItemDraft::new("Rosanna").artist("Toto").notes("ghost notes"),
            now(),
        );
        first
            .extra
            .insert("practiceBpm".into(), serde_json::json!(92));
        let second = Item::from_draft("b".into(), ItemDraft::new("Aja").artist("Steely Dan"), now());
        backend
            .save(&Scope::Device, Collection::Songs, &[first, second])
            .unwrap();
        let path = dir.path().join("drumofir_songs.json");
        let written = fs::read(&path).unwrap();

        let loaded = backend.load(&Scope::Device, Collection::Songs).unwrap();
        backend
            .save(&Scope::Device, Collection::Songs, &loaded)
            .unwrap();
        assert_eq!(fs::read(&path).unwrap(), written);
    }
}
