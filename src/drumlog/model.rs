use crate::checklist::ChecklistKind;
use crate::error::{DrumlogError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_DIFFICULTY: i64 = 3;
pub const DEFAULT_PROGRESS: i64 = 0;

/// The storage partition an operation acts on.
///
/// `Device` is the local, per-machine partition. `User` is a signed-in
/// account; remote storage only accepts this variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Device,
    User(String),
}

impl Scope {
    /// A user scope for `uid`, refused when the id could not be a single
    /// storage path segment.
    pub fn user(uid: impl Into<String>) -> Result<Self> {
        let uid = uid.into();
        check_user_id(&uid)?;
        Ok(Scope::User(uid))
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Scope::Device => None,
            Scope::User(uid) => Some(uid),
        }
    }
}

/// User ids name a directory locally and a document path remotely.
pub fn check_user_id(uid: &str) -> Result<()> {
    let bad_char = uid.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if uid.trim().is_empty() || uid == "." || uid == ".." || bad_char {
        return Err(DrumlogError::Api(format!("Invalid user id: {:?}", uid)));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Songs,
    Skills,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Songs => "songs",
            Collection::Skills => "skills",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Songs => "song",
            Collection::Skills => "skill",
        }
    }

    /// Key the local backend stores this collection under.
    /// Existing data lives under these names, so they must not change.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Songs => "drumofir_songs",
            Collection::Skills => "drumofir_skills",
        }
    }

    pub fn has_artist(&self) -> bool {
        matches!(self, Collection::Songs)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = DrumlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "songs" | "song" => Ok(Collection::Songs),
            "skills" | "skill" => Ok(Collection::Skills),
            other => Err(DrumlogError::Api(format!("Unknown collection: {}", other))),
        }
    }
}

pub fn difficulty_label(difficulty: i64) -> Option<&'static str> {
    match difficulty {
        1 => Some("Beginner"),
        2 => Some("Easy"),
        3 => Some("Medium"),
        4 => Some("Hard"),
        5 => Some("Extreme"),
        _ => None,
    }
}

/// Current time truncated to the millisecond precision items are stored with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A tracked song or skill.
///
/// Keys unknown to this version are kept in `extra` and written back
/// unchanged, so loading and saving a collection never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub difficulty: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struggles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_notes: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_struggles: Option<Vec<u32>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn from_draft(id: String, draft: ItemDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            artist: draft.artist,
            difficulty: draft.difficulty,
            progress: draft.progress,
            notes: draft.notes,
            struggles: draft.struggles,
            completed_notes: None,
            completed_struggles: None,
            created_at,
            updated_at: None,
            extra: Map::new(),
        }
    }

    pub fn checklist(&self, kind: ChecklistKind) -> Option<&str> {
        match kind {
            ChecklistKind::Notes => self.notes.as_deref(),
            ChecklistKind::Struggles => self.struggles.as_deref(),
        }
    }

    pub fn completed(&self, kind: ChecklistKind) -> &[u32] {
        let completed = match kind {
            ChecklistKind::Notes => &self.completed_notes,
            ChecklistKind::Struggles => &self.completed_struggles,
        };
        completed.as_deref().unwrap_or(&[])
    }
}

/// Caller-supplied fields for a new item. The store assigns `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub title: String,
    pub artist: Option<String>,
    pub difficulty: i64,
    pub progress: i64,
    pub notes: Option<String>,
    pub struggles: Option<String>,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
            difficulty: DEFAULT_DIFFICULTY,
            progress: DEFAULT_PROGRESS,
            notes: None,
            struggles: None,
        }
    }

    pub fn artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn difficulty(mut self, difficulty: i64) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn progress(mut self, progress: i64) -> Self {
        self.progress = progress;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn struggles(mut self, struggles: impl Into<String>) -> Self {
        self.struggles = Some(struggles.into());
        self
    }
}

/// A partial update. Set fields overwrite the stored ones, unset fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub struggles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_notes: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_struggles: Option<Vec<u32>>,
}

impl ItemPatch {
    pub fn progress(value: i64) -> Self {
        Self {
            progress: Some(value),
            ..Self::default()
        }
    }

    pub fn checklist(kind: ChecklistKind, raw: String) -> Self {
        let mut patch = Self::default();
        match kind {
            ChecklistKind::Notes => patch.notes = Some(raw),
            ChecklistKind::Struggles => patch.struggles = Some(raw),
        }
        patch
    }

    pub fn completed(kind: ChecklistKind, indices: Vec<u32>) -> Self {
        let mut patch = Self::default();
        patch.set_completed(kind, indices);
        patch
    }

    pub fn set_completed(&mut self, kind: ChecklistKind, indices: Vec<u32>) {
        match kind {
            ChecklistKind::Notes => self.completed_notes = Some(indices),
            ChecklistKind::Struggles => self.completed_struggles = Some(indices),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            item.artist = Some(artist.clone());
        }
        if let Some(difficulty) = self.difficulty {
            item.difficulty = difficulty;
        }
        if let Some(progress) = self.progress {
            item.progress = progress;
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
        if let Some(struggles) = &self.struggles {
            item.struggles = Some(struggles.clone());
        }
        if let Some(completed) = &self.completed_notes {
            item.completed_notes = Some(completed.clone());
        }
        if let Some(completed) = &self.completed_struggles {
            item.completed_struggles = Some(completed.clone());
        }
    }

    /// The set fields only, keyed the way items are stored.
    pub fn to_fields(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMethod {
    #[default]
    Recent,
    ProgressDesc,
    ProgressAsc,
    DifficultyDesc,
    DifficultyAsc,
    Title,
}

impl SortMethod {
    pub const ALL: [SortMethod; 6] = [
        SortMethod::Recent,
        SortMethod::ProgressDesc,
        SortMethod::ProgressAsc,
        SortMethod::DifficultyDesc,
        SortMethod::DifficultyAsc,
        SortMethod::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMethod::Recent => "recent",
            SortMethod::ProgressDesc => "progress-desc",
            SortMethod::ProgressAsc => "progress-asc",
            SortMethod::DifficultyDesc => "difficulty-desc",
            SortMethod::DifficultyAsc => "difficulty-asc",
            SortMethod::Title => "title",
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMethod {
    type Err = DrumlogError;

    fn from_str(s: &str) -> Result<Self> {
        SortMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = SortMethod::ALL.iter().map(|m| m.as_str()).collect();
                DrumlogError::Api(format!(
                    "Unknown sort method: {} (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Older records may hold `null` (a NaN that went through JSON), floats or
/// numeric strings here. Anything that is not a finite number reads as 0.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64),
        _ => None,
    };
    Ok(number.unwrap_or_default())
}

/// Timestamps are stored as ISO-8601 strings with millisecond precision
/// (`2024-05-01T10:00:00.123Z`), the format browsers produce.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    fn parse(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|s| parse(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
