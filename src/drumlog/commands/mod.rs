use crate::catalog::CatalogTrack;
use crate::config::DrumlogConfig;
use crate::model::Item;
use std::path::PathBuf;

pub mod add;
pub mod checklist;
pub mod config;
pub mod delete;
pub mod find;
pub mod helpers;
pub mod list;
pub mod progress;
pub mod update;
pub mod view;

/// Where drumlog keeps its files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_items: Vec<Item>,
    pub listed_items: Vec<Item>,
    pub tracks: Vec<CatalogTrack>,
    pub config: Option<DrumlogConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<Item>) -> Self {
        self.affected_items = items;
        self
    }

    pub fn with_listed_items(mut self, items: Vec<Item>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_tracks(mut self, tracks: Vec<CatalogTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_config(mut self, config: DrumlogConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// `Title - Artist` for songs, the bare title otherwise.
pub fn display_name(item: &Item) -> String {
    match item.artist.as_deref().filter(|a| !a.is_empty()) {
        Some(artist) => format!("{} - {}", item.title, artist),
        None => item.title.clone(),
    }
}

/// Capitalized singular, for messages ("Song added: ...").
pub(crate) fn noun(collection: crate::model::Collection) -> String {
    let singular = collection.singular();
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
