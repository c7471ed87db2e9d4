//! # CLI Layer
//!
//! This module is **one possible UI client** for drumlog. It is the only place
//! that parses arguments, writes to the terminal, or picks exit codes.
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments into typed commands via clap
//! 2. **Context Setup**: data dir, config, the chosen store, scope and collection
//! 3. **Input Checks**: what a form would refuse (empty title, song without artist)
//! 4. **API Dispatch**: call the matching `DrumlogApi` method
//! 5. **Output Formatting**: `CmdResult` into colored terminal output
//!
//! ## Environment
//!
//! - `DRUMLOG_HOME`: data directory (defaults to the platform data dir)
//! - `DRUMLOG_ID_TOKEN`: bearer token sent to Firestore
//! - `DRUMLOG_LOG`: log filter, overrides `-v`

use super::print::{
    print_config, print_full_items, print_items, print_messages, print_tracks,
};
use super::setup::{
    print_grouped_help, print_help_for_command, print_subcommand_help, ChecklistCommand, Cli,
    Commands, CoreCommands, ItemCommands, MiscCommands,
};
use clap::Parser;
use directories::ProjectDirs;
use drumlog::api::{ChecklistAction, ConfigAction, DataPaths, DrumlogApi, ListFilter};
use drumlog::catalog::{CatalogClient, DEFAULT_LIMIT};
use drumlog::checklist::ChecklistKind;
use drumlog::commands;
use drumlog::config::{BackendKind, DrumlogConfig};
use drumlog::error::{DrumlogError, Result};
use drumlog::logging;
use drumlog::model::{Collection, ItemDraft, ItemPatch, Scope, SortMethod};
use drumlog::store::firestore::FirestoreClient;
use drumlog::store::fs_backend::FsBackend;
use drumlog::store::local::LocalStore;
use drumlog::store::remote::RemoteStore;
use drumlog::store::ItemStore;
use std::path::PathBuf;

const HOME_ENV: &str = "DRUMLOG_HOME";
const TOKEN_ENV: &str = "DRUMLOG_ID_TOKEN";

struct AppContext {
    api: DrumlogApi<Box<dyn ItemStore>>,
    scope: Scope,
    collection: Collection,
    sort: SortMethod,
}

/// Fields shared by `add` and `edit`.
struct ItemFields {
    title: Option<String>,
    artist: Option<String>,
    difficulty: Option<i64>,
    progress: Option<i64>,
    notes: Option<String>,
    struggles: Option<String>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.help {
        if cli.command.is_none() {
            print_grouped_help();
        } else {
            print_subcommand_help(&cli.command);
        }
        return Ok(());
    }

    // Neither needs a store.
    match &cli.command {
        Some(Commands::Misc(MiscCommands::Help { command })) => {
            return handle_help(command.clone());
        }
        Some(Commands::Misc(MiscCommands::Config { key, value })) => {
            return handle_config(&data_dir()?, key.clone(), value.clone());
        }
        _ => {}
    }

    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Core(cmd)) => match cmd {
            CoreCommands::Add {
                artist,
                difficulty,
                progress,
                notes,
                struggles,
                lookup,
                pick,
                title,
            } => {
                let title = if title.is_empty() {
                    None
                } else {
                    Some(title.join(" "))
                };
                let fields = ItemFields {
                    title,
                    artist,
                    difficulty,
                    progress,
                    notes,
                    struggles,
                };
                handle_add(&ctx, fields, lookup, pick).await
            }
            CoreCommands::List { search, sort } => handle_list(&ctx, search, sort).await,
            CoreCommands::Find { limit, query } => handle_find(&ctx, query.join(" "), limit).await,
        },
        Some(Commands::Item(cmd)) => match cmd {
            ItemCommands::View { ids } => handle_view(&ctx, ids).await,
            ItemCommands::Edit {
                id,
                title,
                artist,
                difficulty,
                progress,
                notes,
                struggles,
            } => {
                let fields = ItemFields {
                    title,
                    artist,
                    difficulty,
                    progress,
                    notes,
                    struggles,
                };
                handle_edit(&ctx, id, fields).await
            }
            ItemCommands::Progress { id, value } => handle_progress(&ctx, id, value).await,
            ItemCommands::Delete { ids } => handle_delete(&ctx, ids).await,
            ItemCommands::Note { action } => {
                handle_checklist(&ctx, ChecklistKind::Notes, action).await
            }
            ItemCommands::Struggle { action } => {
                handle_checklist(&ctx, ChecklistKind::Struggles, action).await
            }
        },
        Some(Commands::Misc(_)) => Ok(()),
        None => handle_list(&ctx, None, None).await,
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let proj_dirs = ProjectDirs::from("com", "drumlog", "drumlog")
        .ok_or_else(|| DrumlogError::Config("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn build_store(
    config: &DrumlogConfig,
    backend: BackendKind,
    data_dir: &std::path::Path,
) -> Result<Box<dyn ItemStore>> {
    let ids = config.id_strategy.generator();
    match backend {
        BackendKind::Local => Ok(Box::new(
            LocalStore::new(FsBackend::new(data_dir.to_path_buf())).with_ids(ids),
        )),
        BackendKind::Remote => {
            let project_id = config.project_id.clone().ok_or_else(|| {
                DrumlogError::Config(
                    "Remote storage needs a Firestore project (drumlog config project-id <ID>)"
                        .into(),
                )
            })?;
            let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
            let client = FirestoreClient::new(project_id)
                .with_base_url(config.firestore_url.clone())
                .with_id_token(token);
            Ok(Box::new(RemoteStore::new(client).with_ids(ids)))
        }
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = DrumlogConfig::load(&data_dir).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        DrumlogConfig::default()
    });

    let backend = if cli.remote {
        BackendKind::Remote
    } else {
        config.backend
    };
    let store = build_store(&config, backend, &data_dir)?;

    let scope = match cli.user.clone().or_else(|| config.user.clone()) {
        Some(uid) if !uid.trim().is_empty() => Scope::user(uid)?,
        _ => Scope::Device,
    };
    let collection = if cli.skills {
        Collection::Skills
    } else {
        Collection::Songs
    };
    tracing::debug!(%backend, ?scope, %collection, data_dir = %data_dir.display(), "context ready");

    let api = DrumlogApi::new(store, DataPaths::new(data_dir))
        .with_catalog(CatalogClient::new(config.catalog_url.clone()));

    Ok(AppContext {
        api,
        scope,
        collection,
        sort: config.sort,
    })
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DrumlogError::Api("Title cannot be empty".into()));
    }
    Ok(())
}

async fn handle_add(
    ctx: &AppContext,
    fields: ItemFields,
    lookup: Option<String>,
    pick: u32,
) -> Result<()> {
    let mut draft = ItemDraft::new(String::new());

    if let Some(query) = lookup {
        let found = ctx
            .api
            .search_catalog(&query, DEFAULT_LIMIT.max(pick as usize))
            .await?;
        print_messages(&found.messages);
        let track = found.tracks.get(pick as usize - 1).ok_or_else(|| {
            DrumlogError::Catalog(format!("No result #{} for \"{}\"", pick, query.trim()))
        })?;
        draft = track.apply_to_draft(draft);
    }

    if let Some(title) = fields.title {
        draft.title = title;
    }
    draft.title = draft.title.trim().to_string();
    require_title(&draft.title)?;

    if let Some(artist) = fields.artist {
        draft.artist = Some(artist.trim().to_string());
    }
    let has_artist = matches!(draft.artist.as_deref(), Some(a) if !a.is_empty());
    if ctx.collection.has_artist() && !has_artist {
        return Err(DrumlogError::Api(
            "Songs need an artist (--artist or --lookup)".into(),
        ));
    }

    if let Some(difficulty) = fields.difficulty {
        draft.difficulty = difficulty;
    }
    if let Some(progress) = fields.progress {
        draft.progress = progress;
    }
    draft.notes = fields.notes;
    draft.struggles = fields.struggles;

    let result = ctx.api.add_item(&ctx.scope, ctx.collection, draft).await?;
    print_messages(&result.messages);
    for item in &result.affected_items {
        println!("{}", item.id);
    }
    Ok(())
}

async fn handle_list(
    ctx: &AppContext,
    search: Option<String>,
    sort: Option<SortMethod>,
) -> Result<()> {
    let filter = ListFilter {
        search,
        sort: sort.unwrap_or(ctx.sort),
    };
    let result = ctx
        .api
        .list_items(&ctx.scope, ctx.collection, &filter)
        .await?;
    print_items(&result.listed_items, ctx.collection);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_view(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.view_items(&ctx.scope, ctx.collection, &ids).await?;
    print_full_items(&result.listed_items);
    print_messages(&result.messages);
    Ok(())
}

async fn handle_edit(ctx: &AppContext, id: String, fields: ItemFields) -> Result<()> {
    if let Some(title) = &fields.title {
        require_title(title)?;
    }
    if ctx.collection.has_artist() && fields.artist.as_deref().is_some_and(|a| a.trim().is_empty())
    {
        return Err(DrumlogError::Api("Artist cannot be empty".into()));
    }

    let patch = ItemPatch {
        title: fields.title.map(|t| t.trim().to_string()),
        artist: fields.artist.map(|a| a.trim().to_string()),
        difficulty: fields.difficulty,
        progress: fields.progress,
        notes: fields.notes,
        struggles: fields.struggles,
        ..ItemPatch::default()
    };
    let result = ctx
        .api
        .update_item(&ctx.scope, ctx.collection, &id, patch)
        .await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_progress(ctx: &AppContext, id: String, value: i64) -> Result<()> {
    let result = ctx
        .api
        .set_progress(&ctx.scope, ctx.collection, &id, value)
        .await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_delete(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx
        .api
        .delete_items(&ctx.scope, ctx.collection, &ids)
        .await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_checklist(
    ctx: &AppContext,
    kind: ChecklistKind,
    command: ChecklistCommand,
) -> Result<()> {
    // Positions on the command line count from 1.
    let (id, action) = match command {
        ChecklistCommand::Add { id, text } => (id, ChecklistAction::Add(text.join(" "))),
        ChecklistCommand::Toggle { id, position } => (id, ChecklistAction::Toggle(position - 1)),
        ChecklistCommand::Rm { id, position } => (id, ChecklistAction::Remove(position - 1)),
    };
    let result = ctx
        .api
        .edit_checklist(&ctx.scope, ctx.collection, &id, kind, action)
        .await?;
    print_messages(&result.messages);
    Ok(())
}

async fn handle_find(ctx: &AppContext, query: String, limit: usize) -> Result<()> {
    let result = ctx.api.search_catalog(&query, limit).await?;
    print_tracks(&result.tracks);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(
    data_dir: &std::path::Path,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let paths = DataPaths::new(data_dir.to_path_buf());
    let result = commands::config::run(&paths, action)?;
    if let Some(config) = &result.config {
        if result.messages.is_empty() {
            print_config(config);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(name) => print_help_for_command(&name),
        None => print_grouped_help(),
    }
    Ok(())
}
