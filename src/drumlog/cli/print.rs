use chrono::{DateTime, Utc};
use colored::Colorize;
use drumlog::api::{CmdMessage, MessageLevel};
use drumlog::catalog::CatalogTrack;
use drumlog::checklist::{self, ChecklistKind};
use drumlog::commands::display_name;
use drumlog::config::DrumlogConfig;
use drumlog::model::{difficulty_label, Collection, Item};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 10;
const BAR_CELLS: usize = 10;
/// Longer ids are cut to this many characters in listings.
const SHORT_ID_LEN: usize = 8;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// UUIDs are cut down; timestamp ids are short enough to show whole.
pub(super) fn short_id(id: &str) -> &str {
    if id.len() <= 13 {
        return id;
    }
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn progress_bar(progress: i64) -> String {
    let clamped = progress.clamp(0, 100) as usize;
    let filled = (clamped * BAR_CELLS + 50) / 100;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled),
        progress
    )
}

fn colored_bar(progress: i64) -> String {
    let bar = progress_bar(progress);
    match progress {
        p if p >= 80 => bar.green().to_string(),
        p if p >= 40 => bar.yellow().to_string(),
        _ => bar.normal().to_string(),
    }
}

fn difficulty_text(difficulty: i64) -> String {
    difficulty_label(difficulty)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Level {}", difficulty))
}

pub(super) fn print_items(items: &[Item], collection: Collection) {
    if items.is_empty() {
        println!("No {} found.", collection);
        return;
    }

    for item in items {
        let id = format!("{:<width$}", short_id(&item.id), width = ID_WIDTH);
        let bar = progress_bar(item.progress);
        let difficulty = format!("{:<10}", difficulty_text(item.difficulty));
        let time_ago = format_time_ago(item.created_at);

        let fixed_width = id.width() + bar.width() + difficulty.width() + TIME_WIDTH + 4;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let name = truncate_to_width(&display_name(item), available);
        let padding = available.saturating_sub(name.width());

        println!(
            "{}{}{}  {}  {}{}",
            id.yellow(),
            name,
            " ".repeat(padding),
            colored_bar(item.progress),
            difficulty.dimmed(),
            time_ago.dimmed()
        );
    }
}

fn print_checklist(item: &Item, kind: ChecklistKind) {
    let entries = checklist::view(item, kind);
    let title = match kind {
        ChecklistKind::Notes => "Notes",
        ChecklistKind::Struggles => "Struggles",
    };
    if entries.is_empty() {
        println!("{}: {}", title.bold(), "none".dimmed());
        return;
    }

    println!(
        "{} ({}/{} done):",
        title.bold(),
        checklist::done_count(item, kind),
        entries.len()
    );
    for entry in entries {
        let position = format!("{:>3}.", entry.index + 1);
        if entry.done {
            println!("  {} {} {}", position.dimmed(), "[x]".green(), entry.text.dimmed());
        } else {
            println!("  {} [ ] {}", position, entry.text);
        }
    }
}

pub(super) fn print_full_items(items: &[Item]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!("{} {}", item.id.yellow(), item.title.bold());
        println!("--------------------------------");
        if let Some(artist) = item.artist.as_deref().filter(|a| !a.is_empty()) {
            println!("Artist:     {}", artist);
        }
        println!(
            "Difficulty: {} ({})",
            difficulty_text(item.difficulty),
            item.difficulty
        );
        println!("Mastery:    {}", colored_bar(item.progress));
        println!(
            "Added:      {}",
            format_time_ago(item.created_at).trim().dimmed()
        );
        if let Some(updated) = item.updated_at {
            println!("Updated:    {}", format_time_ago(updated).trim().dimmed());
        }
        println!();
        print_checklist(item, ChecklistKind::Notes);
        print_checklist(item, ChecklistKind::Struggles);
    }
}

pub(super) fn print_tracks(tracks: &[CatalogTrack]) {
    for (i, track) in tracks.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{:>3}.", i + 1).yellow(),
            track.title.bold(),
            track.artist.dimmed()
        );
    }
}

pub(super) fn print_config(config: &DrumlogConfig) {
    for (key, value) in config.entries() {
        let shown = if value.is_empty() {
            "(unset)".dimmed().to_string()
        } else {
            value
        };
        println!("{:<14} {}", key, shown);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
