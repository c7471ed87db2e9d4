//! # Checklists
//!
//! Every item carries two checklists, "notes" and "struggles". Each is stored as a
//! single newline-delimited string, one entry per line, next to a set of line
//! indices marking entries as done (`completedNotes` / `completedStruggles`).
//!
//! Blank lines are not entries: indices count non-blank lines only.
//!
//! ## Index Stability
//!
//! Completion marks are plain indices, so they only make sense against the current
//! line list. Removing a line through [`remove`] re-indexes the marks: the mark on
//! the removed line is dropped and marks after it shift down by one. Marks that
//! already point past the end (written by older versions that never re-indexed)
//! are ignored by [`view`] rather than rewritten.

use crate::error::DrumlogError;
use crate::model::Item;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecklistKind {
    Notes,
    Struggles,
}

impl ChecklistKind {
    pub fn singular(&self) -> &'static str {
        match self {
            ChecklistKind::Notes => "note",
            ChecklistKind::Struggles => "struggle",
        }
    }
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistKind::Notes => f.write_str("notes"),
            ChecklistKind::Struggles => f.write_str("struggles"),
        }
    }
}

impl FromStr for ChecklistKind {
    type Err = DrumlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" | "note" => Ok(ChecklistKind::Notes),
            "struggles" | "struggle" => Ok(ChecklistKind::Struggles),
            other => Err(DrumlogError::Api(format!("Unknown checklist: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    pub index: u32,
    pub text: String,
    pub done: bool,
}

/// Non-blank lines of a raw checklist string.
pub fn entries(raw: Option<&str>) -> Vec<&str> {
    raw.map(|r| r.split('\n').filter(|line| !line.trim().is_empty()).collect())
        .unwrap_or_default()
}

/// Appends an entry, returning the new raw string.
/// Returns `None` when `text` is blank, meaning nothing changes.
pub fn append(raw: Option<&str>, text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut lines = entries(raw);
    lines.push(text);
    Some(lines.join("\n"))
}

/// Flips the completion mark on `index`.
pub fn toggle(completed: &[u32], index: u32) -> Vec<u32> {
    if completed.contains(&index) {
        completed.iter().copied().filter(|i| *i != index).collect()
    } else {
        let mut next = completed.to_vec();
        next.push(index);
        next
    }
}

/// Removes the entry at `index` and re-indexes the completion marks.
/// Returns `None` when there is no such entry.
pub fn remove(raw: Option<&str>, completed: &[u32], index: u32) -> Option<(String, Vec<u32>)> {
    let mut lines = entries(raw);
    let position = index as usize;
    if position >= lines.len() {
        return None;
    }
    lines.remove(position);

    let marks = completed
        .iter()
        .copied()
        .filter(|i| *i != index)
        .map(|i| if i > index { i - 1 } else { i })
        .collect();

    Some((lines.join("\n"), marks))
}

/// Renderable rows for one of an item's checklists.
pub fn view(item: &Item, kind: ChecklistKind) -> Vec<ChecklistEntry> {
    let completed = item.completed(kind);
    entries(item.checklist(kind))
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let index = i as u32;
            ChecklistEntry {
                index,
                text: text.to_string(),
                done: completed.contains(&index),
            }
        })
        .collect()
}

/// Number of entries marked done, ignoring stale marks.
pub fn done_count(item: &Item, kind: ChecklistKind) -> usize {
    view(item, kind).iter().filter(|e| e.done).count()
}
