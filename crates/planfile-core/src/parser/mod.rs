//! Markdown plan-file parser.
//!
//! [`parse`] is a pure function of its input text: no I/O, no mutable
//! global state, safe to call from both the synchronous watcher
//! startup path and the async reload path. It never fails on content;
//! a completely empty or non-matching file parses to an empty
//! document. [`parse_path`] layers the file read on top for callers on
//! the async path.

pub mod grammar;


use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SyncError};
use crate::kind::DocKind;
use crate::models::{Document, Item, Section, Status};

/// What the lines before the first section are currently feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopMatter {
    None,
    Overview,
    SuccessCriteria,
}

/// Parses plan-file text into a document.
///
/// Section headings and item lines are located by the kind's line
/// grammar; indented `- Key: value` lines between one item and the
/// next become that item's metadata (unrecognized keys are ignored,
/// not an error). Unrecognized status tokens fall back to the status
/// enum's default member.
///
/// After all sections are built, a second pass marks any task whose
/// dependencies are not yet complete or skipped with the transient
/// `blocked` overlay. The overlay is display state only: it is never
/// written back to the file and never participates in change
/// detection.
pub fn parse<K: DocKind>(text: &str) -> Document<K::Status> {
    let g = K::grammar();
    let mut doc = Document::new();
    let mut top_matter = TopMatter::None;
    let mut overview_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some((ordinal, title)) = g.match_heading(line) {
            let id = g.section_id(ordinal, doc.sections.len());
            doc.sections.push(Section::new(id, title));
            top_matter = TopMatter::None;
            continue;
        }

        if let Some(section) = doc.sections.last_mut() {
            if let Some(item_line) = g.match_item(line) {
                let status = g.item_status::<K::Status>(&item_line);
                let id = g.item_id(&section.id, section.items.len() + 1);
                section.items.push(Item::new(id, item_line.title, status));
            } else if let Some(note) = g.match_note(line) {
                if let Some(item) = section.items.last_mut() {
                    item.note = Some(note.to_string());
                }
            } else if let Some((key, value)) = g.match_metadata(line) {
                if let Some(item) = section.items.last_mut() {
                    apply_metadata(item, key, value);
                }
            }
            continue;
        }

        // Document-level top matter, only recognized before the first
        // section. Missing blocks are simply omitted, never an error.
        if g.match_overview(line) {
            top_matter = TopMatter::Overview;
        } else if g.match_success_criteria(line) {
            top_matter = TopMatter::SuccessCriteria;
        } else {
            match top_matter {
                TopMatter::Overview => {
                    if line.starts_with('#') || line.starts_with("**") {
                        top_matter = TopMatter::None;
                    } else if !line.trim().is_empty() {
                        overview_lines.push(line.trim());
                    }
                }
                TopMatter::SuccessCriteria => {
                    if let Some(bullet) = g.match_bullet(line) {
                        doc.success_criteria.push(bullet.to_string());
                    } else if !line.trim().is_empty() {
                        top_matter = TopMatter::None;
                    }
                }
                TopMatter::None => {}
            }
        }
    }

    if !overview_lines.is_empty() {
        doc.overview = Some(overview_lines.join(" "));
    }

    resolve_blocked(&mut doc);
    doc
}

/// Reads and parses a plan file on the async path.
///
/// Delegates to the identical pure [`parse`]; the only failure mode is
/// the file read itself.
pub async fn parse_path<K: DocKind>(path: &Path) -> Result<Document<K::Status>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SyncError::file_system(path, e))?;
    Ok(parse::<K>(&text))
}

/// Maps a recognized metadata key onto the item's typed fields. Free
/// keys are ignored.
fn apply_metadata<S: Status>(item: &mut Item<S>, key: &str, value: &str) {
    if key.eq_ignore_ascii_case("spec") {
        item.spec = Some(value.to_string());
    } else if key.eq_ignore_ascii_case("scope") {
        item.scope = Some(value.to_string());
    } else if key.eq_ignore_ascii_case("acceptance") {
        item.acceptance = Some(value.to_string());
    } else if key.eq_ignore_ascii_case("session") {
        item.session = Some(value.to_string());
    } else if key.eq_ignore_ascii_case("depends") {
        item.depends = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
}

/// Marks items whose dependencies are not yet satisfied with the
/// derived `blocked` overlay. Dependencies on unknown ids are left
/// unevaluated rather than treated as blocking.
fn resolve_blocked<S: Status>(doc: &mut Document<S>) {
    let statuses: HashMap<String, S> = doc
        .items()
        .map(|item| (item.id.clone(), item.status))
        .collect();

    for section in &mut doc.sections {
        for item in &mut section.items {
            item.blocked = item
                .depends
                .iter()
                .any(|dep| statuses.get(dep).is_some_and(|s| !s.satisfies_dependency()));
        }
    }
}
