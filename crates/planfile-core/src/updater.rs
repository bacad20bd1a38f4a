//! Incremental status rewriting for plan-file text.
//!
//! The updater patches exactly one item's line (and, for the test-plan
//! dialect, its adjacent `Note:` line) and leaves every other byte of
//! the input untouched. The minimal diff is load-bearing: the
//! watcher's own-write detection and the silent-reload path both
//! depend on it.

use std::path::Path;

use crate::error::{Result, SyncError};
use crate::kind::DocKind;
use crate::models::Status;

/// Rewrites the status of one item in plan-file text.
///
/// The returned text is identical to the input except for the located
/// item's checkbox character and status token, plus the adjacent note
/// line for the test-plan dialect: present when the new status carries
/// a note and one is supplied, removed otherwise (including when a
/// previously failed step moves away from `failed`).
///
/// # Errors
///
/// Returns [`SyncError::ItemNotFound`] when `item_id` does not
/// correspond to any item line in `text`; the input is not mutated.
/// The write queue treats this as a loggable, skippable condition.
pub fn update_status<K: DocKind>(
    text: &str,
    item_id: &str,
    status: K::Status,
    note: Option<&str>,
) -> Result<String> {
    let g = K::grammar();
    let segments: Vec<&str> = text.split_inclusive('\n').collect();

    // Locate the target line with the same id derivation the parser
    // uses: section heading ordinal/position plus one-based item
    // position. The replacement is spliced from the matched line's
    // capture spans, so the rewrite happens at locate time.
    let mut section_id: Option<String> = None;
    let mut section_count = 0usize;
    let mut item_position = 0usize;
    let mut target: Option<(usize, String)> = None;

    for (index, segment) in segments.iter().enumerate() {
        let line = strip_eol(segment);
        if let Some((ordinal, _)) = g.match_heading(line) {
            section_id = Some(g.section_id(ordinal, section_count));
            section_count += 1;
            item_position = 0;
            continue;
        }
        let Some(sid) = section_id.as_deref() else {
            continue;
        };
        if g.match_item(line).is_some() {
            item_position += 1;
            if g.item_id(sid, item_position) == item_id {
                if let Some(rewritten) = g.rewrite_item_line(line, status) {
                    target = Some((index, rewritten));
                }
                break;
            }
        }
    }

    let Some((target_index, rewritten)) = target else {
        return Err(SyncError::ItemNotFound {
            id: item_id.to_string(),
        });
    };

    let has_old_note = segments
        .get(target_index + 1)
        .is_some_and(|s| g.match_note(strip_eol(s)).is_some());
    let new_note = if status.carries_note() { note } else { None };

    let mut out = String::with_capacity(text.len() + 64);
    for (index, segment) in segments.iter().enumerate() {
        if index == target_index {
            let eol = eol_of(segment);
            out.push_str(&rewritten);
            if let (Some(n), false) = (new_note, has_old_note) {
                if let Some(note_line) = g.render_note_line(n) {
                    if eol.is_empty() {
                        out.push('\n');
                        out.push_str(&note_line);
                    } else {
                        out.push_str(eol);
                        out.push_str(&note_line);
                        out.push_str(eol);
                    }
                    continue;
                }
            }
            out.push_str(eol);
        } else if index == target_index + 1 && has_old_note {
            // Existing note line: splice the new text in place to keep
            // the original indentation, or drop it when the new status
            // no longer carries one.
            if let Some(n) = new_note {
                if let Some(note_line) = g.rewrite_note_line(strip_eol(segment), n) {
                    out.push_str(&note_line);
                    out.push_str(eol_of(segment));
                }
            }
        } else {
            out.push_str(segment);
        }
    }

    Ok(out)
}

/// File-level convenience: reads `path`, patches one item's status,
/// and writes the result back.
///
/// # Errors
///
/// Returns [`SyncError::FileSystem`] on read/write failure and
/// [`SyncError::ItemNotFound`] when the id is absent from the file.
pub async fn update_status_in_file<K: DocKind>(
    path: &Path,
    item_id: &str,
    status: K::Status,
    note: Option<&str>,
) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SyncError::file_system(path, e))?;
    let updated = update_status::<K>(&text, item_id, status, note)?;
    tokio::fs::write(path, updated)
        .await
        .map_err(|e| SyncError::file_system(path, e))?;
    Ok(())
}

fn strip_eol(segment: &str) -> &str {
    segment.trim_end_matches('\n').trim_end_matches('\r')
}

fn eol_of(segment: &str) -> &str {
    if segment.ends_with("\r\n") {
        "\r\n"
    } else if segment.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}
