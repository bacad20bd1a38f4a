//! Command handlers bridging parsed arguments to the core engine.
//!
//! Each handler is generic over the document kind so that the task-plan
//! and test-plan dialects share one code path; `main` picks the kind
//! from the global `--test-plan` flag.

use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use log::info;
use planfile_core::{
    compute_changes, parse_path, update_status_in_file, DocKind, Document, FileWatcher, Status,
};

use crate::renderer::TerminalRenderer;

/// CLI command handler holding the shared renderer.
pub struct Cli {
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(renderer: TerminalRenderer) -> Self {
        Self { renderer }
    }

    /// Parses a plan file and renders it to the terminal, or emits the
    /// parsed document as JSON.
    pub async fn show<K: DocKind>(&self, file: &Path, json: bool) -> Result<()>
    where
        K::Status: serde::Serialize,
    {
        let document = parse_path::<K>(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&document)?);
        } else {
            self.renderer.render(&format_document(&document))?;
        }
        Ok(())
    }

    /// Rewrites one item's status line in place.
    pub async fn set<K: DocKind>(
        &self,
        file: &Path,
        id: &str,
        status: &str,
        note: Option<&str>,
    ) -> Result<()>
    where
        K::Status: FromStr<Err = String>,
    {
        let status = K::Status::from_str(status).map_err(|message| anyhow!(message))?;

        update_status_in_file::<K>(file, id, status, note)
            .await
            .with_context(|| format!("Failed to update {}", file.display()))?;

        info!("Updated {} to {} in {}", id, status, file.display());
        println!("{id} -> {status}");
        Ok(())
    }

    /// Prints the change set between two versions of a plan file.
    pub async fn diff<K: DocKind>(&self, old: &Path, new: &Path, json: bool) -> Result<()>
    where
        K::Status: serde::Serialize,
    {
        let old_doc = parse_path::<K>(old)
            .await
            .with_context(|| format!("Failed to read {}", old.display()))?;
        let new_doc = parse_path::<K>(new)
            .await
            .with_context(|| format!("Failed to read {}", new.display()))?;

        let changes = compute_changes(&old_doc, &new_doc);
        if json {
            println!("{}", serde_json::to_string_pretty(&changes)?);
        } else if changes.is_empty() {
            println!("No changes");
        } else {
            for change in &changes {
                println!("{change}");
            }
        }
        Ok(())
    }

    /// Watches a plan file and prints change events until interrupted.
    pub async fn watch<K: DocKind>(&self, file: &Path) -> Result<()> {
        let initial = parse_path::<K>(file).await.ok();
        let watcher: FileWatcher<K> = FileWatcher::new(file);

        watcher.on_reloaded(|document: &Document<K::Status>| {
            println!("reloaded ({} items)", document.item_count());
        });
        watcher.on_conflict_detected(|_, changes| {
            println!("external edit detected:");
            for change in changes {
                println!("  {change}");
            }
        });
        watcher.on_created(|document: &Document<K::Status>| {
            println!("file created ({} items)", document.item_count());
        });
        watcher.on_deleted(|| println!("file deleted"));

        watcher
            .start_watching(initial)
            .with_context(|| format!("Failed to watch {}", file.display()))?;
        println!("Watching {} (Ctrl-C to stop)", file.display());

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        watcher.stop_watching();
        Ok(())
    }
}

/// Formats a parsed document back into display markdown.
///
/// This is a presentation view, not the wire format: statuses render
/// with icons, blocked items are flagged, and metadata appears as
/// indented detail lines.
fn format_document<S: Status>(document: &Document<S>) -> String {
    let mut out = String::new();

    if let Some(overview) = &document.overview {
        out.push_str("# Overview\n\n");
        out.push_str(overview);
        out.push_str("\n\n");
    }
    if !document.success_criteria.is_empty() {
        out.push_str("**Success criteria:**\n");
        for criterion in &document.success_criteria {
            out.push_str(&format!("- {criterion}\n"));
        }
        out.push('\n');
    }

    for section in &document.sections {
        out.push_str(&format!("## {}\n\n", section.title));
        for item in &section.items {
            let blocked = if item.blocked { " *(blocked)*" } else { "" };
            out.push_str(&format!(
                "- `{}` **{}** {}{}\n",
                item.id,
                item.title,
                item.status.with_icon(),
                blocked
            ));
            if !item.depends.is_empty() {
                out.push_str(&format!("  - Depends: {}\n", item.depends.join(", ")));
            }
            if let Some(note) = &item.note {
                out.push_str(&format!("  - Note: {note}\n"));
            }
        }
        out.push('\n');
    }

    if document.sections.is_empty() {
        out.push_str("*(no sections)*\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use planfile_core::{parse, PlanKind};

    use super::*;

    const PLAN: &str = "\
### Phase 1: Setup
- [x] **Scaffold** `[complete]`
- [ ] **Wire CI** `[pending]`
  - Depends: 1.1
";

    #[test]
    fn format_includes_ids_and_blocked_flags() {
        let document = parse::<PlanKind>(PLAN);
        let rendered = format_document(&document);

        assert!(rendered.contains("## Setup"));
        assert!(rendered.contains("`1.1` **Scaffold**"));
        assert!(rendered.contains("✓ Complete"));
        // 1.1 is complete, so 1.2 is not blocked.
        assert!(!rendered.contains("(blocked)"));
    }

    #[test]
    fn format_flags_blocked_items() {
        let plan = PLAN.replace("- [x] **Scaffold** `[complete]`", "- [ ] **Scaffold** `[pending]`");
        let document = parse::<PlanKind>(&plan);
        let rendered = format_document(&document);

        assert!(rendered.contains("`1.2` **Wire CI** ○ Pending *(blocked)*"));
    }

    #[test]
    fn format_handles_empty_documents() {
        let document = parse::<PlanKind>("");
        assert!(format_document(&document).contains("(no sections)"));
    }
}
