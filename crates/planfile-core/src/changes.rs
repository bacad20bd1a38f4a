//! Change-set computation between two parsed documents.

use std::collections::{HashMap, HashSet};

use crate::models::{Change, Document, Status};

/// Diffs two documents by item id.
///
/// The result lists additions and status changes in `new`'s flattened
/// iteration order, followed by removals in `old`'s flattened order.
/// The two-pass ordering is part of the public contract: the list is
/// surfaced directly to the user in the conflict-resolution display.
///
/// Only the stored status participates in change detection; titles,
/// notes, metadata, and the derived `blocked` overlay do not.
pub fn compute_changes<S: Status>(old: &Document<S>, new: &Document<S>) -> Vec<Change<S>> {
    let old_by_id: HashMap<&str, S> = old.items().map(|i| (i.id.as_str(), i.status)).collect();
    let new_ids: HashSet<&str> = new.items().map(|i| i.id.as_str()).collect();

    let mut changes = Vec::new();

    for item in new.items() {
        match old_by_id.get(item.id.as_str()) {
            None => changes.push(Change::ItemAdded {
                id: item.id.clone(),
                status: item.status,
                title: item.title.clone(),
            }),
            Some(&old_status) if old_status != item.status => {
                changes.push(Change::StatusChanged {
                    id: item.id.clone(),
                    old: old_status,
                    new: item.status,
                    title: item.title.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for item in old.items() {
        if !new_ids.contains(item.id.as_str()) {
            changes.push(Change::ItemRemoved {
                id: item.id.clone(),
                status: item.status,
                title: item.title.clone(),
            });
        }
    }

    changes
}

/// Diff against an optional prior document.
///
/// The first successful parse has nothing to conflict with, so a
/// missing `old` always yields an empty change set.
pub fn compute_changes_opt<S: Status>(
    old: Option<&Document<S>>,
    new: &Document<S>,
) -> Vec<Change<S>> {
    match old {
        Some(old) => compute_changes(old, new),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PlanKind;
    use crate::models::TaskStatus;
    use crate::parser::parse;

    fn doc(text: &str) -> Document<TaskStatus> {
        parse::<PlanKind>(text)
    }

    #[test]
    fn identical_documents_produce_no_changes() {
        let a = doc("### Phase 1: Setup\n- [ ] **A** `[pending]`\n");
        assert!(compute_changes(&a, &a).is_empty());
    }

    #[test]
    fn status_change_is_detected() {
        let a = doc("### Phase 1: Setup\n- [ ] **A** `[pending]`\n");
        let b = doc("### Phase 1: Setup\n- [x] **A** `[complete]`\n");

        let changes = compute_changes(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0],
            Change::StatusChanged {
                id: "1.1".to_string(),
                old: TaskStatus::Pending,
                new: TaskStatus::Complete,
                title: "A".to_string(),
            }
        );
    }

    #[test]
    fn title_only_edits_are_not_changes() {
        let a = doc("### Phase 1: Setup\n- [ ] **A** `[pending]`\n");
        let b = doc("### Phase 1: Setup\n- [ ] **A (reworded)** `[pending]`\n");
        assert!(compute_changes(&a, &b).is_empty());
    }

    #[test]
    fn additions_precede_removals_in_contract_order() {
        let a = doc(
            "### Phase 1: Setup\n\
             - [ ] **A** `[pending]`\n\
             - [ ] **B** `[pending]`\n",
        );
        let b = doc(
            "### Phase 1: Setup\n\
             - [x] **A** `[complete]`\n\
             \n\
             ### Phase 2: Build\n\
             - [ ] **C** `[pending]`\n",
        );

        let changes = compute_changes(&a, &b);
        let ids: Vec<&str> = changes.iter().map(Change::item_id).collect();
        assert_eq!(ids, vec!["1.1", "2.1", "1.2"]);
        assert!(matches!(changes[0], Change::StatusChanged { .. }));
        assert!(matches!(changes[1], Change::ItemAdded { .. }));
        assert!(matches!(changes[2], Change::ItemRemoved { .. }));
    }

    #[test]
    fn no_prior_document_never_conflicts() {
        let b = doc("### Phase 1: Setup\n- [ ] **A** `[pending]`\n");
        assert!(compute_changes_opt(None, &b).is_empty());
        assert_eq!(compute_changes_opt(Some(&b), &b), Vec::new());
    }
}
