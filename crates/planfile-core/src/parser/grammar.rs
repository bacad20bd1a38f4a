//! Line grammars for the two plan-file dialects.
//!
//! The parser and updater are generic engines driven entirely by a
//! [`LineGrammar`]: a set of named, pre-compiled line patterns plus the
//! id-derivation rules for sections and items. The two document kinds
//! differ only in their grammar (and in where the status lives: the
//! task dialect carries a bracketed token after the title, the
//! test-step dialect encodes it in the checkbox character alone).

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Status;

/// A matched item line, before id derivation.
#[derive(Debug)]
pub(crate) struct ItemLine<'a> {
    /// Checkbox state character
    pub checkbox: char,
    /// Title (task) or description (test step)
    pub title: &'a str,
    /// Bracketed status token, when the dialect carries one
    pub token: Option<&'a str>,
}

/// Named line patterns and id rules for one plan-file dialect.
pub struct LineGrammar {
    heading: Regex,
    item: Regex,
    metadata: Option<Regex>,
    note: Option<Regex>,
    overview: Option<Regex>,
    success_criteria: Option<Regex>,
    bullet: Regex,
    /// True when the status is carried in a bracketed token after the
    /// title; false when the checkbox character alone encodes it.
    status_in_token: bool,
    section_id: fn(Option<&str>, usize) -> String,
    item_id: fn(&str, usize) -> String,
}

/// Grammar for the task plan dialect (`### Phase N: Title` sections,
/// bold titles, bracketed status tokens, indented metadata keys).
pub(crate) static PLAN_GRAMMAR: LazyLock<LineGrammar> = LazyLock::new(|| LineGrammar {
    heading: Regex::new(r"^### Phase (\d+): (.+?)\s*$").expect("plan heading pattern"),
    item: Regex::new(r"^- \[(.)\] \*\*(.+?)\*\* `\[([A-Za-z_]+)\]`\s*$")
        .expect("plan item pattern"),
    metadata: Some(
        Regex::new(r"^\s{2,}- ([A-Za-z][A-Za-z0-9_]*): (.+?)\s*$").expect("plan metadata pattern"),
    ),
    note: None,
    overview: Some(Regex::new(r"^## Overview\s*$").expect("plan overview pattern")),
    success_criteria: Some(
        Regex::new(r"^\*\*Success criteria:\*\*\s*$").expect("plan success criteria pattern"),
    ),
    bullet: Regex::new(r"^- (.+?)\s*$").expect("bullet pattern"),
    status_in_token: true,
    section_id: |ordinal, _index| ordinal.unwrap_or_default().to_string(),
    item_id: |section_id, position| format!("{section_id}.{position}"),
});

/// Grammar for the test plan dialect (`## Title` sections, plain
/// descriptions, status encoded in the checkbox character, optional
/// `Note:` line after a failed step).
pub(crate) static TEST_PLAN_GRAMMAR: LazyLock<LineGrammar> = LazyLock::new(|| LineGrammar {
    heading: Regex::new(r"^## (.+?)\s*$").expect("test plan heading pattern"),
    item: Regex::new(r"^- \[(.)\] (.+?)\s*$").expect("test plan item pattern"),
    metadata: None,
    note: Some(Regex::new(r"^\s{2,}Note: (.*?)\s*$").expect("test plan note pattern")),
    overview: None,
    success_criteria: None,
    bullet: Regex::new(r"^- (.+?)\s*$").expect("bullet pattern"),
    status_in_token: false,
    section_id: |_ordinal, index| format!("section-{index}"),
    item_id: |section_id, position| format!("{section_id}-{position}"),
});

impl LineGrammar {
    /// Matches a section heading, returning the ordinal capture (if
    /// the dialect has one) and the title.
    pub(crate) fn match_heading<'a>(&self, line: &'a str) -> Option<(Option<&'a str>, &'a str)> {
        let caps = self.heading.captures(line)?;
        match (caps.get(1), caps.get(2)) {
            // Ordinal + title dialect
            (Some(ordinal), Some(title)) => Some((Some(ordinal.as_str()), title.as_str())),
            // Title-only dialect
            (Some(title), None) => Some((None, title.as_str())),
            _ => None,
        }
    }

    /// Matches an item line.
    pub(crate) fn match_item<'a>(&self, line: &'a str) -> Option<ItemLine<'a>> {
        let caps = self.item.captures(line)?;
        let checkbox = caps.get(1)?.as_str().chars().next()?;
        let title = caps.get(2)?.as_str();
        let token = if self.status_in_token {
            Some(caps.get(3)?.as_str())
        } else {
            None
        };
        Some(ItemLine { checkbox, title, token })
    }

    /// Matches an indented `- Key: value` metadata line.
    pub(crate) fn match_metadata<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.metadata.as_ref()?.captures(line)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    /// Matches an indented `Note: text` line.
    pub(crate) fn match_note<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.note.as_ref()?.captures(line)?;
        Some(caps.get(1)?.as_str())
    }

    /// Matches the `## Overview` marker line.
    pub(crate) fn match_overview(&self, line: &str) -> bool {
        self.overview.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// Matches the `**Success criteria:**` marker line.
    pub(crate) fn match_success_criteria(&self, line: &str) -> bool {
        self.success_criteria
            .as_ref()
            .is_some_and(|re| re.is_match(line))
    }

    /// Matches a plain `- text` bullet line.
    pub(crate) fn match_bullet<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.bullet.captures(line)?;
        Some(caps.get(1)?.as_str())
    }

    /// Derives the status of a matched item line.
    pub(crate) fn item_status<S: Status>(&self, item: &ItemLine<'_>) -> S {
        match item.token {
            Some(token) if self.status_in_token => S::from_token(token),
            _ => S::from_checkbox(item.checkbox),
        }
    }

    /// Derives a section id from its heading ordinal and zero-based
    /// position in the document.
    pub(crate) fn section_id(&self, ordinal: Option<&str>, index: usize) -> String {
        (self.section_id)(ordinal, index)
    }

    /// Derives an item id from its section id and one-based position
    /// within the section.
    pub(crate) fn item_id(&self, section_id: &str, position: usize) -> String {
        (self.item_id)(section_id, position)
    }

    /// Splices a new status into a matched item line, replacing only
    /// the checkbox character and (for the token dialect) the status
    /// token. Every other byte of the line, including any trailing
    /// whitespace, is preserved.
    pub(crate) fn rewrite_item_line<S: Status>(&self, line: &str, status: S) -> Option<String> {
        let caps = self.item.captures(line)?;
        let checkbox = caps.get(1)?;

        let mut out = String::with_capacity(line.len() + 8);
        out.push_str(&line[..checkbox.start()]);
        out.push(status.checkbox_char());
        if self.status_in_token {
            let token = caps.get(3)?;
            out.push_str(&line[checkbox.end()..token.start()]);
            out.push_str(status.as_str());
            out.push_str(&line[token.end()..]);
        } else {
            out.push_str(&line[checkbox.end()..]);
        }
        Some(out)
    }

    /// Splices new note text into an existing matched note line,
    /// preserving its indentation and any trailing whitespace.
    pub(crate) fn rewrite_note_line(&self, line: &str, note: &str) -> Option<String> {
        let caps = self.note.as_ref()?.captures(line)?;
        let text = caps.get(1)?;

        let mut out = String::with_capacity(line.len() + note.len());
        out.push_str(&line[..text.start()]);
        out.push_str(note);
        out.push_str(&line[text.end()..]);
        Some(out)
    }

    /// Renders a fresh note line, when the dialect has one.
    pub(crate) fn render_note_line(&self, note: &str) -> Option<String> {
        self.note.as_ref()?;
        Some(format!("  Note: {note}"))
    }
}
