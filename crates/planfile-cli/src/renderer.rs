//! Terminal rendering for plan documents.
//!
//! The display markdown produced by the command handlers uses a fixed
//! vocabulary: `##` section headings, inline-code item ids, bold item
//! titles, and italic `*(blocked)*` markers. The skin here styles
//! exactly those elements, with a plain-text fallback for `--no-color`.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Renders plan display markdown to the terminal.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    /// Create a new terminal renderer
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        // Section headings
        skin.set_headers_fg(Color::Cyan);
        // Item titles
        skin.bold.set_fg(Color::White);
        // Blocked markers
        skin.italic.set_fg(Color::Red);
        // Item ids
        skin.inline_code.set_fg(Color::Yellow);
        skin.inline_code.set_bg(Color::AnsiValue(236));

        Self { rich_enabled, skin }
    }

    /// Render plan markdown to the terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if self.rich_enabled {
            // Headings keep their hash symbols so the output still
            // reads as the underlying markdown.
            for line in markdown.lines() {
                if line.starts_with('#') {
                    println!("\x1b[36m{line}\x1b[0m");
                } else {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        } else {
            print!("{markdown}");
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
    }

    #[test]
    fn test_default_is_rich() {
        let renderer = TerminalRenderer::default();
        assert!(renderer.rich_enabled);
    }
}
