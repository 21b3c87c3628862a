//! Terminal output utilities for styled CLI output.
//!
//! Commands print through [`Output`] instead of calling `println!` directly.

use console::{Term, style};
use hannou_business::{GalleryItem, TagRecord};
use std::fmt::Display;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Tabled)]
struct GalleryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

impl Output {
    /// Create a new output helper writing to stdout.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X, one line per message line.
    pub fn error(&self, message: impl Display) {
        for line in message.to_string().lines() {
            drop(
                self.term
                    .write_line(&format!("{} {}", style("✗").red().bold(), line)),
            );
        }
    }

    /// Print an info message with a blue info icon.
    pub fn info(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("ℹ").blue().bold(), message)),
        );
    }

    /// Print a plain message without any prefix.
    pub fn print(&self, message: impl Display) {
        drop(self.term.write_line(&message.to_string()));
    }

    /// Print a dim/muted message.
    pub fn dim(&self, message: impl Display) {
        drop(self.term.write_line(&style(message).dim().to_string()));
    }

    /// Print a labeled value with indentation.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        let spaces = " ".repeat(indent);
        drop(
            self.term
                .write_line(&format!("{spaces}{}: {}", style(label).dim(), value)),
        );
    }

    /// Print a clipboard notification.
    pub fn clipboard(&self, filename: impl Display, mime_type: impl Display) {
        drop(self.term.write_line(&format!(
            "{} Pasted from clipboard: {} ({})",
            style("📋").bold(),
            style(filename).white(),
            style(mime_type).dim()
        )));
    }

    /// Print a total summary line.
    pub fn total(&self, label: impl Display, count: usize, unit: &str) {
        drop(self.term.write_line(&format!(
            "\n{}: {}",
            style(label).bold(),
            style(format!("{count} {unit}(s)")).cyan()
        )));
    }

    /// Print the gallery as a table. Deleted placeholders are dimmed.
    pub fn gallery(&self, items: &[GalleryItem]) {
        if items.is_empty() {
            self.dim("No images found.");
            return;
        }

        let rows: Vec<GalleryRow> = items
            .iter()
            .map(|item| GalleryRow {
                id: item.id().to_owned(),
                tags: if item.is_deleted() {
                    style(item.record().tag_text()).dim().to_string()
                } else {
                    truncate_str(&item.record().tag_text(), 48)
                },
                updated: item
                    .record()
                    .updated_at
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        self.print(table);
        self.total("Total", items.len(), "image");
    }

    /// Print tag reference data as a table.
    pub fn tags(&self, tags: &[TagRecord]) {
        if tags.is_empty() {
            self.dim("No tags found.");
            return;
        }

        let rows: Vec<TagRow> = tags
            .iter()
            .map(|tag| TagRow {
                id: tag.id,
                name: truncate_str(&tag.name, 32),
                created: tag.created_at.format("%Y-%m-%d").to_string(),
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        self.print(table);
        self.total("Total", tags.len(), "tag");
    }
}
