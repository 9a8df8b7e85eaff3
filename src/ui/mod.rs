//! Terminal output helpers for the CLI.

use comfy_table::{Attribute, Cell, Table};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::models::BookSummary;

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Truncate a string for a table cell.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let clipped: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{clipped}...")
    } else {
        text.to_string()
    }
}

/// Render a page of books as a table.
pub fn render_table(books: &[BookSummary], first_index: usize) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_width(terminal_width() as u16);
    table.set_header(vec!["#", "Title", "Authors", "Link"]);

    for (offset, book) in books.iter().enumerate() {
        table.add_row(vec![
            Cell::new(first_index + offset + 1),
            Cell::new(clip(&book.title, 50)).add_attribute(Attribute::Bold),
            Cell::new(clip(&book.authors_joined(), 30)),
            Cell::new(clip(&book.detail_url, 40)),
        ]);
    }

    table.to_string()
}

/// Render a page of books as plain text.
pub fn render_plain(books: &[BookSummary], first_index: usize) -> String {
    let mut out = String::new();
    for (offset, book) in books.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} - {}\n",
            first_index + offset + 1,
            book.title,
            book.authors_joined()
        ));
        if book.has_valid_detail_url() {
            out.push_str(&format!("   {}\n", book.detail_url));
        }
    }
    out
}

/// Print a status line, colored when stdout is a terminal.
pub fn print_status(message: &str) {
    if is_terminal() {
        eprintln!("{}", message.cyan());
    } else {
        eprintln!("{message}");
    }
}

/// Print an error line, colored when stdout is a terminal.
pub fn print_error(message: &str) {
    if is_terminal() {
        eprintln!("{} {}", "error:".red().bold(), message);
    } else {
        eprintln!("error: {message}");
    }
}
