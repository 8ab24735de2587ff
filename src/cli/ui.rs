use crate::core::sync::SyncBanner;
use chrono::NaiveDate;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Success => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "-".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("-")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Green rate cell used for the highlighted column of a history table.
pub fn highlight_cell(value: Option<f64>, precision: usize) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{v:.precision$}"))
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right),
        None => format_optional_cell(None::<f64>, |v| v.to_string()),
    }
}

/// Active/inactive marker for a roster row.
pub fn status_cell(active: bool) -> Cell {
    if active {
        Cell::new("● active")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("○ inactive").fg(Color::DarkGrey)
    }
}

/// Spinner shown while a view is in its loading state.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders a sync outcome in green or red.
pub fn banner(banner: &SyncBanner) -> String {
    if banner.ok {
        style(&banner.message).green().to_string()
    } else {
        style(&banner.message).red().to_string()
    }
}

/// Message shown in place of a table or chart that has no rows.
pub fn empty_state(message: &str) -> String {
    style_text(message, StyleType::Subtle)
}

/// "Page x of y" footer, empty when everything fits on one page.
pub fn page_footer(page: usize, total_pages: usize) -> Option<String> {
    (total_pages > 1).then(|| {
        style_text(
            &format!("Page {page} of {total_pages}"),
            StyleType::Subtle,
        )
    })
}

/// One-line summary of a chart series: date span, value range and latest value.
pub fn series_summary(points: &[(NaiveDate, Option<f64>)]) -> Option<String> {
    let (first, _) = points.first()?;
    let (last, _) = points.last()?;
    let values: Vec<f64> = points.iter().filter_map(|(_, v)| *v).collect();
    let latest = values.last()?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(format!(
        "{} points, {first} → {last} | low {min:.4} | high {max:.4} | latest {latest:.4}",
        points.len()
    ))
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
