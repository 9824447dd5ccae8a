//! Plain-text rendering of the view model.
use std::fmt::Write as _;

use drishya_core::{AppViewModel, ConnectionState, PageView};

const MAX_CELL_WIDTH: usize = 48;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "! {banner}");
    }
    match &view.page {
        Some(page) if view.loading => {
            let _ = writeln!(out, "Loading {}...", page.view);
        }
        Some(page) => render_page(&mut out, page),
        None => {}
    }
    if view.connection != ConnectionState::Disconnected {
        let _ = writeln!(out, "live: {}", view.connection);
    }
    out
}

fn render_page(out: &mut String, page: &PageView) {
    if let Some(message) = page.empty_message() {
        let _ = writeln!(out, "{message}");
    } else {
        let widths = column_widths(page);
        let header: Vec<String> = page.columns.iter().map(|c| c.to_uppercase()).collect();
        write_row(out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(out, &rule, &widths);
        for row in &page.rows {
            let cells: Vec<String> = row.cells.iter().map(|cell| clip(cell)).collect();
            write_row(out, &cells, &widths);
        }
    }

    let _ = write!(
        out,
        "{} page {} of {}, {} of {} shown",
        page.view, page.current_page, page.total_pages, page.matching, page.total
    );
    let _ = write!(
        out,
        ", sorted by {} {}",
        page.sort.field,
        page.sort.direction.as_str()
    );
    out.push('\n');

    if !page.search.is_empty() {
        let _ = writeln!(out, "search: {:?}", page.search);
    }
    for (field, values) in &page.filters {
        let _ = writeln!(out, "filter: {field} in [{}]", values.join(", "));
    }
}

fn column_widths(page: &PageView) -> Vec<usize> {
    page.columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            page.rows
                .iter()
                .filter_map(|row| row.cells.get(index))
                .map(|cell| clip(cell).chars().count())
                .fold(column.chars().count(), usize::max)
        })
        .collect()
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}
