//! Plain-text rendering of query results.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::data::{Cell, Table};

/// Placeholder printed for missing cells.
pub const MISSING_DISPLAY: &str = "";

pub fn cell_display(cell: &Cell) -> Cow<'_, str> {
    match cell {
        Some(value) => Cow::Owned(value.as_display()),
        None => Cow::Borrowed(MISSING_DISPLAY),
    }
}

/// Renders `table` as aligned columns: header, dashed separator, then rows.
pub fn render_table(table: &Table) -> String {
    let rows = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| sanitize_cell(&cell_display(cell)).into_owned()).collect())
        .collect::<Vec<Vec<String>>>();
    let headers = table
        .headers()
        .iter()
        .map(|h| sanitize_cell(h).into_owned())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let padding = width.saturating_sub(display_width(value));
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
