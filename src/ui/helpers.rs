use anyhow::Error;
use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Repeat a short ASCII motif until it fills the requested width.
pub(crate) fn repeat_pattern_row(row: &str, width: usize) -> String {
    if row.is_empty() {
        return " ".repeat(width);
    }
    row.chars().cycle().take(width).collect()
}

/// Center a piece of text inside square brackets, padded to `width`.
/// Truncation and padding count characters, not bytes, so non-ASCII titles
/// cannot split a codepoint.
pub(crate) fn bracketed_line(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return " ".repeat(width);
    }
    let decorated: String = format!("[ {trimmed} ]").chars().take(width).collect();
    let used = decorated.chars().count();
    let left = (width - used) / 2;
    let right = width - used - left;
    format!("{}{decorated}{}", " ".repeat(left), " ".repeat(right))
}

/// Build the textual payload for a book card: a repeating cover texture, the
/// title, and an optional ON LOAN banner. The card under the cursor gets a
/// brighter texture and a bold title.
pub(crate) fn build_book_cover_lines(
    book: &Book,
    pattern: &[&str],
    inner_width: u16,
    inner_height: u16,
    focused: bool,
    on_loan: bool,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let mut lines = Vec::with_capacity(height);
    let pattern_rows = pattern.len();
    let label_lines = if height >= 2 { 2 } else { 1 };
    let banner_lines = usize::from(on_loan && height >= 3);
    let pattern_height = height.saturating_sub(label_lines + banner_lines);
    let pattern_style = if focused {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    if pattern_rows == 0 {
        for _ in 0..pattern_height {
            lines.push(Line::from(vec![Span::styled(
                " ".repeat(width),
                pattern_style,
            )]));
        }
    } else {
        for row_idx in 0..pattern_height {
            let base = pattern[row_idx % pattern_rows];
            let row = repeat_pattern_row(base, width);
            lines.push(Line::from(vec![Span::styled(row, pattern_style)]));
        }
    }

    if height >= 2 {
        lines.push(Line::from(vec![Span::styled(
            " ".repeat(width),
            pattern_style,
        )]));
    }

    let label_content = bracketed_line(&book.title, width);
    if book.selected {
        lines.push(Line::from(vec![Span::styled(
            label_content,
            Style::default().add_modifier(Modifier::BOLD),
        )]));
    } else {
        lines.push(Line::from(label_content));
    }

    if banner_lines > 0 {
        lines.push(Line::from(vec![Span::styled(
            bracketed_line("ON LOAN", width),
            Style::default().fg(Color::Magenta),
        )]));
    }

    while lines.len() < height {
        lines.push(Line::from(vec![Span::styled(
            " ".repeat(width),
            pattern_style,
        )]));
    }

    lines
}

/// Format an instant for display in loan listings, e.g. `Mar 01, 2026`.
pub(crate) fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%b %d, %Y").to_string()
}

/// Produce a rectangle centered within `area` that spans the requested
/// percent of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
