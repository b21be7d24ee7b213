//! Frame layout.

use std::time::Instant;

use crossterm::style::Color;
use specimen_lib::tree::{CheckState, FlatRow};

use super::{App, Focus, TaxonomyView};
use crate::text::{Line, Style, side_by_side};

/// Share of the width given to the taxonomy pane, in percent.
const LEFT_PANE_PERCENT: usize = 55;

fn header(title: &str, focused: bool) -> Line {
    let style = if focused {
        Style::fg(Color::Cyan).bold()
    } else {
        Style::default().bold()
    };
    Line::styled(title, style)
}

fn muted(text: impl Into<String>) -> Line {
    Line::styled(text, Style::fg(Color::DarkGrey))
}

/// Builds the full frame for a `width` x `height` terminal.
pub(super) fn frame(app: &mut App, width: u16, height: u16, now: Instant) -> Vec<Line> {
    let width = width as usize;
    let height = height as usize;
    if height < 3 {
        return vec![Line::raw(app.status())];
    }
    let body_height = height - 2;
    let left_width = width * LEFT_PANE_PERCENT / 100;

    let title = Line::styled(" Specimen search ", Style::fg(Color::Black).on(Color::Cyan))
        .push(format!(" {}", app.client.base_url()), Style::fg(Color::DarkGrey));

    let left = taxonomy_pane(app, body_height, now);
    let right = right_pane(app, body_height);

    let mut lines = Vec::with_capacity(height);
    lines.push(title);
    let mut body = side_by_side(left, right, left_width);
    body.resize(body_height, Line::default());
    lines.extend(body);
    lines.push(status_line(app));
    lines
}

fn taxonomy_pane(app: &mut App, height: usize, now: Instant) -> Vec<Line> {
    let focus = app.focus;
    let panel = match &mut app.taxonomy {
        TaxonomyView::Loading => {
            return vec![header("Taxonomy", focus == Focus::Tree), muted("Loading taxonomy...")];
        }
        TaxonomyView::Failed(message) => {
            return vec![
                header("Taxonomy", focus == Focus::Tree),
                Line::styled(message.clone(), Style::fg(Color::Red)),
            ];
        }
        TaxonomyView::Ready(panel) => panel,
    };

    let mut lines = Vec::with_capacity(height);
    let checked = panel.tree().checked_count();
    lines.push(header(
        &format!("Taxonomy ({} checked)", checked),
        matches!(focus, Focus::Tree | Focus::Search),
    ));

    let searching = focus == Focus::Search;
    let search_style = if searching {
        Style::fg(Color::Yellow)
    } else {
        Style::fg(Color::DarkGrey)
    };
    let prompt = if searching || !panel.query().is_empty() {
        format!("/ {}", panel.query())
    } else {
        "/ search".to_string()
    };
    lines.push(Line::styled(prompt, search_style));

    if searching {
        if panel.suggestions().is_empty() && !panel.query().trim().is_empty() {
            lines.push(muted("  no matches"));
        }
        for (index, entry) in panel.suggestions().iter().enumerate() {
            let style = if index == panel.suggestion_cursor() {
                Style::default().reverse()
            } else {
                Style::default()
            };
            lines.push(Line::styled(format!("  {}", entry.label()), style));
        }
    }

    panel.set_viewport_height(height.saturating_sub(lines.len()));
    let highlighted = panel.highlighted(now);
    let cursor = panel.cursor();
    let tree_focused = focus == Focus::Tree;
    for index in panel.visible_range() {
        let row = &panel.rows()[index];
        let mut style = row_style(row);
        if highlighted == Some(row.id) {
            style = style.on(Color::DarkYellow);
        }
        if index == cursor && tree_focused {
            style = style.reverse();
        }
        lines.push(Line::styled(row_text(row), style));
    }
    lines
}

fn row_text(row: &FlatRow) -> String {
    format!(
        "{}{} {} {}",
        "  ".repeat(row.depth as usize),
        row.glyph(),
        row.checkbox(),
        row.label
    )
}

fn row_style(row: &FlatRow) -> Style {
    match row.check {
        CheckState::Checked => Style::fg(Color::Green),
        CheckState::Indeterminate => Style::fg(Color::Yellow),
        CheckState::Unchecked => Style::default(),
    }
}

fn right_pane(app: &App, height: usize) -> Vec<Line> {
    let mut lines = Vec::with_capacity(height);

    lines.push(header("Options", app.focus == Focus::Options));
    for row in app.form.rows() {
        let text = format!(" {:<24}{}", row.field.label(), row.value);
        let mut style = if row.enabled {
            Style::default()
        } else {
            Style::fg(Color::DarkGrey)
        };
        if row.focused && app.focus == Focus::Options {
            style = style.reverse();
        }
        lines.push(Line::styled(text, style));
    }

    lines.push(Line::default());
    lines.push(header("SQL", false));
    match &app.results.sql {
        Some(sql) if sql.starts_with("Error: ") => {
            lines.push(Line::styled(format!(" {}", sql), Style::fg(Color::Red)));
        }
        Some(sql) => lines.extend(sql.lines().map(|l| Line::raw(format!(" {}", l)))),
        None => lines.push(muted(" Ctrl+R to build a query")),
    }

    if let Some(sent) = &app.results.sent {
        lines.push(Line::default());
        lines.push(header("Sent", false));
        lines.extend(sent.lines().map(|l| muted(format!(" {}", l))));
    }

    lines.push(Line::default());
    let focused = app.focus == Focus::Results;
    let Some(response) = &app.results.response else {
        lines.push(header("Results", focused));
        return lines;
    };

    lines.push(header(&format!("Results ({})", response.row_count()), focused));
    if !response.columns.is_empty() {
        lines.push(Line::styled(response.columns.join(" | "), Style::default().bold()));
    }
    let room = height.saturating_sub(lines.len());
    lines.extend(
        response
            .display_rows()
            .into_iter()
            .skip(app.results.scroll_offset)
            .take(room)
            .map(|cells| Line::raw(cells.join(" | "))),
    );
    lines
}

fn status_line(app: &App) -> Line {
    let hints = match app.focus {
        Focus::Tree => "↑↓ move  ←→ fold  Space check  / search",
        Focus::Search => "type to search  ↑↓ pick  Enter reveal  Esc back",
        Focus::Options => "↑↓ field  Space/←→ change",
        Focus::Results => "↑↓ scroll",
    };
    Line::styled(format!(" {} ", app.status()), Style::fg(Color::Black).on(Color::Grey))
        .push(format!("  {}  Tab focus  Ctrl+R query  Ctrl+Q quit", hints), Style::fg(Color::DarkGrey))
}

#[cfg(test)]
mod tests {
    use specimen_lib::SpecimenClient;
    use specimen_lib::error::ApiError;
    use specimen_lib::model::TaxonNode;

    use super::*;
    use crate::app::Message;

    fn app() -> App {
        let client = SpecimenClient::builder()
            .url("http://127.0.0.1:9")
            .build()
            .unwrap();
        App::new(client).0
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.text()).collect()
    }

    #[test]
    fn test_frame_fills_height() {
        let mut app = app();
        let lines = frame(&mut app, 80, 20, Instant::now());
        assert_eq!(lines.len(), 20);
        assert!(texts(&lines)[2].contains("Loading taxonomy..."));
        assert!(texts(&lines)[19].contains("Loading taxonomy..."));
    }

    #[test]
    fn test_failure_replaces_tree() {
        let mut app = app();
        app.handle_message(Message::TaxonomyLoaded(Err(ApiError::http(503, "down"))));
        let lines = frame(&mut app, 100, 10, Instant::now());
        assert!(texts(&lines)[2].contains("Failed to load taxonomy: HTTP 503: down"));
    }

    #[test]
    fn test_tree_rows_rendered() {
        let mut app = app();
        let root = TaxonNode::new("Root", None)
            .with_child(TaxonNode::new("Kingdom A", Some("kingdom")).with_child(TaxonNode::new("G", None)));
        app.handle_message(Message::TaxonomyLoaded(Ok(vec![root])));

        let lines = texts(&frame(&mut app, 120, 12, Instant::now()));
        assert!(lines[1].starts_with("Taxonomy (0 checked)"));
        assert!(lines[3].starts_with("▼ [ ] Root"));
        assert!(lines[4].starts_with("  ► [ ] Kingdom A (kingdom)"));
    }

    #[test]
    fn test_sent_body_shown_between_sql_and_results() {
        let mut app = app();
        app.handle_message(Message::QueryBuilt {
            sent: "{\n  \"taxonomy\": [\"Quercus\"]\n}".to_string(),
            result: Err(ApiError::http(500, "boom")),
        });

        let lines = texts(&frame(&mut app, 200, 60, Instant::now()));
        let find = |needle: &str| lines.iter().position(|l| l.contains(needle));
        let sql = find("Error: HTTP 500: boom").unwrap();
        let sent = find("\"taxonomy\": [\"Quercus\"]").unwrap();
        let results = find("│Results").unwrap();
        assert!(sql < sent && sent < results);
    }
}
