//! UI rendering

use crate::app::{App, Mode};
use aboutline_core::config::OutlineSide;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Rows taken by the status bar and the pane borders
pub const CHROME_HEIGHT: u16 = 3;

/// Draw the UI
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Outline + document
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let doc_area = if app.show_outline {
        let outline_width = app.config.outline.width;
        let (constraints, outline_idx, doc_idx) = match app.config.outline.side {
            OutlineSide::Left => ([Constraint::Length(outline_width), Constraint::Min(1)], 0, 1),
            OutlineSide::Right => ([Constraint::Min(1), Constraint::Length(outline_width)], 1, 0),
        };
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(chunks[0]);

        render_outline(frame, app, main_chunks[outline_idx]);
        main_chunks[doc_idx]
    } else {
        chunks[0]
    };

    render_document(frame, app, doc_area);
    render_status_bar(frame, app, chunks[1]);
}

fn render_document(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.outline_focus {
        Style::default().fg(app.theme.outline_border)
    } else {
        Style::default().fg(app.theme.outline_active.bg.unwrap_or(Color::LightCyan))
    };

    let (Some(doc), Some(view)) = (app.active_document(), app.active_view_state()) else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No document open",
            app.theme.outline_empty,
        )))
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(empty, area);
        return;
    };

    let height = area.height.saturating_sub(2) as usize;
    let line_count = doc.line_count();
    let number_width = line_count.to_string().len();
    let heading_lines: Vec<usize> = app
        .outline_items
        .iter()
        .map(|item| item.command.argument.start.line)
        .collect();

    let lines: Vec<Line> = (view.scroll_line..line_count.min(view.scroll_line + height))
        .map(|idx| {
            let number = Span::styled(
                format!("{:>width$} ", idx + 1, width = number_width),
                app.theme.line_number,
            );

            let mut style = if heading_lines.binary_search(&idx).is_ok() {
                app.theme.heading_line
            } else {
                app.theme.base
            };
            if view.selection.is_some_and(|sel| sel.contains_line(idx)) {
                style = style.patch(app.theme.selection);
            } else if idx == view.cursor_line {
                style = style.bg(app.theme.cursor_line_bg);
            }

            Line::from(vec![number, Span::styled(doc.line_text(idx), style)])
        })
        .collect();

    let title = if doc.dirty_on_disk {
        format!("{} [changed on disk]", doc.display_name())
    } else {
        doc.display_name()
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .style(app.theme.base);

    frame.render_widget(paragraph, area);
}

fn render_outline(frame: &mut Frame, app: &App, area: Rect) {
    let current_heading = app.current_heading_index();
    let inner_width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;

    // Keep the selected item on screen
    let offset = if app.outline_focus && height > 0 && app.outline_selected >= height {
        app.outline_selected + 1 - height
    } else {
        0
    };

    let outline_lines: Vec<Line> = if app.outline_items.is_empty() {
        vec![Line::from(Span::styled("(no headings)", app.theme.outline_empty))]
    } else {
        app.outline_items
            .iter()
            .enumerate()
            .skip(offset)
            .take(height.max(1))
            .map(|(idx, item)| {
                let text = truncate_to_width(&item.label, inner_width);
                if app.outline_focus && idx == app.outline_selected {
                    Line::from(text).style(app.theme.outline_active)
                } else if !app.outline_focus && Some(idx) == current_heading {
                    Line::from(text).style(app.theme.outline_current)
                } else {
                    Line::from(text).style(app.theme.base)
                }
            })
            .collect()
    };

    let title = if app.outline_focus {
        "Outline [focused]"
    } else {
        "Outline"
    };

    let border_style = if app.outline_focus {
        Style::default().fg(app.theme.outline_active.bg.unwrap_or(Color::LightCyan))
    } else {
        Style::default().fg(app.theme.outline_border)
    };

    let widget = Paragraph::new(outline_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .style(app.theme.base);

    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let style = Style::default()
        .fg(app.theme.status_bar_fg)
        .bg(app.theme.status_bar_bg)
        .add_modifier(Modifier::BOLD);

    if let Mode::InsertHeading(label) = &app.mode {
        let prompt = Paragraph::new(Line::from(vec![
            Span::styled(format!(" heading: {}{}", app.config.outline.marker, label), app.theme.prompt),
            Span::styled("_", app.theme.prompt.add_modifier(Modifier::SLOW_BLINK)),
        ]));
        frame.render_widget(prompt, area);
        return;
    }

    let status_text = if let Some(message) = &app.status_message {
        format!(" {}", message)
    } else {
        status_line(app)
    };

    let status = Paragraph::new(Line::from(vec![Span::styled(status_text, style)]));
    frame.render_widget(status, area);
}

/// Text shown in the status bar when there is no message
pub fn status_line(app: &App) -> String {
    let Some(doc) = app.active_document() else {
        return format!(" aboutline  no document  {} open", app.docs.len());
    };

    let line = app.active_view_state().map_or(1, |v| v.cursor_line + 1);
    let position = app.active_index().map_or(0, |i| i + 1);

    #[cfg(feature = "watch")]
    let watch_str = if app.watcher.as_ref().is_some_and(|w| w.has_pending()) {
        "  [CHANGING]"
    } else if doc.dirty_on_disk {
        "  [DIRTY]"
    } else if app.watcher.is_some() {
        "  [WATCH]"
    } else {
        ""
    };
    #[cfg(not(feature = "watch"))]
    let watch_str = "";

    format!(
        " aboutline  {}:{}/{}  {} headings  [{}/{}]{}",
        doc.display_name(),
        line,
        doc.line_count(),
        app.outline_items.len(),
        position,
        app.docs.len(),
        watch_str
    )
}

/// Cut `text` to at most `width` terminal columns, marking the cut with `…`
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
