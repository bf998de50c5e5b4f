use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::tui::app::{tab_title, TuiApp, TABS};
use crate::view::star::{PENDING, SOLID};
use crate::view::{Document, FormField, NodeId, ViewSync};

pub fn render(frame: &mut Frame, app: &mut TuiApp, sync: &ViewSync) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Tabs
            Constraint::Percentage(60), // Story list
            Constraint::Min(6),         // Detail pane
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, sync, chunks[0]);
    render_list(frame, app, sync, chunks[1]);
    render_detail(frame, app, sync, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if let Some(focused) = app.form {
        render_form(frame, sync.document(), focused);
    }
}

fn render_tabs(frame: &mut Frame, app: &TuiApp, sync: &ViewSync, area: Rect) {
    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(tab_title(*t))).collect();
    let selected = TABS.iter().position(|t| *t == app.tab).unwrap_or(0);

    let account = match sync.user() {
        Some(user) => format!(" storyline: {} ", user.username),
        None => " storyline: not logged in ".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().title(account).borders(Borders::ALL))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_list(frame: &mut Frame, app: &mut TuiApp, sync: &ViewSync, area: Rect) {
    let doc = sync.document();
    let entries = doc.entries(app.tab);
    let items: Vec<ListItem> = entries.iter().map(|node| entry_item(doc, *node)).collect();

    let title = format!(
        " {} [{}/{}] ",
        tab_title(app.tab),
        (app.cursor() + 1).min(entries.len()),
        entries.len()
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// One list row: star, title, host. Message entries show their text.
fn entry_item(doc: &Document, node: NodeId) -> ListItem<'static> {
    let Some(n) = doc.get(node) else {
        return ListItem::new("");
    };
    if n.tag != "li" {
        let text = n.text.clone().unwrap_or_default();
        return ListItem::new(Span::styled(
            text,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }

    let mut spans = Vec::new();
    if let Some(star) = doc.find_class(node, "fa-star") {
        let glyph = if doc.has_class(star, SOLID) { "★ " } else { "☆ " };
        let style = if doc.has_class(star, PENDING) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        spans.push(Span::styled(glyph, style));
    }
    if doc.find_class(node, "trash-can").is_some() {
        spans.push(Span::styled("✗ ", Style::default().fg(Color::Red)));
    }
    spans.push(Span::raw(class_text(doc, node, "story-link")));
    spans.push(Span::styled(
        format!(" {}", class_text(doc, node, "story-hostname")),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(Line::from(spans))
}

fn class_text(doc: &Document, node: NodeId, class: &str) -> String {
    doc.find_class(node, class)
        .and_then(|n| doc.get(n))
        .and_then(|n| n.text.clone())
        .unwrap_or_default()
}

fn render_detail(frame: &mut Frame, app: &TuiApp, sync: &ViewSync, area: Rect) {
    let story = sync
        .document()
        .entries(app.tab)
        .get(app.cursor())
        .and_then(|node| sync.story_for(*node));

    let (title, content) = match story {
        Some(story) => {
            let favorite = sync.user().is_some_and(|u| u.is_favorite(&story.story_id));
            let mut lines = vec![
                Line::from(Span::styled(
                    story.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("By: {}", story.author),
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(format!("Posted by: {}", story.username)),
                Line::from(format!(
                    "Date: {}",
                    story.created_at.format("%Y-%m-%d %H:%M")
                )),
                Line::from(Span::styled(
                    format!("Link: {}", story.url),
                    Style::default().fg(Color::Blue),
                )),
            ];
            if favorite {
                lines.push(Line::from(Span::styled(
                    "★ In your favorites",
                    Style::default().fg(Color::Yellow),
                )));
            }
            (format!(" {} ", story.host_name()), Text::from(lines))
        }
        None => (" Story ".to_string(), Text::from("No story selected")),
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let status = if let Some(ref pending) = app.pending_delete {
        format!("Delete \"{}\"? (y/n)", pending.title)
    } else if app.is_refreshing {
        "Refreshing stories...".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.form.is_some() {
        "Tab:Next field  Enter:Next/Submit  Esc:Cancel".to_string()
    } else {
        "j/k:Nav  Tab:Switch list  s:Favorite  d:Delete  n:New  o:Open  R:Refresh  q:Quit"
            .to_string()
    };

    let status = if app.in_flight > 0 {
        format!("{}  [saving {}]", status, app.in_flight)
    } else {
        status
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame, doc: &Document, focused: FormField) {
    let area = centered_rect(60, 9, frame.area());

    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let marker = if *field == focused { "> " } else { "  " };
            let style = if *field == focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{}{:<7}", marker, field.label()), style),
                Span::raw(doc.value(*field).to_string()),
            ])
        })
        .collect();

    let form = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title(" Submit a story ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(form, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 9, area);
        assert_eq!(rect, Rect::new(20, 15, 60, 9));

        let tiny = centered_rect(60, 9, Rect::new(0, 0, 10, 4));
        assert_eq!(tiny.height, 4);
        assert_eq!(tiny.y, 0);
    }
}
