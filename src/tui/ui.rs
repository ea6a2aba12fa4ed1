use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, InputKind, View};
use crate::db::DAY_BOUNDARY_HOUR;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Creator list
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match app.view {
        View::Checklist => render_checklist(frame, app, chunks[1]),
        View::Archived => render_archived(frame, app, chunks[1]),
    }
    render_status_line(frame, app, chunks[2]);

    if app.status_prompt.is_some() {
        render_status_prompt(frame, app);
    }

    if app.text_input.is_some() {
        render_text_input(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Creators {} ", app.app_day.format("%m/%d (%a)"));

    let p = app.progress;
    let stats = if p.total > 0 {
        format!(
            " {}/{} read | {}/{} commented",
            p.read, p.total, p.commented, p.total
        )
    } else {
        " No creators yet, press 'a' to add one".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_checklist(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let name_style = if row.status.is_done() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![Span::styled(row.creator.name.as_str(), name_style)];
            if row.creator.has_new {
                spans.push(Span::styled(" NEW", Style::default().fg(Color::Red)));
            }
            spans.push(Span::raw("  "));

            if row.status.read {
                spans.push(Span::styled("[read] ", Style::default().fg(Color::Green)));
            }
            if row.status.commented {
                spans.push(Span::styled("[commented] ", Style::default().fg(Color::Magenta)));
            }
            if !row.status.is_done() {
                spans.push(Span::styled("[unread]", Style::default().fg(Color::Yellow)));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    render_list(frame, app, area, items, " Today ");
}

fn render_archived(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .archived
        .iter()
        .map(|creator| {
            ListItem::new(Line::from(vec![
                Span::styled(creator.name.as_str(), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  @{}", creator.username),
                    Style::default().fg(Color::Blue),
                ),
            ]))
        })
        .collect();

    render_list(frame, app, area, items, " Archived ");
}

fn render_list(frame: &mut Frame, app: &App, area: Rect, items: Vec<ListItem>, title: &str) {
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(message) = &app.message {
        message.clone()
    } else if app.pending_lookups > 0 {
        "Updating profiles...".to_string()
    } else {
        match app.view {
            View::Checklist => format!(
                "j/k:nav  enter:open  s:status  a:add  ?:help  q:quit  (resets {:02}:00)",
                DAY_BOUNDARY_HOUR
            ),
            View::Archived => "j/k:nav  enter:restore  v:back  q:quit".to_string(),
        }
    };

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_status_prompt(frame: &mut Frame, app: &App) {
    let Some(prompt) = &app.status_prompt else {
        return;
    };
    let area = centered_rect(50, 30, frame.area());

    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    let text = vec![
        Line::from(""),
        Line::from(format!("  {} (r) Read", check(prompt.draft.read))),
        Line::from(format!("  {} (c) Commented", check(prompt.draft.commented))),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter: save   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", prompt.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_text_input(frame: &mut Frame, app: &App) {
    let Some(input) = &app.text_input else {
        return;
    };
    let area = centered_rect(60, 20, frame.area());

    let title = match input.kind {
        InputKind::AddCreator => " Add creator - note.com URL, then optional name ",
        InputKind::Rename(_) => " Rename creator ",
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);

    // Clear the area first
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let input_text = format!("> {}_", input.buffer);
    let paragraph = Paragraph::new(input_text).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   J / K    Move creator down / up",
        "",
        " Checklist:",
        "   Enter    Open creator in browser",
        "   s        Set read / commented",
        "   a        Add creator",
        "   e        Rename creator",
        "   x        Archive creator",
        "   v        Show archived",
        "   r        Refresh profiles",
        "   R        Clear today's checklist",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
