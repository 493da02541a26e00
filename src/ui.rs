use chrono::{DateTime, Local};
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::fmt::Write as _;
use std::io;

use crate::app::{App, Mode};
use crate::form::{FormField, TaskForm};
use crate::task::{Priority, Status, Task};

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = app.config.tick_rate();
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll so the clock keeps moving without input.
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_lanes(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    match &app.mode {
        Mode::Normal => {}
        Mode::Form(form) => draw_form(f, form),
        Mode::ConfirmDelete(id) => {
            let title = app
                .board
                .store()
                .get(*id)
                .map(|t| t.title.as_str())
                .unwrap_or_default();
            draw_confirm(f, " Delete ", &format!("Delete task {} \"{}\"?", id, title));
        }
        Mode::ConfirmDeleteAll => draw_confirm(
            f,
            " Delete all ",
            &format!("Delete all {} tasks?", app.board.store().total()),
        ),
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let now = Local::now();
    let line = Line::from(vec![
        Span::styled(" PLanner ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " {}  {} ",
            now.format("%a %d %b %Y"),
            format_time(&now, &app.config.clock_format)
        )),
        Span::styled(
            " a:add  e:edit  d:delete  D:delete all  s/1-3:status  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Formats with `format`, falling back to RFC 3339 if chrono rejects it.
fn format_time(time: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", time.format(format)).is_err() {
        return time.to_rfc3339();
    }
    out
}

fn lane_color(priority: Priority) -> Color {
    match priority {
        Priority::Highest => Color::Red,
        Priority::Medium => Color::Blue,
        Priority::Lowest => Color::Magenta,
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Pending => Style::default(),
        Status::InProgress => Style::default().fg(Color::LightBlue),
        Status::Completed => Style::default().fg(Color::Green),
    }
}

fn task_card<'a>(task: &'a Task, created_at_format: &str) -> ListItem<'a> {
    ListItem::new(vec![
        Line::from(vec![
            Span::raw(format!("[{}] ", task.id)),
            Span::styled(&task.title, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(&task.description, Style::default().fg(Color::Gray))),
        Line::from(vec![
            Span::styled(format!("[{}]", task.status), status_style(task.status)),
            Span::styled(
                format!(" {}", format_time(&task.created_at, created_at_format)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
    ])
}

fn draw_lanes(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, priority) in Priority::ALL.iter().enumerate() {
        let tasks = app.board.lane(*priority);
        let selected = app.board.selected_lane == i;
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ({}) ", priority.label(), tasks.len()),
                Style::default()
                    .fg(lane_color(*priority))
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });

        if tasks.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(format!("No tasks with {} priority", priority.label())),
                Line::from(Span::styled(
                    "Press 'a' to add a task",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(empty, chunks[i]);
            continue;
        }

        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| task_card(t, &app.config.created_at_format))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if selected {
            state.select(Some(app.board.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let store = app.board.store();
    let counts = store.status_counts();
    let totals = Line::from(vec![
        Span::raw(format!("Total: {}", store.total())),
        Span::raw(" | "),
        Span::styled(
            format!("Pending: {}", counts.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("InProgress: {}", counts.in_progress),
            Style::default().fg(Color::LightBlue),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Completed: {}", counts.completed),
            Style::default().fg(Color::Green),
        ),
    ]);
    let notice = Line::from(Span::styled(
        app.notice.clone().unwrap_or_default(),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(
        Paragraph::new(vec![totals, notice]).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_form(f: &mut Frame, form: &TaskForm) {
    let area = centered_rect(f.area(), 60, 12);
    f.render_widget(Clear, area);

    let field = |label: &'static str, value: String, focused: bool| {
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(label, label_style), Span::raw(value)];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    };

    let priority = match form.priority {
        Some(p) => format!("< {} >", p.label()),
        None => "< Select priority >".to_string(),
    };
    let mut lines = vec![
        Line::from(""),
        field("Title:       ", form.title.clone(), form.focus == FormField::Title),
        Line::from(""),
        field(
            "Description: ",
            form.description.clone(),
            form.focus == FormField::Description,
        ),
        Line::from(""),
        field("Priority:    ", priority, form.focus == FormField::Priority),
        Line::from(""),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab: next field  ←/→: priority  Enter: submit  Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(form.heading())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(popup, area);
}

fn draw_confirm(f: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(f.area(), 50, 7);
    f.render_widget(Clear, area);

    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "y: yes   n: no",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(popup, area);
}
