use crate::app::{ActiveInput, App, InputMode};
use chrono::Utc;
use crossterm::event::{self, Event as CEvent};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn get_legend(input_mode: &InputMode) -> Text<'static> {
    match input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            Span::styled(" q ", Style::default().fg(Color::Red)),
            Span::raw(": Quit "),
            Span::styled(" j/k ", Style::default().fg(Color::Red)),
            Span::raw(": Move "),
            Span::styled(" Space ", Style::default().fg(Color::Red)),
            Span::raw(": Toggle "),
            Span::styled(" a ", Style::default().fg(Color::Red)),
            Span::raw(": Add "),
            Span::styled(" e ", Style::default().fg(Color::Red)),
            Span::raw(": Edit "),
            Span::styled(" d ", Style::default().fg(Color::Red)),
            Span::raw(": Delete "),
            Span::styled(" Enter ", Style::default().fg(Color::Red)),
            Span::raw(": Details "),
            Span::styled(" r ", Style::default().fg(Color::Red)),
            Span::raw(": Refresh "),
        ])),
        InputMode::Adding => Text::from(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Red)),
            Span::raw(": Submit "),
            Span::styled(" Esc ", Style::default().fg(Color::Red)),
            Span::raw(": Cancel "),
        ])),
        InputMode::Editing => Text::from(Line::from(vec![
            Span::styled(" Tab ", Style::default().fg(Color::Red)),
            Span::raw(": Switch Field "),
            Span::styled(" Enter ", Style::default().fg(Color::Red)),
            Span::raw(": Save "),
            Span::styled(" Esc ", Style::default().fg(Color::Red)),
            Span::raw(": Cancel "),
        ])),
        InputMode::ConfirmingDelete => Text::from(Line::from(vec![
            Span::styled(" y ", Style::default().fg(Color::Red)),
            Span::raw(": Delete "),
            Span::styled(" n ", Style::default().fg(Color::Red)),
            Span::raw(": Keep "),
        ])),
    }
}

pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let size = f.area();

    // Split the main layout into body, status line and footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    let body_chunk = chunks[0];
    let status_chunk = chunks[1];
    let footer_chunk = chunks[2];

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(body_chunk);

    // Left panel: todo list
    let now = Utc::now();
    let todos_widget = if !app.todos.is_empty() {
        let items: Vec<ListItem> = app
            .todos
            .iter()
            .map(|todo| {
                let checkbox = if todo.completed { "[x] " } else { "[ ] " };
                let mut title_style = Style::default();
                if todo.completed {
                    title_style = title_style
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT);
                } else if todo.is_overdue(now) {
                    title_style = title_style.fg(Color::Red);
                }

                let mut spans = vec![
                    Span::raw(checkbox),
                    Span::styled(todo.title.clone(), title_style),
                ];
                if let Some(due) = todo.due_date {
                    spans.push(Span::styled(
                        format!("  (due {})", due.format("%Y-%m-%d")),
                        Style::default().fg(if todo.is_overdue(now) {
                            Color::Red
                        } else {
                            Color::Yellow
                        }),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Todos"))
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ")
    } else {
        List::new(vec![ListItem::new("No todos yet. Press 'a' to add one.")])
            .block(Block::default().borders(Borders::ALL).title("Todos"))
    };

    f.render_stateful_widget(todos_widget, body[0], &mut app.state);

    // Right panel: todo details
    let detail_block = Block::default().borders(Borders::ALL).title("Details");

    if let Some(ref detail) = app.detail {
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(vec![
            Span::styled("Title: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(detail.title.clone()),
        ]));

        let status = if detail.completed { "Done" } else { "Open" };
        lines.push(Line::from(vec![
            Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(status),
        ]));

        let due_date = match detail.due_date {
            Some(due) => due.format("%Y-%m-%d").to_string(),
            None => "No due date".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled("Due Date: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(due_date),
        ]));

        lines.push(Line::from(vec![
            Span::styled("Created: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(detail.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]));

        lines.push(Line::from(vec![
            Span::styled("Updated: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(detail.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(detail_block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, body[1]);
    } else {
        let paragraph = Paragraph::new("Press Enter to view details")
            .block(detail_block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, body[1]);
    }

    // Status line: loading beats error beats counts
    let status_line = if app.loading {
        Paragraph::new("Loading...").style(Style::default().fg(Color::Yellow))
    } else if let Some(ref error) = app.error {
        Paragraph::new(error.clone()).style(Style::default().fg(Color::Red))
    } else {
        let open = app.todos.iter().filter(|todo| !todo.completed).count();
        Paragraph::new(format!(" {open} open / {} total", app.todos.len()))
            .style(Style::default().fg(Color::DarkGray))
    };
    f.render_widget(status_line, status_chunk);

    // Popups by input mode
    match app.input_mode {
        InputMode::Normal => {}
        InputMode::Adding => {
            let popup_area = centered_rect_absolute(size.width.saturating_sub(20).max(30), 3, body_chunk);
            let popup_block = Block::default()
                .title("New Todo (a 'due:YYYY-MM-DD' token sets a due date)")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Green));

            let input = Paragraph::new(app.draft_title.as_str())
                .style(Style::default().fg(Color::White))
                .block(popup_block)
                .wrap(Wrap { trim: false });

            f.render_widget(Clear, popup_area);
            f.render_widget(input, popup_area);
        }
        InputMode::Editing => {
            let popup_area = centered_rect_absolute(size.width.saturating_sub(20).max(30), 4, body_chunk);
            let popup_block = Block::default()
                .title("Edit Todo")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Green));

            let active = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
            let inactive = Style::default().fg(Color::DarkGray);

            let lines = vec![
                Line::from(vec![
                    Span::styled(
                        "Title: ",
                        if app.active_input == ActiveInput::Title {
                            active
                        } else {
                            inactive
                        },
                    ),
                    Span::raw(app.draft_title.clone()),
                ]),
                Line::from(vec![
                    Span::styled(
                        "Due:   ",
                        if app.active_input == ActiveInput::DueDate {
                            active
                        } else {
                            inactive
                        },
                    ),
                    Span::raw(app.draft_due_date.clone()),
                ]),
            ];

            let input = Paragraph::new(lines)
                .block(popup_block)
                .wrap(Wrap { trim: false });

            f.render_widget(Clear, popup_area);
            f.render_widget(input, popup_area);
        }
        InputMode::ConfirmingDelete => {
            let popup_area = centered_rect_absolute(40, 3, body_chunk);
            let popup_block = Block::default()
                .title("Confirm")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red));

            let prompt = Paragraph::new("Delete the selected todo? (y/n)")
                .style(Style::default().fg(Color::White))
                .block(popup_block);

            f.render_widget(Clear, popup_area);
            f.render_widget(prompt, popup_area);
        }
    }

    // Render the legend in the footer
    let legend = Paragraph::new(get_legend(&app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(legend, footer_chunk);
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    base_url: &str,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                let should_quit = app.handle_input(key, base_url).await;
                if should_quit {
                    return Ok(());
                }
            }
        }
    }
}
