use super::app::App;
use super::config::AppConfig;
use super::models::{NO_CONNECTION, Screen, SettingsField};
use super::terminal::RawTerminal;
use crate::usgs::{self, FeedEvent, LoadRequest};
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tokio::sync::mpsc;

// Magnitude bands and their colors, roughly the USGS shaded scale.
const COLOR_MAJOR: Color = Color::Rgb(214, 41, 27);
const BOUND_MAJOR: f64 = 7.0;
const COLOR_STRONG: Color = Color::Rgb(229, 108, 32);
const BOUND_STRONG: f64 = 6.0;
const COLOR_MODERATE: Color = Color::Rgb(237, 160, 52);
const BOUND_MODERATE: f64 = 5.0;
const COLOR_LIGHT: Color = Color::Rgb(240, 202, 69);
const BOUND_LIGHT: f64 = 4.0;
const COLOR_MINOR: Color = Color::Rgb(255, 255, 255);

pub async fn run(terminal: &mut RawTerminal, config: AppConfig) -> Result<()> {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<LoadRequest>();
    let (feed_tx, mut feed_rx) = mpsc::unbounded_channel::<FeedEvent>();

    let mut app = App::new(config, request_tx);
    app.request_load(false);

    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        tokio::select! {
            Some(request) = request_rx.recv() => {
                let feed_tx = feed_tx.clone();
                tokio::spawn(async move {
                    let event = match usgs::fetch_quakes(&request.url).await {
                        Ok(quakes) => FeedEvent::Loaded {
                            seq: request.seq,
                            quakes,
                        },
                        Err(_) => FeedEvent::Failed { seq: request.seq },
                    };
                    let _ = feed_tx.send(event);
                });
            }
            Some(event) = feed_rx.recv() => {
                app.observe(event);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(&mut app, key) {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match app.screen {
        Screen::Quakes => handle_quakes_key(app, key),
        Screen::Settings => {
            handle_settings_key(app, key);
            false
        }
    }
}

fn handle_quakes_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            return true;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.previous();
        }
        KeyCode::Char('g') => {
            app.jump_to_top();
        }
        KeyCode::Char('G') => {
            app.jump_to_bottom();
        }
        KeyCode::PageUp => {
            app.page_up();
        }
        KeyCode::PageDown => {
            app.page_down();
        }
        KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_up();
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page_down();
        }
        KeyCode::Char('r') => {
            app.request_load(true);
        }
        KeyCode::Char('s') => {
            app.open_settings();
        }
        _ => {}
    }
    false
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.cancel_settings();
        }
        KeyCode::Enter => {
            app.apply_settings();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.settings_next_field();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.settings_previous_field();
        }
        KeyCode::Left => {
            app.settings_cycle(false);
        }
        KeyCode::Right | KeyCode::Char(' ') => {
            app.settings_cycle(true);
        }
        KeyCode::Backspace => {
            app.settings_backspace();
        }
        KeyCode::Char(c) => {
            app.settings_input(c);
        }
        _ => {}
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Quakes => quakes_screen(f, app),
        Screen::Settings => settings_screen(f, app),
    }
}

fn quakes_screen(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new(format!(
        "Quakewatch - min magnitude {} | {} | up to {} results",
        app.config.min_magnitude, app.config.order_by, app.config.entry_count
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let header = Row::new(vec![
        Cell::from("Mag").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from("Time").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from("Location").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ])
    .height(1);

    let rows: Vec<Row> = app
        .view
        .quakes
        .iter()
        .map(|quake| {
            Row::new(vec![
                Cell::from(quake.magnitude_label()).style(magnitude_style(quake.magnitude)),
                Cell::from(quake.time_label()),
                Cell::from(quake.place.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(20),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::styled(
                    " Earthquakes ",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{} ", app.view.quakes.len()),
                    Style::default().fg(Color::Cyan),
                ),
            ])),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(0x18, 0x18, 0x18))
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(table, chunks[1], &mut app.table_state);

    let (status_text, status_style) = status_line(app);
    let status = Paragraph::new(status_text)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(status, chunks[2]);

    let help = help_line(&[
        ("↑/k", "Up"),
        ("↓/j", "Down"),
        ("g/G", "Top/Bottom"),
        ("PgUp/PgDn", "Page"),
        ("r", "Refresh"),
        ("s", "Settings"),
        ("q/Esc", "Quit"),
    ]);
    f.render_widget(help, chunks[3]);
}

fn status_line(app: &App) -> (String, Style) {
    if let Some(message) = app.view.message {
        let style = if message == NO_CONNECTION {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        return (message.to_string(), style);
    }

    if app.view.refreshing {
        return ("Refreshing…".to_string(), Style::default().fg(Color::Yellow));
    }

    let text = match app.selected_url() {
        Some(url) => format!("{} earthquakes loaded | {}", app.view.quakes.len(), url),
        None => format!("{} earthquakes loaded", app.view.quakes.len()),
    };
    (text, Style::default().fg(Color::Green))
}

fn settings_screen(f: &mut Frame, app: &App) {
    let Some(draft) = &app.draft else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Percentage(30),
        ])
        .split(f.area());

    let title = Paragraph::new("Settings")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[1]);

    let field_line = |field: SettingsField, value: String| -> Line<'static> {
        let selected = draft.field == field;
        let marker = if selected { "> " } else { "  " };
        let label_style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let value = if selected && field != SettingsField::OrderBy {
            format!("{value}_")
        } else {
            value
        };
        Line::from(vec![
            Span::styled(format!("{marker}{field}: "), label_style),
            Span::raw(value),
        ])
    };

    let fields = Paragraph::new(vec![
        Line::from(""),
        field_line(SettingsField::MinMagnitude, draft.min_magnitude.clone()),
        Line::from(""),
        field_line(
            SettingsField::OrderBy,
            format!("{} ({})", draft.order_by, draft.order_by.as_str()),
        ),
        Line::from(""),
        field_line(SettingsField::EntryCount, draft.entry_count.clone()),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(fields, chunks[2]);

    let help = help_line(&[
        ("↑/↓/Tab", "Field"),
        ("←/→/Space", "Ordering"),
        ("Enter", "Apply & reload"),
        ("Esc", "Discard"),
    ]);
    f.render_widget(help, chunks[3]);
}

fn help_line(items: &[(&str, &str)]) -> Paragraph<'static> {
    let mut spans: Vec<Span> = vec![];
    for (i, (key, desc)) in items.iter().enumerate() {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        if i == items.len() - 1 {
            spans.push(Span::raw(format!(" {desc}")));
        } else {
            spans.push(Span::raw(format!(" {desc}  ")));
        }
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Controls ")
            .style(Style::default().fg(Color::Gray)),
    )
}

fn magnitude_style(magnitude: Option<f64>) -> Style {
    let Some(magnitude) = magnitude else {
        return Style::default().fg(Color::DarkGray);
    };

    if magnitude >= BOUND_MAJOR {
        Style::default()
            .fg(COLOR_MAJOR)
            .add_modifier(Modifier::BOLD)
    } else if magnitude >= BOUND_STRONG {
        Style::default()
            .fg(COLOR_STRONG)
            .add_modifier(Modifier::BOLD)
    } else if magnitude >= BOUND_MODERATE {
        Style::default().fg(COLOR_MODERATE)
    } else if magnitude >= BOUND_LIGHT {
        Style::default().fg(COLOR_LIGHT)
    } else {
        Style::default().fg(COLOR_MINOR)
    }
}
