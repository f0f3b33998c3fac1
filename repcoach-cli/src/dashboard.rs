use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use repcoach::exercise::{ExerciseKind, ExercisePhase};
use repcoach::feedback::is_good_form;
use repcoach::session::{DisplayStats, SessionController};

const HELP: &str = "Tab/j/k: change exercise | 1: Push-ups | 2: Half-Squats | q: quit";

struct Dashboard {
    session: Arc<SessionController>,
    selected: usize,
    status_message: String,
}

impl Dashboard {
    fn new(session: Arc<SessionController>) -> Self {
        let active = session.active_exercise();
        let selected = ExerciseKind::ALL
            .iter()
            .position(|kind| *kind == active)
            .unwrap_or(0);
        Self {
            session,
            selected,
            status_message: HELP.to_string(),
        }
    }

    fn select(&mut self, index: usize) {
        self.selected = index % ExerciseKind::ALL.len();
        let kind = ExerciseKind::ALL[self.selected];
        self.status_message = if self.session.select_exercise(kind) {
            format!("Switched to {}, counters reset", kind)
        } else {
            format!("{} already selected", kind)
        };
    }

    fn next(&mut self) {
        self.select(self.selected + 1);
    }

    fn previous(&mut self) {
        self.select(self.selected + ExerciseKind::ALL.len() - 1);
    }
}

fn feedback_style(feedback: &str) -> Style {
    let color = if is_good_form(feedback) {
        Color::Green
    } else {
        Color::Red
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn phase_label(phase: ExercisePhase) -> &'static str {
    match phase {
        ExercisePhase::Up => "up",
        ExercisePhase::Down => "down",
    }
}

/// Redraws every `poll_interval` with a fresh stats read; key presses wake it early.
pub fn run_dashboard(
    mut terminal: DefaultTerminal,
    session: Arc<SessionController>,
    poll_interval: Duration,
    source: &str,
) -> Result<()> {
    let mut dashboard = Dashboard::new(session);

    loop {
        let stats: DisplayStats = dashboard.session.read_stats();

        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

            // Header
            let header = Paragraph::new(format!("RepCoach - {}", source))
                .style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let body = Layout::horizontal([Constraint::Length(28), Constraint::Min(1)])
                .split(chunks[1]);

            let items: Vec<ListItem> = ExerciseKind::ALL
                .iter()
                .enumerate()
                .map(|(idx, kind)| {
                    let style = if idx == dashboard.selected {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(kind.display_name()).style(style)
                })
                .collect();
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Exercise Selection"),
            );
            let mut list_state = ListState::default();
            list_state.select(Some(dashboard.selected));
            frame.render_stateful_widget(list, body[0], &mut list_state);

            let live = Paragraph::new(vec![
                Line::from(vec![
                    Span::raw("REPS      "),
                    Span::styled(
                        stats.reps.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(format!("PHASE     {}", phase_label(stats.phase))),
                Line::from(""),
                Line::from(vec![
                    Span::raw("FEEDBACK  "),
                    Span::styled(stats.feedback.clone(), feedback_style(&stats.feedback)),
                ]),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Live Stats - {}", stats.exercise)),
            );
            frame.render_widget(live, body[1]);

            // Footer with status
            let footer = Paragraph::new(dashboard.status_message.as_str())
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(footer, chunks[2]);
        })?;

        if !event::poll(poll_interval)? {
            continue;
        }
        if let event::Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(());
                }
                KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => {
                    dashboard.next();
                }
                KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => {
                    dashboard.previous();
                }
                KeyCode::Char('1') => dashboard.select(0),
                KeyCode::Char('2') => dashboard.select(1),
                _ => {}
            }
        }
    }
}
