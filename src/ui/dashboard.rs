use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::ApiError;
use crate::models::{wire::display_date, DashboardSummary, Project};
use crate::ui::{money, render_error_line, render_help};

pub enum DashboardAction {
    Refresh,
}

/// Summary cards and the next upcoming project. Two requests feed it, each
/// tagged with the generation that issued it.
#[derive(Default)]
pub struct DashboardState {
    pub summary: Option<DashboardSummary>,
    pub upcoming: Option<Project>,
    pub error: Option<String>,
    pending: usize,
    generation: u64,
}

impl DashboardState {
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.pending = 2;
        self.error = None;
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn detach(&mut self) {
        self.generation += 1;
        self.pending = 0;
    }

    fn settle<T>(&mut self, generation: u64, result: Result<T, ApiError>) -> Option<T> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "discarding stale dashboard result");
            return None;
        }
        self.pending = self.pending.saturating_sub(1);
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "dashboard request failed");
                self.error = Some(format!("Could not load dashboard: {err}"));
                None
            }
        }
    }

    pub fn apply_summary(&mut self, generation: u64, result: Result<DashboardSummary, ApiError>) {
        if let Some(summary) = self.settle(generation, result) {
            self.summary = Some(summary);
        }
    }

    pub fn apply_upcoming(&mut self, generation: u64, result: Result<Option<Project>, ApiError>) {
        if let Some(upcoming) = self.settle(generation, result) {
            self.upcoming = upcoming;
        }
    }
}

pub fn handle_key(_state: &mut DashboardState, key: KeyCode) -> Option<DashboardAction> {
    match key {
        KeyCode::Char('r') => Some(DashboardAction::Refresh),
        _ => None,
    }
}

fn stat_card(title: &str, value: String, color: Color) -> Paragraph<'static> {
    Paragraph::new(vec![
        Spans::from(""),
        Spans::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(tui::layout::Alignment::Center)
    .block(Block::default().title(title.to_string()).borders(Borders::ALL))
}

pub fn render_dashboard<B: Backend>(f: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Min(5),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area);

    render_error_line(f, chunks[0], state.error.clone());

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ]
            .as_ref(),
        )
        .split(chunks[1]);

    let shown = |value: Option<f64>| match (value, state.is_loading()) {
        (Some(v), _) => money(v),
        (None, true) => "Loading...".to_string(),
        (None, false) => "N/A".to_string(),
    };
    let summary = state.summary;
    f.render_widget(
        stat_card("Total Income", shown(summary.map(|s| s.total_income)), Color::Green),
        cards[0],
    );
    f.render_widget(
        stat_card("Total Expense", shown(summary.map(|s| s.total_expense)), Color::Red),
        cards[1],
    );
    let net = match summary {
        Some(s) => format!("{} ({:.1}%)", money(s.net_profit), s.margin_percent()),
        None => shown(None),
    };
    f.render_widget(stat_card("Net Profit", net, Color::Cyan), cards[2]);

    let upcoming = match &state.upcoming {
        Some(p) => vec![
            Spans::from(vec![
                Span::styled("Project: ", Style::default().fg(Color::Yellow)),
                Span::raw(p.name.clone()),
            ]),
            Spans::from(vec![
                Span::styled("Client: ", Style::default().fg(Color::Yellow)),
                Span::raw(p.client_name.clone()),
            ]),
            Spans::from(vec![
                Span::styled("Starts: ", Style::default().fg(Color::Yellow)),
                Span::raw(display_date(p.start_date)),
            ]),
            Spans::from(vec![
                Span::styled("Status: ", Style::default().fg(Color::Yellow)),
                Span::raw(p.status.as_str()),
            ]),
        ],
        None if state.is_loading() => vec![Spans::from("Loading...")],
        None => vec![Spans::from("No upcoming projects")],
    };
    let panel = Paragraph::new(upcoming)
        .block(Block::default().title("Upcoming Project").borders(Borders::ALL));
    f.render_widget(panel, chunks[2]);

    render_help(f, chunks[3], "r - Refresh | 1-4/Tab - Switch screen | q - Quit");
}
