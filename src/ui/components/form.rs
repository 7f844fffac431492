use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::components::popup::centered_rect;

pub fn edit_text(value: &mut String, key: KeyCode) {
    match key {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

/// A pick-one field. `None` is the "Select ..." placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    options: Vec<(T, String)>,
    selected: Option<usize>,
    placeholder: &'static str,
}

impl<T: PartialEq> Choice<T> {
    pub fn new(placeholder: &'static str, options: Vec<(T, String)>) -> Self {
        Self {
            options,
            selected: None,
            placeholder,
        }
    }

    /// Preselects `value` if it is one of the options.
    pub fn with_value(mut self, value: &T) -> Self {
        self.selected = self.options.iter().position(|(v, _)| v == value);
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.selected.and_then(|i| self.options.get(i)).map(|(v, _)| v)
    }

    pub fn label(&self) -> &str {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|(_, label)| label.as_str())
            .unwrap_or(self.placeholder)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.options.len() => i + 1,
            _ => 0,
        });
    }

    pub fn previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i > 0 => i - 1,
            _ => self.options.len() - 1,
        });
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Right | KeyCode::Char(' ') => self.next(),
            KeyCode::Left => self.previous(),
            _ => {}
        }
    }
}

/// Chrome shared by every wizard.
pub struct FormView<'a> {
    pub title: &'a str,
    pub fields: Vec<(&'static str, String)>,
    pub current: usize,
    pub editing: bool,
    pub error: Option<&'a str>,
    pub saving: bool,
    pub help: &'a str,
}

pub fn render_form<B: Backend>(f: &mut Frame<B>, view: &FormView) {
    let area = centered_rect(70, 70, f.size());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let items: Vec<ListItem> = view
        .fields
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let focused = i == view.current;
            let label_style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_span = if focused && view.editing {
                Span::styled(format!("{value}|"), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(value.clone())
            };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{name}: "), label_style),
                value_span,
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title(view.title));
    f.render_widget(form, chunks[0]);

    let status = match (view.saving, view.error) {
        (true, _) => Paragraph::new("Saving...").style(Style::default().fg(Color::Cyan)),
        (false, Some(err)) => Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red)),
        (false, None) => Paragraph::new(""),
    };
    f.render_widget(status.block(Block::default().borders(Borders::ALL)), chunks[1]);

    let help = Paragraph::new(view.help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub const FORM_HELP: &str = "Enter - Edit field | Up/Down - Navigate | S - Save | Esc - Cancel";
pub const EDIT_HELP: &str = "Enter - Done | Left/Right - Change choice or day | Esc - Done";

#[cfg(test)]
mod tests {
    use super::*;

    fn projects() -> Choice<i64> {
        Choice::new(
            "Select Project",
            vec![(1, "Website".to_string()), (2, "Mobile".to_string())],
        )
    }

    #[test]
    fn choice_starts_on_placeholder() {
        let choice = projects();
        assert_eq!(choice.value(), None);
        assert_eq!(choice.label(), "Select Project");
    }

    #[test]
    fn choice_wraps_both_ways() {
        let mut choice = projects();
        choice.previous();
        assert_eq!(choice.value(), Some(&2));
        choice.next();
        assert_eq!(choice.value(), Some(&1));
        choice.handle_key(KeyCode::Right);
        assert_eq!(choice.label(), "Mobile");
    }

    #[test]
    fn with_value_ignores_unknown_values() {
        assert_eq!(projects().with_value(&2).value(), Some(&2));
        assert_eq!(projects().with_value(&9).value(), None);

        let mut empty: Choice<i64> = Choice::new("Select Project", Vec::new());
        empty.next();
        assert!(empty.is_empty());
        assert_eq!(empty.value(), None);
    }

    #[test]
    fn edit_text_appends_and_deletes() {
        let mut value = String::from("Ac");
        edit_text(&mut value, KeyCode::Char('m'));
        edit_text(&mut value, KeyCode::Char('e'));
        edit_text(&mut value, KeyCode::Backspace);
        assert_eq!(value, "Acm");
    }
}
