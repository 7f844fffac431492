use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::controller::ListController;
use crate::filter::{filter, Dimension, FieldFilter};
use crate::models::{wire::display_date, Project, ProjectDraft, ProjectStatus};
use crate::ui::project_wizard::{self, render_project_wizard, ProjectWizardAction, ProjectWizardState};
use crate::ui::{
    body_for, list_layout, load_error, money, render_error_line, render_help, render_placeholder,
    Body, RowCursor,
};

pub enum ProjectAction {
    Refresh,
    Save { id: Option<i64>, draft: ProjectDraft },
}

fn status_of(project: &Project) -> Option<&ProjectStatus> {
    Some(&project.status)
}

pub struct ProjectsState {
    pub cursor: RowCursor,
    pub by_status: FieldFilter<Project, ProjectStatus>,
    pub wizard: Option<ProjectWizardState>,
}

impl ProjectsState {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::default(),
            by_status: FieldFilter::new("Status", status_of),
            wizard: None,
        }
    }

    pub fn visible<'a>(&self, items: &'a [Project]) -> Vec<&'a Project> {
        let dims: [&dyn Dimension<Project>; 1] = [&self.by_status];
        filter(items, &dims)
    }

    pub fn is_modal(&self) -> bool {
        self.wizard.is_some()
    }

    pub fn save_failed(&mut self, message: String) {
        if let Some(wizard) = &mut self.wizard {
            wizard.fail(message);
        }
    }
}

impl Default for ProjectsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key(
    state: &mut ProjectsState,
    ctl: &ListController<Project>,
    key: KeyCode,
) -> Option<ProjectAction> {
    if let Some(wizard) = &mut state.wizard {
        let id = wizard.project_id();
        return match project_wizard::handle_key(wizard, key)? {
            ProjectWizardAction::Cancel => {
                state.wizard = None;
                None
            }
            ProjectWizardAction::Submit(draft) => Some(ProjectAction::Save { id, draft }),
        };
    }

    let visible = state.visible(ctl.items());
    match key {
        KeyCode::Down => state.cursor.next(visible.len()),
        KeyCode::Up => state.cursor.previous(visible.len()),
        KeyCode::Char('n') => state.wizard = Some(ProjectWizardState::new()),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(project) = state.cursor.selected(&visible) {
                state.wizard = Some(ProjectWizardState::from_existing(project));
            }
        }
        KeyCode::Char('f') => {
            state.by_status.cycle(ctl.items());
            let len = state.visible(ctl.items()).len();
            state.cursor.clamp(len);
        }
        KeyCode::Char('r') => return Some(ProjectAction::Refresh),
        _ => {}
    }
    None
}

pub fn render_projects<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    state: &mut ProjectsState,
    ctl: &ListController<Project>,
) {
    let chunks = list_layout(area);
    let visible = state.visible(ctl.items());
    state.cursor.clamp(visible.len());

    let status = state.by_status.selection.label("All", |s| s.as_str());
    let filters = Paragraph::new(format!("{}: {status}", state.by_status.name()))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(filters, chunks[0]);
    render_error_line(f, chunks[1], load_error(ctl));

    match body_for(ctl, visible.len()) {
        Body::Loading => render_placeholder(f, chunks[2], "Projects", "Loading projects..."),
        Body::Empty => render_placeholder(f, chunks[2], "Projects", "No projects found"),
        Body::Rows => {
            let header = Row::new(["Project", "Client", "Start", "End", "Status", "Budget"])
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows = visible.iter().map(|p| {
                Row::new(vec![
                    Cell::from(p.name.clone()),
                    Cell::from(p.client_name.clone()),
                    Cell::from(display_date(p.start_date)),
                    Cell::from(display_date(p.end_date)),
                    Cell::from(p.status.as_str()),
                    Cell::from(money(p.budget)),
                ])
            });
            let table = Table::new(rows)
                .header(header)
                .block(Block::default().title("Projects").borders(Borders::ALL))
                .widths(&[
                    Constraint::Percentage(25),
                    Constraint::Percentage(20),
                    Constraint::Percentage(13),
                    Constraint::Percentage(13),
                    Constraint::Percentage(14),
                    Constraint::Percentage(15),
                ])
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol(">> ");
            f.render_stateful_widget(table, chunks[2], &mut state.cursor.table_state);
        }
    }

    render_help(
        f,
        chunks[3],
        "n - New | e - Edit | f - Status filter | r - Refresh | 1-4/Tab - Switch | q - Quit",
    );

    if let Some(wizard) = &state.wizard {
        render_project_wizard(f, wizard);
    }
}
