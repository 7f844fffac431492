use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::controller::ListController;
use crate::filter::{filter, Dimension, FieldFilter, Selection};
use crate::models::{wire::display_date, FinanceDraft, FinanceRecord, FinanceTotals, Project, RecordKind};
use crate::ui::components::popup::{render_confirm, render_notice};
use crate::ui::finance_wizard::{self, render_finance_wizard, FinanceWizardAction, FinanceWizardState};
use crate::ui::{
    body_for, list_layout, load_error, money, render_error_line, render_help, render_placeholder,
    Body, RowCursor,
};

pub enum FinanceAction {
    Refresh,
    Save { id: Option<i64>, draft: FinanceDraft },
    ConfirmDelete,
}

fn kind_of(record: &FinanceRecord) -> Option<&RecordKind> {
    Some(&record.kind)
}

/// Project dimension. Rows linked only by name match the selected
/// project's name.
#[derive(Default)]
pub struct ProjectFilter {
    pub selection: Selection<i64>,
    project_name: Option<String>,
}

impl ProjectFilter {
    /// Steps through the project list, remembering the chosen project's name.
    pub fn cycle(&mut self, projects: &[Project]) {
        let ids: Vec<i64> = projects.iter().map(|p| p.project_id).collect();
        self.selection = self.selection.cycle(&ids);
        self.project_name = match &self.selection {
            Selection::All => None,
            Selection::Only(id) => projects
                .iter()
                .find(|p| p.project_id == *id)
                .map(|p| p.name.clone()),
        };
    }
}

impl Dimension<FinanceRecord> for ProjectFilter {
    fn name(&self) -> &'static str {
        "Project"
    }

    fn matches(&self, record: &FinanceRecord) -> bool {
        match (&self.selection, record.project_id) {
            (Selection::All, _) => true,
            (Selection::Only(id), Some(linked)) => linked == *id,
            (Selection::Only(_), None) => {
                self.project_name.is_some() && record.project_name == self.project_name
            }
        }
    }
}

/// Income and expense tabs over one flattened collection, narrowed by project.
pub struct FinanceState {
    pub cursor: RowCursor,
    pub tab: FieldFilter<FinanceRecord, RecordKind>,
    pub by_project: ProjectFilter,
    pub wizard: Option<FinanceWizardState>,
    pub notice: Option<String>,
}

impl FinanceState {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::default(),
            tab: FieldFilter::new("Kind", kind_of).with(Selection::Only(RecordKind::Income)),
            by_project: ProjectFilter::default(),
            wizard: None,
            notice: None,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self.tab.selection {
            Selection::Only(kind) => kind,
            Selection::All => RecordKind::Income,
        }
    }

    pub fn switch_tab(&mut self) {
        let next = self.kind().toggle();
        self.tab.select(Selection::Only(next));
        self.cursor = RowCursor::default();
    }

    pub fn visible<'a>(&self, items: &'a [FinanceRecord]) -> Vec<&'a FinanceRecord> {
        let dims: [&dyn Dimension<FinanceRecord>; 2] = [&self.tab, &self.by_project];
        filter(items, &dims)
    }

    /// Totals for both kinds under the current project filter.
    pub fn totals(&self, items: &[FinanceRecord]) -> FinanceTotals {
        let dims: [&dyn Dimension<FinanceRecord>; 1] = [&self.by_project];
        FinanceTotals::from_records(filter(items, &dims))
    }

    /// Project options come from the project list, not from the records.
    pub fn cycle_project(&mut self, projects: &[Project]) {
        self.by_project.cycle(projects);
    }

    pub fn is_modal(&self, ctl: &ListController<FinanceRecord>) -> bool {
        self.wizard.is_some() || self.notice.is_some() || ctl.pending_delete().is_some()
    }

    pub fn save_failed(&mut self, message: String) {
        if let Some(wizard) = &mut self.wizard {
            wizard.fail(message);
        }
    }
}

impl Default for FinanceState {
    fn default() -> Self {
        Self::new()
    }
}

fn project_label(record: &FinanceRecord, projects: &[Project]) -> String {
    record
        .project_id
        .and_then(|id| projects.iter().find(|p| p.project_id == id))
        .map(|p| p.name.clone())
        .or_else(|| record.project_name.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn handle_key(
    state: &mut FinanceState,
    ctl: &mut ListController<FinanceRecord>,
    projects: &[Project],
    key: KeyCode,
) -> Option<FinanceAction> {
    if state.notice.take().is_some() {
        return None;
    }

    if let Some(wizard) = &mut state.wizard {
        let id = wizard.record_id();
        return match finance_wizard::handle_key(wizard, key)? {
            FinanceWizardAction::Cancel => {
                state.wizard = None;
                None
            }
            FinanceWizardAction::Submit(draft) => Some(FinanceAction::Save { id, draft }),
        };
    }

    if ctl.pending_delete().is_some() {
        return match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(FinanceAction::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                ctl.cancel_delete();
                None
            }
            _ => None,
        };
    }

    let visible = state.visible(ctl.items());
    let len = visible.len();
    let selected = state.cursor.selected(&visible).cloned();
    match key {
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        KeyCode::Char('i') | KeyCode::Left | KeyCode::Right => state.switch_tab(),
        KeyCode::Char('p') => {
            state.cycle_project(projects);
            let len = state.visible(ctl.items()).len();
            state.cursor.clamp(len);
        }
        KeyCode::Char('n') => {
            state.wizard = Some(FinanceWizardState::new(state.kind(), projects));
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(record) = selected {
                state.wizard = Some(FinanceWizardState::from_existing(&record, projects));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(record) = selected {
                ctl.request_delete(record.id);
            }
        }
        KeyCode::Char('r') => return Some(FinanceAction::Refresh),
        _ => {}
    }
    None
}

pub fn render_finance<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    state: &mut FinanceState,
    ctl: &ListController<FinanceRecord>,
    projects: &[Project],
) {
    let chunks = list_layout(area);
    let visible = state.visible(ctl.items());
    state.cursor.clamp(visible.len());

    let kind = state.kind();
    let project = match &state.by_project.selection {
        Selection::All => "All Projects".to_string(),
        Selection::Only(id) => projects
            .iter()
            .find(|p| p.project_id == *id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{id}")),
    };
    let totals = state.totals(ctl.items());
    let tab_style = |k: RecordKind| {
        if k == kind {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let bar = Paragraph::new(Spans::from(vec![
        Span::styled(" Income ", tab_style(RecordKind::Income)),
        Span::styled(" Expense ", tab_style(RecordKind::Expense)),
        Span::raw(format!(" | Project: {project} | ")),
        Span::styled(format!("Income {}", money(totals.income)), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(format!("Expense {}", money(totals.expense)), Style::default().fg(Color::Red)),
        Span::raw("  "),
        Span::styled(format!("Net {}", money(totals.net())), Style::default().fg(Color::Cyan)),
    ]));
    f.render_widget(bar, chunks[0]);
    render_error_line(f, chunks[1], load_error(ctl));

    let title = kind.label();
    match body_for(ctl, visible.len()) {
        Body::Loading => render_placeholder(f, chunks[2], title, "Loading finance records..."),
        Body::Empty => render_placeholder(f, chunks[2], title, "No records found"),
        Body::Rows => {
            let header = Row::new(["Project", "Client", "Amount", "Date", "Mode", "Notes"])
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows = visible.iter().map(|r| {
                Row::new(vec![
                    Cell::from(project_label(r, projects)),
                    Cell::from(r.client_name.clone()),
                    Cell::from(money(r.amount)),
                    Cell::from(display_date(r.date_received)),
                    Cell::from(r.payment_mode.clone()),
                    Cell::from(r.notes.clone().unwrap_or_default()),
                ])
            });
            let table = Table::new(rows)
                .header(header)
                .block(Block::default().title(title).borders(Borders::ALL))
                .widths(&[
                    Constraint::Percentage(20),
                    Constraint::Percentage(18),
                    Constraint::Percentage(12),
                    Constraint::Percentage(12),
                    Constraint::Percentage(14),
                    Constraint::Percentage(24),
                ])
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol(">> ");
            f.render_stateful_widget(table, chunks[2], &mut state.cursor.table_state);
        }
    }

    render_help(
        f,
        chunks[3],
        "i - Income/Expense | p - Project filter | n - Add | e - Edit | d - Delete | r - Refresh | q - Quit",
    );

    if ctl.pending_delete().is_some() {
        render_confirm(f, "Delete Record", &format!("Delete this {} record?", kind.as_str()));
    }
    if let Some(wizard) = &state.wizard {
        render_finance_wizard(f, wizard);
    }
    if let Some(notice) = &state.notice {
        render_notice(f, notice);
    }
}
