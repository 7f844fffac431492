use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::{FinanceDraft, FinanceRecord, PaymentMode, Project, RecordKind};
use crate::ui::components::date_input::DateInput;
use crate::ui::components::form::{edit_text, render_form, Choice, FormView, EDIT_HELP, FORM_HELP};
use crate::ui::components::popup::render_notice;
use crate::validation::{self, ValidationError};

pub enum FinanceWizardAction {
    Cancel,
    Submit(FinanceDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum FinanceField {
    Project,
    Client,
    Amount,
    Date,
    PaymentMode,
    Notes,
}

impl FinanceField {
    const ORDER: [FinanceField; 6] = [
        FinanceField::Project,
        FinanceField::Client,
        FinanceField::Amount,
        FinanceField::Date,
        FinanceField::PaymentMode,
        FinanceField::Notes,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

pub struct FinanceWizardState {
    record_id: Option<i64>,
    pub kind: RecordKind,
    pub project: Choice<i64>,
    pub client_name: String,
    pub amount: String,
    pub date: DateInput,
    pub payment_mode: PaymentMode,
    /// A stored mode outside the known list, kept until the field is changed.
    stored_mode: Option<String>,
    pub notes: String,
    pub current_field: FinanceField,
    pub editing: bool,
    pub error: Option<String>,
    pub saving: bool,
    pub notice: Option<String>,
}

fn project_options(projects: &[Project]) -> Vec<(i64, String)> {
    projects
        .iter()
        .map(|p| (p.project_id, p.name.clone()))
        .collect()
}

impl FinanceWizardState {
    pub fn new(kind: RecordKind, projects: &[Project]) -> Self {
        Self {
            record_id: None,
            kind,
            project: Choice::new("Select Project", project_options(projects)),
            client_name: String::new(),
            amount: String::new(),
            date: DateInput::required(chrono::Local::now().date_naive()),
            payment_mode: PaymentMode::default(),
            stored_mode: None,
            notes: String::new(),
            current_field: FinanceField::Project,
            editing: false,
            error: None,
            saving: false,
            notice: None,
        }
    }

    pub fn from_existing(record: &FinanceRecord, projects: &[Project]) -> Self {
        let draft = FinanceDraft::from(record);
        let mut project = Choice::new("Select Project", project_options(projects));
        let linked = record.project_id.or_else(|| {
            let name = record.project_name.as_deref()?;
            projects.iter().find(|p| p.name == name).map(|p| p.project_id)
        });
        if let Some(id) = linked {
            project = project.with_value(&id);
        }
        let parsed = PaymentMode::parse(&draft.payment_mode);
        let stored_mode = match parsed {
            None if !draft.payment_mode.trim().is_empty() => Some(draft.payment_mode.clone()),
            _ => None,
        };
        Self {
            record_id: Some(record.id),
            project,
            client_name: draft.client_name,
            amount: format!("{:.2}", draft.amount),
            date: DateInput::required(draft.date_received),
            payment_mode: parsed.unwrap_or_default(),
            stored_mode,
            notes: draft.notes,
            ..Self::new(record.kind, &[])
        }
    }

    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }

    pub fn fail(&mut self, message: String) {
        self.saving = false;
        self.notice = Some(message);
    }

    pub fn next_field(&mut self) {
        let i = self.current_field.index();
        self.current_field = FinanceField::ORDER[(i + 1) % FinanceField::ORDER.len()];
    }

    pub fn previous_field(&mut self) {
        let i = self.current_field.index();
        let len = FinanceField::ORDER.len();
        self.current_field = FinanceField::ORDER[(i + len - 1) % len];
    }

    fn toggle_editing(&mut self) {
        if self.editing && self.current_field == FinanceField::Date {
            self.date.commit();
        }
        self.editing = !self.editing;
    }

    /// Label shown and submitted for the payment mode.
    pub fn payment_mode_label(&self) -> &str {
        self.stored_mode.as_deref().unwrap_or(self.payment_mode.as_str())
    }

    fn step_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = mode;
        self.stored_mode = None;
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        match self.current_field {
            FinanceField::Project => self.project.handle_key(key),
            FinanceField::Client => edit_text(&mut self.client_name, key),
            FinanceField::Amount => edit_text(&mut self.amount, key),
            FinanceField::Date => self.date.handle_key(key),
            FinanceField::PaymentMode => match key {
                KeyCode::Right | KeyCode::Char(' ') => self.step_payment_mode(self.payment_mode.next()),
                KeyCode::Left => self.step_payment_mode(self.payment_mode.previous()),
                _ => {}
            },
            FinanceField::Notes => edit_text(&mut self.notes, key),
        }
    }

    pub fn to_draft(&self) -> Result<FinanceDraft, ValidationError> {
        let project_id = *self.project.value().ok_or(ValidationError::Required("Project"))?;
        let client_name = validation::required("Client Name", &self.client_name)?;
        let amount = validation::positive_amount("Amount", &self.amount)?;
        let date_received = self.date.value().ok_or(ValidationError::Required("Date"))?;
        Ok(FinanceDraft {
            project_id,
            client_name,
            amount,
            date_received,
            payment_mode: self.payment_mode_label().to_string(),
            notes: self.notes.trim().to_string(),
            kind: self.kind,
        })
    }
}

pub fn handle_key(state: &mut FinanceWizardState, key: KeyCode) -> Option<FinanceWizardAction> {
    if state.notice.take().is_some() || state.saving {
        return None;
    }

    match key {
        KeyCode::Esc if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(FinanceWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.to_draft() {
            Ok(draft) => {
                state.error = None;
                state.saving = true;
                return Some(FinanceWizardAction::Submit(draft));
            }
            Err(err) => state.error = Some(err.to_string()),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

pub fn render_finance_wizard<B: Backend>(f: &mut Frame<B>, state: &FinanceWizardState) {
    let title = match (state.record_id.is_some(), state.kind) {
        (false, RecordKind::Income) => "Add Income",
        (false, RecordKind::Expense) => "Add Expense",
        (true, RecordKind::Income) => "Edit Income",
        (true, RecordKind::Expense) => "Edit Expense",
    };
    let project = if state.project.is_empty() {
        "No projects available".to_string()
    } else {
        state.project.label().to_string()
    };

    let view = FormView {
        title,
        fields: vec![
            ("Project", project),
            ("Client Name", state.client_name.clone()),
            ("Amount", state.amount.clone()),
            ("Date", state.date.display()),
            ("Payment Mode", state.payment_mode_label().to_string()),
            ("Notes", state.notes.clone()),
        ],
        current: state.current_field.index(),
        editing: state.editing,
        error: state.error.as_deref(),
        saving: state.saving,
        help: if state.editing { EDIT_HELP } else { FORM_HELP },
    };
    render_form(f, &view);

    if let Some(notice) = &state.notice {
        render_notice(f, notice);
    }
}
