use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::{Project, ProjectDraft, ProjectStatus};
use crate::ui::components::date_input::DateInput;
use crate::ui::components::form::{edit_text, render_form, FormView, EDIT_HELP, FORM_HELP};
use crate::ui::components::popup::render_notice;
use crate::validation::{self, ValidationError};

pub enum ProjectWizardAction {
    Cancel,
    Submit(ProjectDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Client,
    StartDate,
    EndDate,
    Status,
    Team,
    Budget,
}

impl ProjectField {
    const ORDER: [ProjectField; 7] = [
        ProjectField::Name,
        ProjectField::Client,
        ProjectField::StartDate,
        ProjectField::EndDate,
        ProjectField::Status,
        ProjectField::Team,
        ProjectField::Budget,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

pub struct ProjectWizardState {
    project_id: Option<i64>,
    pub name: String,
    pub client_name: String,
    pub start_date: DateInput,
    pub end_date: DateInput,
    pub status: ProjectStatus,
    pub assigned_team: String,
    pub budget: String,
    pub current_field: ProjectField,
    pub editing: bool,
    pub error: Option<String>,
    pub saving: bool,
    pub notice: Option<String>,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            project_id: None,
            name: String::new(),
            client_name: String::new(),
            start_date: DateInput::optional(Some(today)),
            end_date: DateInput::optional(None),
            status: ProjectStatus::Planned,
            assigned_team: String::new(),
            budget: "0.00".to_string(),
            current_field: ProjectField::Name,
            editing: false,
            error: None,
            saving: false,
            notice: None,
        }
    }

    pub fn from_existing(project: &Project) -> Self {
        Self {
            project_id: Some(project.project_id),
            name: project.name.clone(),
            client_name: project.client_name.clone(),
            start_date: DateInput::optional(project.start_date),
            end_date: DateInput::optional(project.end_date),
            status: project.status,
            assigned_team: project.assigned_team.clone().unwrap_or_default(),
            budget: format!("{:.2}", project.budget),
            ..Self::new()
        }
    }

    pub fn project_id(&self) -> Option<i64> {
        self.project_id
    }

    /// Keeps the form open after a failed save and shows why.
    pub fn fail(&mut self, message: String) {
        self.saving = false;
        self.notice = Some(message);
    }

    pub fn next_field(&mut self) {
        let i = self.current_field.index();
        self.current_field = ProjectField::ORDER[(i + 1) % ProjectField::ORDER.len()];
    }

    pub fn previous_field(&mut self) {
        let i = self.current_field.index();
        let len = ProjectField::ORDER.len();
        self.current_field = ProjectField::ORDER[(i + len - 1) % len];
    }

    fn toggle_editing(&mut self) {
        if self.editing {
            match self.current_field {
                ProjectField::StartDate => {
                    self.start_date.commit();
                }
                ProjectField::EndDate => {
                    self.end_date.commit();
                }
                _ => {}
            }
        }
        self.editing = !self.editing;
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        match self.current_field {
            ProjectField::Name => edit_text(&mut self.name, key),
            ProjectField::Client => edit_text(&mut self.client_name, key),
            ProjectField::StartDate => self.start_date.handle_key(key),
            ProjectField::EndDate => self.end_date.handle_key(key),
            ProjectField::Status => match key {
                KeyCode::Right | KeyCode::Char(' ') => self.status = self.status.next(),
                KeyCode::Left => self.status = self.status.previous(),
                _ => {}
            },
            ProjectField::Team => edit_text(&mut self.assigned_team, key),
            ProjectField::Budget => edit_text(&mut self.budget, key),
        }
    }

    pub fn to_draft(&self) -> Result<ProjectDraft, ValidationError> {
        Ok(ProjectDraft {
            project_name: validation::required("Project Name", &self.name)?,
            client_name: validation::required("Client Name", &self.client_name)?,
            start_date: self.start_date.value(),
            end_date: self.end_date.value(),
            status: self.status,
            assigned_team: self.assigned_team.trim().to_string(),
            budget: validation::non_negative_amount("Budget", &self.budget)?,
        })
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key(state: &mut ProjectWizardState, key: KeyCode) -> Option<ProjectWizardAction> {
    if state.notice.take().is_some() || state.saving {
        return None;
    }

    match key {
        KeyCode::Esc if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(ProjectWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.to_draft() {
            Ok(draft) => {
                state.error = None;
                state.saving = true;
                return Some(ProjectWizardAction::Submit(draft));
            }
            Err(err) => state.error = Some(err.to_string()),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState) {
    let title = if state.project_id.is_none() {
        "Add New Project"
    } else {
        "Edit Project"
    };

    let view = FormView {
        title,
        fields: vec![
            ("Project Name", state.name.clone()),
            ("Client Name", state.client_name.clone()),
            ("Start Date", state.start_date.display()),
            ("End Date", state.end_date.display()),
            ("Status", state.status.as_str().to_string()),
            ("Assigned Team", state.assigned_team.clone()),
            ("Budget", state.budget.clone()),
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
