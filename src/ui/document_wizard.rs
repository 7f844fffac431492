use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use crate::models::{DocumentDraft, Project, DOCUMENT_TYPES};
use crate::ui::components::form::{edit_text, render_form, Choice, FormView, EDIT_HELP, FORM_HELP};
use crate::ui::components::popup::render_notice;
use crate::validation::{self, ValidationError};

pub enum DocumentWizardAction {
    Cancel,
    Submit(DocumentDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum DocumentField {
    FileUrl,
    Type,
    Project,
}

impl DocumentField {
    fn index(self) -> usize {
        match self {
            DocumentField::FileUrl => 0,
            DocumentField::Type => 1,
            DocumentField::Project => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            DocumentField::FileUrl => DocumentField::Type,
            DocumentField::Type => DocumentField::Project,
            DocumentField::Project => DocumentField::FileUrl,
        }
    }

    fn previous(self) -> Self {
        match self {
            DocumentField::FileUrl => DocumentField::Project,
            DocumentField::Type => DocumentField::FileUrl,
            DocumentField::Project => DocumentField::Type,
        }
    }
}

pub struct DocumentWizardState {
    pub file_url: String,
    pub doc_type: Choice<String>,
    pub project: Choice<String>,
    pub current_field: DocumentField,
    pub editing: bool,
    pub error: Option<String>,
    pub saving: bool,
    pub notice: Option<String>,
}

impl DocumentWizardState {
    /// Documents link to projects by name, so the options are names.
    pub fn new(projects: &[Project]) -> Self {
        let types = DOCUMENT_TYPES
            .iter()
            .map(|t| (t.to_string(), t.to_string()))
            .collect();
        let names = projects
            .iter()
            .map(|p| (p.name.clone(), p.name.clone()))
            .collect();
        Self {
            file_url: String::new(),
            doc_type: Choice::new("Select Type", types).with_value(&DOCUMENT_TYPES[0].to_string()),
            project: Choice::new("Select Project", names),
            current_field: DocumentField::FileUrl,
            editing: false,
            error: None,
            saving: false,
            notice: None,
        }
    }

    pub fn fail(&mut self, message: String) {
        self.saving = false;
        self.notice = Some(message);
    }

    pub fn to_draft(&self) -> Result<DocumentDraft, ValidationError> {
        let file_url = validation::http_url("File URL", &self.file_url)?;
        let doc_type = self
            .doc_type
            .value()
            .cloned()
            .ok_or(ValidationError::Required("Type"))?;
        let project = self
            .project
            .value()
            .cloned()
            .ok_or(ValidationError::Required("Project"))?;
        Ok(DocumentDraft {
            file_url,
            doc_type,
            project,
        })
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        match self.current_field {
            DocumentField::FileUrl => edit_text(&mut self.file_url, key),
            DocumentField::Type => self.doc_type.handle_key(key),
            DocumentField::Project => self.project.handle_key(key),
        }
    }
}

pub fn handle_key(state: &mut DocumentWizardState, key: KeyCode) -> Option<DocumentWizardAction> {
    if state.notice.take().is_some() || state.saving {
        return None;
    }

    match key {
        KeyCode::Esc if state.editing => state.editing = false,
        KeyCode::Esc => return Some(DocumentWizardAction::Cancel),
        KeyCode::Enter => state.editing = !state.editing,
        KeyCode::Up if !state.editing => state.current_field = state.current_field.previous(),
        KeyCode::Down | KeyCode::Tab if !state.editing => {
            state.current_field = state.current_field.next()
        }
        KeyCode::Char('s') if !state.editing => match state.to_draft() {
            Ok(draft) => {
                state.error = None;
                state.saving = true;
                return Some(DocumentWizardAction::Submit(draft));
            }
            Err(err) => state.error = Some(err.to_string()),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

pub fn render_document_wizard<B: Backend>(f: &mut Frame<B>, state: &DocumentWizardState) {
    let project = if state.project.is_empty() {
        "No projects available".to_string()
    } else {
        state.project.label().to_string()
    };

    let view = FormView {
        title: "Add Document",
        fields: vec![
            ("File URL", state.file_url.clone()),
            ("Type", state.doc_type.label().to_string()),
            ("Project", project),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectStatus;

    fn projects() -> Vec<Project> {
        ["Website", "Mobile"]
            .iter()
            .enumerate()
            .map(|(i, name)| Project {
                project_id: i as i64 + 1,
                name: name.to_string(),
                client_name: "Acme".into(),
                start_date: None,
                end_date: None,
                status: ProjectStatus::Planned,
                assigned_team: None,
                budget: 0.0,
            })
            .collect()
    }

    #[test]
    fn project_must_be_chosen() {
        let mut state = DocumentWizardState::new(&projects());
        state.file_url = "https://files.example.com/a.pdf".into();
        assert_eq!(state.to_draft(), Err(ValidationError::Required("Project")));

        state.project.next();
        let draft = state.to_draft().unwrap();
        assert_eq!(draft.project, "Website");
        assert_eq!(draft.doc_type, "Invoice");
    }

    #[test]
    fn url_must_be_http() {
        let mut state = DocumentWizardState::new(&projects());
        state.project.next();
        state.file_url = "ftp://files.example.com/a.pdf".into();
        assert_eq!(state.to_draft(), Err(ValidationError::InvalidUrl("File URL")));
        state.file_url.clear();
        assert_eq!(state.to_draft(), Err(ValidationError::Required("File URL")));
    }

    #[test]
    fn type_choice_cycles_while_editing() {
        let mut state = DocumentWizardState::new(&projects());
        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Right);
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(state.doc_type.value().map(String::as_str), Some("Contract"));
    }

    #[test]
    fn submit_blocks_input_until_failure_is_acknowledged() {
        let mut state = DocumentWizardState::new(&projects());
        state.file_url = "https://files.example.com/a.pdf".into();
        state.project.next();
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('s')),
            Some(DocumentWizardAction::Submit(_))
        ));
        assert!(state.saving);
        state.fail("network error: timed out".into());
        assert!(handle_key(&mut state, KeyCode::Char('x')).is_none());
        assert!(matches!(handle_key(&mut state, KeyCode::Esc), Some(DocumentWizardAction::Cancel)));
    }
}
