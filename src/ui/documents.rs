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
use crate::models::{wire::display_date, Document, DocumentDraft, Project};
use crate::ui::components::popup::{render_confirm, render_notice};
use crate::ui::document_wizard::{self, render_document_wizard, DocumentWizardAction, DocumentWizardState};
use crate::ui::{
    body_for, list_layout, load_error, render_error_line, render_help, render_placeholder, Body,
    RowCursor,
};

pub enum DocumentAction {
    Refresh,
    Save(DocumentDraft),
    ConfirmDelete,
}

fn project_of(doc: &Document) -> Option<&String> {
    Some(&doc.project).filter(|p| !p.is_empty())
}

fn type_of(doc: &Document) -> Option<&String> {
    Some(&doc.doc_type).filter(|t| !t.is_empty())
}

pub struct DocumentsState {
    pub cursor: RowCursor,
    pub by_project: FieldFilter<Document, String>,
    pub by_type: FieldFilter<Document, String>,
    pub wizard: Option<DocumentWizardState>,
    pub notice: Option<String>,
}

impl DocumentsState {
    pub fn new() -> Self {
        Self {
            cursor: RowCursor::default(),
            by_project: FieldFilter::new("Project", project_of),
            by_type: FieldFilter::new("Type", type_of),
            wizard: None,
            notice: None,
        }
    }

    pub fn visible<'a>(&self, items: &'a [Document]) -> Vec<&'a Document> {
        let dims: [&dyn Dimension<Document>; 2] = [&self.by_project, &self.by_type];
        filter(items, &dims)
    }

    pub fn is_modal(&self, ctl: &ListController<Document>) -> bool {
        self.wizard.is_some() || self.notice.is_some() || ctl.pending_delete().is_some()
    }

    pub fn save_failed(&mut self, message: String) {
        if let Some(wizard) = &mut self.wizard {
            wizard.fail(message);
        }
    }
}

impl Default for DocumentsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key(
    state: &mut DocumentsState,
    ctl: &mut ListController<Document>,
    projects: &[Project],
    key: KeyCode,
) -> Option<DocumentAction> {
    if state.notice.take().is_some() {
        return None;
    }

    if let Some(wizard) = &mut state.wizard {
        return match document_wizard::handle_key(wizard, key)? {
            DocumentWizardAction::Cancel => {
                state.wizard = None;
                None
            }
            DocumentWizardAction::Submit(draft) => Some(DocumentAction::Save(draft)),
        };
    }

    if ctl.pending_delete().is_some() {
        return match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(DocumentAction::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                ctl.cancel_delete();
                None
            }
            _ => None,
        };
    }

    let visible = state.visible(ctl.items());
    let len = visible.len();
    let selected = state.cursor.selected(&visible).map(|d| d.id);
    match key {
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        KeyCode::Char('n') => state.wizard = Some(DocumentWizardState::new(projects)),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = selected {
                ctl.request_delete(id);
            }
        }
        KeyCode::Char('p') => {
            state.by_project.cycle(ctl.items());
            let len = state.visible(ctl.items()).len();
            state.cursor.clamp(len);
        }
        KeyCode::Char('t') => {
            state.by_type.cycle(ctl.items());
            let len = state.visible(ctl.items()).len();
            state.cursor.clamp(len);
        }
        KeyCode::Char('r') => return Some(DocumentAction::Refresh),
        _ => {}
    }
    None
}

pub fn render_documents<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    state: &mut DocumentsState,
    ctl: &ListController<Document>,
) {
    let chunks = list_layout(area);
    let visible = state.visible(ctl.items());
    state.cursor.clamp(visible.len());

    let project = state.by_project.selection.label("All Projects", |p| p.as_str());
    let doc_type = state.by_type.selection.label("All Types", |t| t.as_str());
    let filters = Paragraph::new(format!(
        "{}: {project} | {}: {doc_type}",
        state.by_project.name(),
        state.by_type.name()
    ))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(filters, chunks[0]);
    render_error_line(f, chunks[1], load_error(ctl));

    match body_for(ctl, visible.len()) {
        Body::Loading => render_placeholder(f, chunks[2], "Documents", "Loading documents..."),
        Body::Empty => render_placeholder(f, chunks[2], "Documents", "No documents found"),
        Body::Rows => {
            let header = Row::new(["Name", "Type", "Project", "Uploaded", "URL"])
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows = visible.iter().map(|d| {
                Row::new(vec![
                    Cell::from(d.name.clone()),
                    Cell::from(d.doc_type.clone()),
                    Cell::from(d.project.clone()),
                    Cell::from(display_date(d.upload_date)),
                    Cell::from(d.file_url.clone().unwrap_or_default()),
                ])
            });
            let table = Table::new(rows)
                .header(header)
                .block(Block::default().title("Documents").borders(Borders::ALL))
                .widths(&[
                    Constraint::Percentage(22),
                    Constraint::Percentage(12),
                    Constraint::Percentage(18),
                    Constraint::Percentage(12),
                    Constraint::Percentage(36),
                ])
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol(">> ");
            f.render_stateful_widget(table, chunks[2], &mut state.cursor.table_state);
        }
    }

    render_help(
        f,
        chunks[3],
        "n - Add | d - Delete | p - Project filter | t - Type filter | r - Refresh | q - Quit",
    );

    if let Some(id) = ctl.pending_delete() {
        let name = ctl.find(id).map(|d| d.name.as_str()).unwrap_or("this document");
        render_confirm(f, "Delete Document", &format!("Delete '{name}'?"));
    }
    if let Some(wizard) = &state.wizard {
        render_document_wizard(f, wizard);
    }
    if let Some(notice) = &state.notice {
        render_notice(f, notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::loaded;

    fn doc(id: i64, doc_type: &str, project: &str) -> Document {
        Document {
            id,
            name: format!("{id}.pdf"),
            doc_type: doc_type.into(),
            project: project.into(),
            file_url: None,
            upload_date: None,
        }
    }

    fn rows() -> Vec<Document> {
        vec![
            doc(1, "Invoice", "Website"),
            doc(2, "Contract", "Website"),
            doc(3, "Invoice", "Mobile"),
        ]
    }

    #[tokio::test]
    async fn project_and_type_filters_combine() {
        let mut ctl = loaded(rows()).await;
        let mut state = DocumentsState::new();

        handle_key(&mut state, &mut ctl, &[], KeyCode::Char('p'));
        let ids: Vec<_> = state.visible(ctl.items()).iter().map(|d| d.id).collect();
        assert_eq!(ids, [1, 2]);

        handle_key(&mut state, &mut ctl, &[], KeyCode::Char('t'));
        let ids: Vec<_> = state.visible(ctl.items()).iter().map(|d| d.id).collect();
        assert_eq!(ids, [1]);

        // still invoices only, now for Mobile
        handle_key(&mut state, &mut ctl, &[], KeyCode::Char('p'));
        let ids: Vec<_> = state.visible(ctl.items()).iter().map(|d| d.id).collect();
        assert_eq!(ids, [3]);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let mut ctl = loaded(rows()).await;
        let mut state = DocumentsState::new();
        state.cursor.clamp(3);
        state.cursor.next(3);

        assert!(handle_key(&mut state, &mut ctl, &[], KeyCode::Char('d')).is_none());
        assert_eq!(ctl.pending_delete(), Some(2));
        assert!(state.is_modal(&ctl));

        assert!(handle_key(&mut state, &mut ctl, &[], KeyCode::Char('n')).is_none());
        assert_eq!(ctl.pending_delete(), None);

        handle_key(&mut state, &mut ctl, &[], KeyCode::Char('d'));
        assert!(matches!(
            handle_key(&mut state, &mut ctl, &[], KeyCode::Char('y')),
            Some(DocumentAction::ConfirmDelete)
        ));
    }

    #[tokio::test]
    async fn notice_swallows_one_key() {
        let mut ctl = loaded(rows()).await;
        let mut state = DocumentsState::new();
        state.notice = Some("server error (500): boom".into());
        assert!(handle_key(&mut state, &mut ctl, &[], KeyCode::Char('r')).is_none());
        assert!(matches!(
            handle_key(&mut state, &mut ctl, &[], KeyCode::Char('r')),
            Some(DocumentAction::Refresh)
        ));
    }
}
