mod api;
mod config;
mod controller;
mod filter;
mod logging;
mod models;
mod ui;
mod validation;

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};

use crate::api::{ApiError, Resource, SummaryClient};
use crate::config::Cli;
use crate::controller::{ListController, PendingMutation, PendingRefresh};
use crate::models::{Document, FinanceRecord, Project};
use crate::ui::{
    dashboard::{self, render_dashboard, DashboardAction, DashboardState},
    documents::{self, render_documents, DocumentAction, DocumentsState},
    finance::{self, render_finance, FinanceAction, FinanceState},
    projects::{self, render_projects, ProjectAction, ProjectsState},
    Screen,
};

/// Work finished by a spawned request, applied on the UI task.
type Completion = Box<dyn FnOnce(&mut AppState) + Send>;

// Main application state
struct AppState {
    screen: Screen,
    projects: ListController<Project>,
    documents: ListController<Document>,
    finance: ListController<FinanceRecord>,
    summary: SummaryClient,
    dashboard: DashboardState,
    projects_page: ProjectsState,
    documents_page: DocumentsState,
    finance_page: FinanceState,
    tx: UnboundedSender<Completion>,
}

fn projects_ctl(app: &mut AppState) -> &mut ListController<Project> {
    &mut app.projects
}

fn documents_ctl(app: &mut AppState) -> &mut ListController<Document> {
    &mut app.documents
}

fn finance_ctl(app: &mut AppState) -> &mut ListController<FinanceRecord> {
    &mut app.finance
}

/// Runs `future` off the UI task and queues `apply` with its output.
fn spawn<T, F, A>(tx: &UnboundedSender<Completion>, future: F, apply: A)
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
    A: FnOnce(&mut AppState, T) + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let value = future.await;
        // receiver is gone once the app quits
        let _ = tx.send(Box::new(move |app: &mut AppState| apply(app, value)));
    });
}

fn spawn_refresh<R: Resource>(
    tx: &UnboundedSender<Completion>,
    pending: PendingRefresh<R>,
    pick: fn(&mut AppState) -> &mut ListController<R>,
) {
    let PendingRefresh { ticket, future } = pending;
    spawn(tx, future, move |app, result| {
        pick(app).apply_refresh(ticket, result);
    });
}

fn spawn_mutation<R: Resource>(
    tx: &UnboundedSender<Completion>,
    pending: PendingMutation<R>,
    pick: fn(&mut AppState) -> &mut ListController<R>,
    done: fn(&mut AppState, Result<(), ApiError>),
) {
    let PendingMutation { ticket, future } = pending;
    spawn(tx, future, move |app, result| {
        match pick(app).finish_mutation(ticket, result) {
            Ok(Some(refresh)) => {
                let tx = app.tx.clone();
                spawn_refresh(&tx, refresh, pick);
                done(app, Ok(()));
            }
            Ok(None) => {}
            Err(err) => done(app, Err(err)),
        }
    });
}

fn project_saved(app: &mut AppState, result: Result<(), ApiError>) {
    match result {
        Ok(()) => {
            tracing::info!("project saved");
            app.projects_page.wizard = None;
        }
        Err(err) => app.projects_page.save_failed(err.to_string()),
    }
}

fn document_saved(app: &mut AppState, result: Result<(), ApiError>) {
    match result {
        Ok(()) => {
            tracing::info!("document added");
            app.documents_page.wizard = None;
        }
        Err(err) => app.documents_page.save_failed(err.to_string()),
    }
}

fn document_deleted(app: &mut AppState, result: Result<(), ApiError>) {
    match result {
        Ok(()) => tracing::info!("document deleted"),
        Err(err) => app.documents_page.notice = Some(format!("Could not delete document: {err}")),
    }
}

fn finance_saved(app: &mut AppState, result: Result<(), ApiError>) {
    match result {
        Ok(()) => {
            tracing::info!("finance record saved");
            app.finance_page.wizard = None;
        }
        Err(err) => app.finance_page.save_failed(err.to_string()),
    }
}

fn finance_deleted(app: &mut AppState, result: Result<(), ApiError>) {
    match result {
        Ok(()) => tracing::info!("finance record deleted"),
        Err(err) => app.finance_page.notice = Some(format!("Could not delete record: {err}")),
    }
}

/// Controllers a screen reads from.
fn uses(screen: Screen) -> (bool, bool, bool) {
    match screen {
        Screen::Dashboard => (false, false, false),
        Screen::Projects => (true, false, false),
        Screen::Documents => (true, true, false),
        Screen::Finance => (true, false, true),
    }
}

impl AppState {
    fn new(backend: &api::Backend, screen: Screen, tx: UnboundedSender<Completion>) -> Self {
        Self {
            screen,
            projects: ListController::new(Arc::new(backend.projects())),
            documents: ListController::new(Arc::new(backend.documents())),
            finance: ListController::new(Arc::new(backend.finance())),
            summary: backend.summary(),
            dashboard: DashboardState::default(),
            projects_page: ProjectsState::new(),
            documents_page: DocumentsState::new(),
            finance_page: FinanceState::new(),
            tx,
        }
    }

    fn refresh_projects(&mut self) {
        let pending = self.projects.start_refresh();
        spawn_refresh(&self.tx, pending, projects_ctl);
    }

    fn refresh_documents(&mut self) {
        let pending = self.documents.start_refresh();
        spawn_refresh(&self.tx, pending, documents_ctl);
    }

    fn refresh_finance(&mut self) {
        let pending = self.finance.start_refresh();
        spawn_refresh(&self.tx, pending, finance_ctl);
    }

    fn refresh_dashboard(&mut self) {
        let generation = self.dashboard.begin();

        let summary = self.summary.clone();
        spawn(
            &self.tx,
            async move { summary.dashboard().await },
            move |app, result| app.dashboard.apply_summary(generation, result),
        );

        let summary = self.summary.clone();
        spawn(
            &self.tx,
            async move { summary.upcoming_project().await },
            move |app, result| app.dashboard.apply_upcoming(generation, result),
        );
    }

    fn load(&mut self) {
        let (projects, documents, finance) = uses(self.screen);
        if self.screen == Screen::Dashboard {
            self.refresh_dashboard();
        }
        if projects {
            self.refresh_projects();
        }
        if documents {
            self.refresh_documents();
        }
        if finance {
            self.refresh_finance();
        }
    }

    /// Leaving a screen detaches whatever the next one does not read, so
    /// late responses for it are dropped.
    fn switch_to(&mut self, next: Screen) {
        if next == self.screen {
            return;
        }
        tracing::info!(from = self.screen.title(), to = next.title(), "switching screen");

        let (old_p, old_d, old_f) = uses(self.screen);
        let (new_p, new_d, new_f) = uses(next);
        if self.screen == Screen::Dashboard {
            self.dashboard.detach();
        }
        if old_p && !new_p {
            self.projects.detach();
        }
        if old_d && !new_d {
            self.documents.detach();
        }
        if old_f && !new_f {
            self.finance.detach();
        }

        self.screen = next;
        self.load();
    }

    fn is_modal(&self) -> bool {
        match self.screen {
            Screen::Dashboard => false,
            Screen::Projects => self.projects_page.is_modal(),
            Screen::Documents => self.documents_page.is_modal(&self.documents),
            Screen::Finance => self.finance_page.is_modal(&self.finance),
        }
    }

    /// Waits briefly for a key press so completions keep flowing.
    fn handle_input(&mut self) -> Result<bool> {
        if !event::poll(Duration::from_millis(100))? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.handle_key(key.code)),
            _ => Ok(false),
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyCode) -> bool {
        if !self.is_modal() {
            match key {
                KeyCode::Char('q') => return true,
                KeyCode::Tab => {
                    self.switch_to(self.screen.next());
                    return false;
                }
                KeyCode::Char(c) => {
                    if let Some(screen) = Screen::from_digit(c) {
                        self.switch_to(screen);
                        return false;
                    }
                }
                _ => {}
            }
        }

        match self.screen {
            Screen::Dashboard => {
                if let Some(DashboardAction::Refresh) = dashboard::handle_key(&mut self.dashboard, key) {
                    self.refresh_dashboard();
                }
            }
            Screen::Projects => {
                match projects::handle_key(&mut self.projects_page, &self.projects, key) {
                    Some(ProjectAction::Refresh) => self.refresh_projects(),
                    Some(ProjectAction::Save { id, draft }) => {
                        let pending = match id {
                            Some(id) => self.projects.start_update(id, draft),
                            None => self.projects.start_create(draft),
                        };
                        spawn_mutation(&self.tx, pending, projects_ctl, project_saved);
                    }
                    None => {}
                }
            }
            Screen::Documents => {
                let action = documents::handle_key(
                    &mut self.documents_page,
                    &mut self.documents,
                    self.projects.items(),
                    key,
                );
                match action {
                    Some(DocumentAction::Refresh) => {
                        self.refresh_projects();
                        self.refresh_documents();
                    }
                    Some(DocumentAction::Save(draft)) => {
                        let pending = self.documents.start_create(draft);
                        spawn_mutation(&self.tx, pending, documents_ctl, document_saved);
                    }
                    Some(DocumentAction::ConfirmDelete) => {
                        if let Some(pending) = self.documents.confirm_delete() {
                            spawn_mutation(&self.tx, pending, documents_ctl, document_deleted);
                        }
                    }
                    None => {}
                }
            }
            Screen::Finance => {
                let action = finance::handle_key(
                    &mut self.finance_page,
                    &mut self.finance,
                    self.projects.items(),
                    key,
                );
                match action {
                    Some(FinanceAction::Refresh) => {
                        self.refresh_projects();
                        self.refresh_finance();
                    }
                    Some(FinanceAction::Save { id, draft }) => {
                        let pending = match id {
                            Some(id) => self.finance.start_update(id, draft),
                            None => self.finance.start_create(draft),
                        };
                        spawn_mutation(&self.tx, pending, finance_ctl, finance_saved);
                    }
                    Some(FinanceAction::ConfirmDelete) => {
                        if let Some(pending) = self.finance.confirm_delete() {
                            spawn_mutation(&self.tx, pending, finance_ctl, finance_deleted);
                        }
                    }
                    None => {}
                }
            }
        }
        false
    }

    fn render<B: Backend>(&mut self, f: &mut Frame<B>) {
        let area = ui::render_shell(f, self.screen);
        match self.screen {
            Screen::Dashboard => render_dashboard(f, area, &self.dashboard),
            Screen::Projects => render_projects(f, area, &mut self.projects_page, &self.projects),
            Screen::Documents => {
                render_documents(f, area, &mut self.documents_page, &self.documents)
            }
            Screen::Finance => render_finance(
                f,
                area,
                &mut self.finance_page,
                &self.finance,
                self.projects.items(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init(&cli)?;
    logging::init(&config.log_file)?;
    tracing::info!(backend = config.backend_url(), "starting bizdesk");

    let backend = api::Backend::new(&config)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app_state = AppState::new(&backend, cli.screen.into(), tx);

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app_state.load();
    let result = run_app(&mut terminal, &mut app_state, &mut rx).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "bizdesk exited with an error");
    }
    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    rx: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    loop {
        while let Ok(apply) = rx.try_recv() {
            apply(app_state);
        }

        terminal.draw(|f| app_state.render(f))?;

        if app_state.handle_input()? {
            break;
        }
    }

    Ok(())
}
