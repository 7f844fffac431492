pub mod components;
pub mod dashboard;
pub mod document_wizard;
pub mod documents;
pub mod finance;
pub mod finance_wizard;
pub mod project_wizard;
pub mod projects;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, TableState, Tabs},
    Frame,
};

use crate::api::Resource;
use crate::config::StartScreen;
use crate::controller::{ListController, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Projects,
    Documents,
    Finance,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Dashboard, Screen::Projects, Screen::Documents, Screen::Finance];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Projects => "Projects",
            Screen::Documents => "Documents",
            Screen::Finance => "Finance",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// `1`..`4` jump straight to a screen.
    pub fn from_digit(c: char) -> Option<Self> {
        c.to_digit(10)
            .and_then(|d| d.checked_sub(1))
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }
}

impl From<StartScreen> for Screen {
    fn from(start: StartScreen) -> Self {
        match start {
            StartScreen::Dashboard => Screen::Dashboard,
            StartScreen::Projects => Screen::Projects,
            StartScreen::Documents => Screen::Documents,
            StartScreen::Finance => Screen::Finance,
        }
    }
}

/// What the table area of a list screen should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Loading,
    Empty,
    Rows,
}

pub fn body_for<R: Resource>(controller: &ListController<R>, visible: usize) -> Body {
    if controller.is_loading() {
        Body::Loading
    } else if visible == 0 {
        Body::Empty
    } else {
        Body::Rows
    }
}

/// Inline message for a failed load; the retained rows stay visible below.
pub fn load_error<R: Resource>(controller: &ListController<R>) -> Option<String> {
    match (controller.phase(), controller.last_error()) {
        (Phase::LoadFailed, Some(err)) => Some(format!("Could not load {}s: {}", R::NAME, err)),
        _ => None,
    }
}

/// Draws the screen tabs and returns the area left for the screen itself.
pub fn render_shell<B: Backend>(frame: &mut Frame<B>, current: Screen) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)].as_ref())
        .split(frame.size());

    let titles = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| Spans::from(format!("{} {}", i + 1, s.title())))
        .collect();
    let selected = Screen::ALL.iter().position(|s| *s == current).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("bizdesk"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    chunks[1]
}

/// Splits a list screen into filter bar, error line, table and key help.
pub fn list_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(area)
}

pub fn render_error_line<B: Backend>(frame: &mut Frame<B>, area: Rect, message: Option<String>) {
    if let Some(message) = message {
        let line = Paragraph::new(Spans::from(Span::styled(message, Style::default().fg(Color::Red))));
        frame.render_widget(line, area);
    }
}

pub fn render_placeholder<B: Backend>(frame: &mut Frame<B>, area: Rect, title: &str, text: &str) {
    let placeholder = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(placeholder, area);
}

pub fn render_help<B: Backend>(frame: &mut Frame<B>, area: Rect, text: &str) {
    let buttons = Paragraph::new(text.to_string())
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, area);
}

pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Row cursor over a filtered view whose length changes under it.
#[derive(Default)]
pub struct RowCursor {
    pub table_state: TableState,
}

impl RowCursor {
    pub fn clamp(&mut self, len: usize) {
        let selected = match (self.table_state.selected(), len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
        self.table_state.select(selected);
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected<'a, T>(&self, visible: &[&'a T]) -> Option<&'a T> {
        self.table_state.selected().and_then(|i| visible.get(i).copied())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::api::{ApiError, Resource, ResourceClient};

    /// Client that serves a fixed list and refuses mutations.
    pub struct StaticClient<R>(pub Vec<R>);

    #[async_trait]
    impl<R: Resource> ResourceClient<R> for StaticClient<R> {
        async fn list(&self) -> Result<Vec<R>, ApiError> {
            Ok(self.0.clone())
        }

        async fn create(&self, _draft: &R::Draft) -> Result<Option<R>, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }

        async fn update(&self, _id: R::Id, _draft: &R::Draft) -> Result<Option<R>, ApiError> {
            Err(ApiError::Transport("offline".into()))
        }

        async fn delete(&self, _id: R::Id) -> Result<(), ApiError> {
            Err(ApiError::Transport("offline".into()))
        }
    }

    /// Client that serves a fixed list and accepts every mutation.
    pub struct AcceptingClient<R>(pub Vec<R>);

    #[async_trait]
    impl<R: Resource> ResourceClient<R> for AcceptingClient<R> {
        async fn list(&self) -> Result<Vec<R>, ApiError> {
            Ok(self.0.clone())
        }

        async fn create(&self, _draft: &R::Draft) -> Result<Option<R>, ApiError> {
            Ok(None)
        }

        async fn update(&self, _id: R::Id, _draft: &R::Draft) -> Result<Option<R>, ApiError> {
            Ok(None)
        }

        async fn delete(&self, _id: R::Id) -> Result<(), ApiError> {
            Ok(())
        }
    }

    pub async fn loaded<R: Resource>(rows: Vec<R>) -> crate::controller::ListController<R> {
        let mut controller = crate::controller::ListController::new(Arc::new(StaticClient(rows)));
        controller.refresh().await.unwrap();
        controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn doc(id: i64) -> Document {
        Document {
            id,
            name: format!("{id}.pdf"),
            doc_type: "Invoice".into(),
            project: "Website".into(),
            file_url: None,
            upload_date: None,
        }
    }

    #[tokio::test]
    async fn body_reflects_loading_and_emptiness() {
        let mut controller = testing::loaded(vec![doc(1)]).await;
        assert_eq!(body_for(&controller, 1), Body::Rows);
        assert_eq!(body_for(&controller, 0), Body::Empty);

        let _pending = controller.start_refresh();
        assert_eq!(body_for(&controller, 1), Body::Loading);
        assert_eq!(load_error(&controller), None);
    }

    #[test]
    fn digits_map_to_screens() {
        assert_eq!(Screen::from_digit('1'), Some(Screen::Dashboard));
        assert_eq!(Screen::from_digit('4'), Some(Screen::Finance));
        assert_eq!(Screen::from_digit('0'), None);
        assert_eq!(Screen::from_digit('5'), None);
        assert_eq!(Screen::Finance.next(), Screen::Dashboard);
    }

    #[test]
    fn cursor_follows_shrinking_views() {
        let mut cursor = RowCursor::default();
        cursor.clamp(3);
        assert_eq!(cursor.table_state.selected(), Some(0));
        cursor.previous(3);
        assert_eq!(cursor.table_state.selected(), Some(2));
        cursor.clamp(2);
        assert_eq!(cursor.table_state.selected(), Some(1));
        cursor.next(2);
        assert_eq!(cursor.table_state.selected(), Some(0));
        cursor.clamp(0);
        assert_eq!(cursor.table_state.selected(), None);
    }
}
