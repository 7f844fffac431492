//! In-memory collection for one resource, kept in step with the backend.
//!
//! Every operation comes in two shapes. The split-phase `start_*` methods
//! return a ticket plus a detached future so the UI can spawn the request
//! and apply the result later; the `async` methods drive the same steps
//! inline. Refresh tickets carry a sequence number and only the most
//! recently issued one may touch `items`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::api::{ApiError, Resource, ResourceClient};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    Mutating,
    MutationFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    epoch: u64,
}

pub struct PendingRefresh<R> {
    pub ticket: Ticket,
    pub future: BoxFuture<Result<Vec<R>, ApiError>>,
}

pub struct PendingMutation<R> {
    pub ticket: Ticket,
    pub future: BoxFuture<Result<Option<R>, ApiError>>,
}

pub struct ListController<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    items: Vec<R>,
    is_loading: bool,
    phase: Phase,
    last_error: Option<ApiError>,
    pending_delete: Option<R::Id>,
    next_seq: u64,
    latest_refresh: u64,
    epoch: u64,
    discarded: usize,
}

impl<R: Resource> ListController<R> {
    pub fn new(client: Arc<dyn ResourceClient<R>>) -> Self {
        Self {
            client,
            items: Vec::new(),
            is_loading: false,
            phase: Phase::Idle,
            last_error: None,
            pending_delete: None,
            next_seq: 0,
            latest_refresh: 0,
            epoch: 0,
            discarded: 0,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn find(&self, id: R::Id) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Number of results dropped because a newer ticket existed.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    fn issue(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            seq: self.next_seq,
            epoch: self.epoch,
        }
    }

    pub fn start_refresh(&mut self) -> PendingRefresh<R> {
        let ticket = self.issue();
        self.latest_refresh = ticket.seq;
        self.is_loading = true;
        self.phase = Phase::Loading;

        let client = Arc::clone(&self.client);
        PendingRefresh {
            ticket,
            future: Box::pin(async move { client.list().await }),
        }
    }

    /// Applies a list result. Returns false when the ticket is stale, in
    /// which case nothing changes.
    pub fn apply_refresh(&mut self, ticket: Ticket, result: Result<Vec<R>, ApiError>) -> bool {
        if ticket.epoch != self.epoch || ticket.seq != self.latest_refresh {
            self.discarded += 1;
            tracing::warn!(resource = R::NAME, seq = ticket.seq, "discarding stale list response");
            return false;
        }

        self.is_loading = false;
        match result {
            Ok(items) => {
                tracing::info!(resource = R::NAME, count = items.len(), "collection refreshed");
                self.items = items;
                self.phase = Phase::Loaded;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(resource = R::NAME, error = %err, "refresh failed");
                self.phase = Phase::LoadFailed;
                self.last_error = Some(err);
            }
        }
        true
    }

    fn begin_mutation(&mut self, future: BoxFuture<Result<Option<R>, ApiError>>) -> PendingMutation<R> {
        let ticket = self.issue();
        self.phase = Phase::Mutating;
        self.last_error = None;
        PendingMutation { ticket, future }
    }

    pub fn start_create(&mut self, draft: R::Draft) -> PendingMutation<R> {
        let client = Arc::clone(&self.client);
        self.begin_mutation(Box::pin(async move { client.create(&draft).await }))
    }

    pub fn start_update(&mut self, id: R::Id, draft: R::Draft) -> PendingMutation<R> {
        let client = Arc::clone(&self.client);
        self.begin_mutation(Box::pin(async move { client.update(id, &draft).await }))
    }

    fn start_delete(&mut self, id: R::Id) -> PendingMutation<R> {
        let client = Arc::clone(&self.client);
        self.begin_mutation(Box::pin(async move { client.delete(id).await.map(|()| None) }))
    }

    /// Completes a mutation. Success starts the follow-up refresh and hands
    /// it back; `Ok(None)` means the controller was detached meanwhile.
    pub fn finish_mutation(
        &mut self,
        ticket: Ticket,
        result: Result<Option<R>, ApiError>,
    ) -> Result<Option<PendingRefresh<R>>, ApiError> {
        if ticket.epoch != self.epoch {
            self.discarded += 1;
            tracing::warn!(resource = R::NAME, seq = ticket.seq, "discarding mutation result for detached view");
            return Ok(None);
        }

        match result {
            Ok(_) => Ok(Some(self.start_refresh())),
            Err(err) => {
                tracing::warn!(resource = R::NAME, error = %err, "mutation failed");
                self.phase = Phase::MutationFailed;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Marks `id` as awaiting confirmation. No request is made yet.
    pub fn request_delete(&mut self, id: R::Id) {
        self.pending_delete = Some(id);
    }

    pub fn pending_delete(&self) -> Option<R::Id> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<PendingMutation<R>> {
        let id = self.pending_delete.take()?;
        Some(self.start_delete(id))
    }

    /// Invalidates every outstanding ticket; their results will be dropped.
    pub fn detach(&mut self) {
        self.epoch += 1;
        self.is_loading = false;
        self.pending_delete = None;
        if matches!(self.phase, Phase::Loading | Phase::Mutating) {
            self.phase = if self.items.is_empty() { Phase::Idle } else { Phase::Loaded };
        }
    }

    async fn drive_refresh(&mut self, pending: PendingRefresh<R>) -> Result<(), ApiError> {
        let result = pending.future.await;
        self.apply_refresh(pending.ticket, result);
        match (self.phase, &self.last_error) {
            (Phase::LoadFailed, Some(err)) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    async fn drive_mutation(&mut self, pending: PendingMutation<R>) -> Result<(), ApiError> {
        let result = pending.future.await;
        if let Some(refresh) = self.finish_mutation(pending.ticket, result)? {
            // the mutation itself succeeded; a failed reload is kept in last_error
            let _ = self.drive_refresh(refresh).await;
        }
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let pending = self.start_refresh();
        self.drive_refresh(pending).await
    }

    pub async fn create(&mut self, draft: R::Draft) -> Result<(), ApiError> {
        let pending = self.start_create(draft);
        self.drive_mutation(pending).await
    }

    pub async fn update(&mut self, id: R::Id, draft: R::Draft) -> Result<(), ApiError> {
        let pending = self.start_update(id, draft);
        self.drive_mutation(pending).await
    }

    /// Deletes `id` only if `confirm` agrees. Returns whether a request
    /// was made.
    pub async fn delete_with(
        &mut self,
        id: R::Id,
        confirm: impl FnOnce(R::Id) -> bool,
    ) -> Result<bool, ApiError> {
        self.request_delete(id);
        if !confirm(id) {
            self.cancel_delete();
            return Ok(false);
        }
        match self.confirm_delete() {
            Some(pending) => self.drive_mutation(pending).await.map(|()| true),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, DocumentDraft};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDocuments {
        rows: Mutex<Vec<Document>>,
        calls: Mutex<Vec<String>>,
        fail_with: Mutex<Option<ApiError>>,
    }

    impl FakeDocuments {
        fn with_rows(rows: Vec<Document>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
                ..Self::default()
            })
        }

        fn fail_next(&self, err: ApiError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    #[async_trait]
    impl ResourceClient<Document> for FakeDocuments {
        async fn list(&self) -> Result<Vec<Document>, ApiError> {
            self.record("list".into())?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, draft: &DocumentDraft) -> Result<Option<Document>, ApiError> {
            self.record(format!("create {}", draft.file_url))?;
            let mut rows = self.rows.lock().unwrap();
            let doc = Document {
                id: rows.len() as i64 + 1,
                name: draft.file_url.rsplit('/').next().unwrap_or_default().to_string(),
                doc_type: draft.doc_type.clone(),
                project: draft.project.clone(),
                file_url: Some(draft.file_url.clone()),
                upload_date: None,
            };
            rows.push(doc.clone());
            Ok(Some(doc))
        }

        async fn update(&self, id: i64, _draft: &DocumentDraft) -> Result<Option<Document>, ApiError> {
            self.record(format!("update {id}"))?;
            Ok(None)
        }

        async fn delete(&self, id: i64) -> Result<(), ApiError> {
            self.record(format!("delete {id}"))?;
            self.rows.lock().unwrap().retain(|d| d.id != id);
            Ok(())
        }
    }

    fn doc(id: i64, doc_type: &str) -> Document {
        Document {
            id,
            name: format!("doc-{id}.pdf"),
            doc_type: doc_type.to_string(),
            project: "Website".into(),
            file_url: None,
            upload_date: None,
        }
    }

    fn controller(fake: &Arc<FakeDocuments>) -> ListController<Document> {
        ListController::new(fake.clone())
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 500,
            message: "boom".into(),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_items_wholesale() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice"), doc(2, "Receipt")]);
        let mut ctl = controller(&fake);
        assert_eq!(ctl.phase(), Phase::Idle);

        ctl.refresh().await.unwrap();
        assert_eq!(ctl.items().len(), 2);
        assert_eq!(ctl.phase(), Phase::Loaded);
        assert!(!ctl.is_loading());
        assert_eq!(ctl.find(2).map(|d| d.doc_type.as_str()), Some("Receipt"));
    }

    #[tokio::test]
    async fn loading_flag_clears_on_success_and_failure() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice")]);
        let mut ctl = controller(&fake);

        let pending = ctl.start_refresh();
        assert!(ctl.is_loading());
        let result = pending.future.await;
        ctl.apply_refresh(pending.ticket, result);
        assert!(!ctl.is_loading());

        fake.fail_next(ApiError::Transport("connection refused".into()));
        let pending = ctl.start_refresh();
        assert!(ctl.is_loading());
        let result = pending.future.await;
        ctl.apply_refresh(pending.ticket, result);
        assert!(!ctl.is_loading());
        assert_eq!(ctl.phase(), Phase::LoadFailed);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_collection() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();

        fake.fail_next(server_error());
        let err = ctl.refresh().await.unwrap_err();
        assert_eq!(err, server_error());
        assert_eq!(ctl.items(), &[doc(1, "Invoice")]);
        assert_eq!(ctl.last_error(), Some(&server_error()));
    }

    #[tokio::test]
    async fn create_refreshes_exactly_once() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();

        let draft = DocumentDraft {
            file_url: "https://files.example/contract.pdf".into(),
            doc_type: "Contract".into(),
            project: "Website".into(),
        };
        ctl.create(draft).await.unwrap();

        assert_eq!(fake.count("list"), 2);
        assert_eq!(fake.count("create"), 1);
        assert!(ctl.items().iter().any(|d| {
            d.doc_type == "Contract" && d.file_url.as_deref() == Some("https://files.example/contract.pdf")
        }));
        assert_eq!(ctl.phase(), Phase::Loaded);
    }

    #[tokio::test]
    async fn failed_create_leaves_state_untouched() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();

        fake.fail_next(ApiError::from_response(422, r#"{"message":"project required"}"#));
        let draft = DocumentDraft {
            file_url: "https://files.example/x.pdf".into(),
            doc_type: "Invoice".into(),
            project: String::new(),
        };
        assert!(ctl.create(draft).await.is_err());
        assert_eq!(ctl.items(), &[doc(1, "Invoice")]);
        assert_eq!(ctl.phase(), Phase::MutationFailed);
        assert_eq!(fake.count("list"), 1);
    }

    #[tokio::test]
    async fn failed_delete_keeps_collection() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice"), doc(2, "Receipt")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();
        let before = ctl.items().to_vec();

        fake.fail_next(server_error());
        let result = ctl.delete_with(2, |_| true).await;
        assert_eq!(result, Err(server_error()));
        assert_eq!(ctl.items(), before.as_slice());
    }

    #[tokio::test]
    async fn declined_delete_makes_no_calls() {
        let fake = FakeDocuments::with_rows(vec![doc(7, "Invoice")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();
        let calls_before = fake.calls().len();

        let made_request = ctl.delete_with(7, |_| false).await.unwrap();
        assert!(!made_request);
        assert_eq!(fake.calls().len(), calls_before);
        assert_eq!(ctl.items(), &[doc(7, "Invoice")]);
        assert_eq!(ctl.pending_delete(), None);
    }

    #[tokio::test]
    async fn confirmed_delete_refreshes() {
        let fake = FakeDocuments::with_rows(vec![doc(1, "Invoice"), doc(7, "Receipt")]);
        let mut ctl = controller(&fake);
        ctl.refresh().await.unwrap();

        ctl.request_delete(7);
        assert_eq!(ctl.pending_delete(), Some(7));
        let pending = ctl.confirm_delete().unwrap();
        let result = pending.future.await;
        let refresh = ctl.finish_mutation(pending.ticket, result).unwrap().unwrap();
        let listed = refresh.future.await;
        assert!(ctl.apply_refresh(refresh.ticket, listed));

        assert_eq!(ctl.items(), &[doc(1, "Invoice")]);
        assert_eq!(fake.calls().last().map(String::as_str), Some("list"));
        assert!(ctl.confirm_delete().is_none());
    }

    #[test]
    fn older_refresh_response_is_discarded() {
        let fake = FakeDocuments::with_rows(Vec::new());
        let mut ctl = controller(&fake);

        let first = ctl.start_refresh();
        let second = ctl.start_refresh();

        assert!(ctl.apply_refresh(second.ticket, Ok(vec![doc(2, "Receipt")])));
        assert!(!ctl.apply_refresh(first.ticket, Ok(vec![doc(1, "Invoice")])));
        assert_eq!(ctl.items(), &[doc(2, "Receipt")]);
        assert_eq!(ctl.discarded(), 1);
    }

    #[test]
    fn stale_response_does_not_clear_loading() {
        let fake = FakeDocuments::with_rows(Vec::new());
        let mut ctl = controller(&fake);

        let first = ctl.start_refresh();
        let second = ctl.start_refresh();
        ctl.apply_refresh(first.ticket, Ok(vec![doc(1, "Invoice")]));
        assert!(ctl.is_loading());
        assert!(ctl.items().is_empty());

        ctl.apply_refresh(second.ticket, Err(server_error()));
        assert!(!ctl.is_loading());
    }

    #[test]
    fn detach_drops_late_results() {
        let fake = FakeDocuments::with_rows(Vec::new());
        let mut ctl = controller(&fake);

        let refresh = ctl.start_refresh();
        let create = ctl.start_create(DocumentDraft {
            file_url: "https://files.example/a.pdf".into(),
            doc_type: "Invoice".into(),
            project: "Website".into(),
        });
        ctl.detach();
        assert!(!ctl.is_loading());

        assert!(!ctl.apply_refresh(refresh.ticket, Ok(vec![doc(1, "Invoice")])));
        assert!(matches!(ctl.finish_mutation(create.ticket, Ok(None)), Ok(None)));
        assert!(ctl.items().is_empty());
        assert!(!ctl.is_loading());
        assert_eq!(ctl.discarded(), 2);
    }
}
