use crate::filter::SearchQuery;
use crate::model::{Book, BookField, BookId, Draft};
use crate::overlay::EditOverlay;
use crate::pending::{Completion, Request};
use crate::store::BookStore;

/// Client-side state of the landing view.
///
/// The book list is a cached copy of the service's collection. It only
/// changes when a store call succeeds; failures are logged and leave every
/// field as it was.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
    draft: Draft,
    overlay: EditOverlay,
    query: SearchQuery,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    pub fn search_query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_search_query(&mut self, raw: &str) {
        self.query = SearchQuery::new(raw);
    }

    pub fn filtered_view(&self) -> Vec<&Book> {
        self.query.filter(&self.books)
    }

    pub fn find(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| &book.id == id)
    }

    /// Maps typed input to the id of a cached book, matching on the displayed
    /// form so `"42"` finds both a numeric and a string id. Falls back to
    /// parsing when nothing matches.
    pub fn resolve_id(&self, raw: &str) -> BookId {
        let raw = raw.trim();
        self.books
            .iter()
            .find(|book| book.id.to_string() == raw)
            .map(|book| book.id.clone())
            .unwrap_or_else(|| BookId::parse(raw))
    }

    pub fn set_draft_field(&mut self, field: BookField, value: &str) {
        self.draft.set_field(field, value);
    }

    /// Opens the overlay on a book from the collection. Unknown ids leave it untouched.
    pub fn open_edit(&mut self, id: &BookId) -> bool {
        let Some(book) = self.books.iter().find(|book| &book.id == id) else {
            return false;
        };
        self.overlay.open(book);
        true
    }

    pub fn edit_field(&mut self, field: BookField, value: &str) -> bool {
        self.overlay.field_change(field, value)
    }

    pub fn cancel_edit(&mut self) {
        self.overlay.cancel();
    }

    pub fn create_request(&self) -> Request {
        Request::Create(self.draft.to_payload())
    }

    /// The save request for the overlay buffer, if the overlay is open.
    pub fn save_request(&self) -> Option<Request> {
        self.overlay.buffer().cloned().map(Request::Update)
    }

    /// Reconciles local state with a finished store call. Returns whether the call succeeded.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Fetched(result) => self.apply_fetch_result(result),
            Completion::Created(result) => self.apply_create_result(result),
            Completion::Updated(result) => self.apply_update_result(result),
            Completion::Removed { id, result } => self.apply_remove_result(&id, result),
        }
    }

    pub fn apply_fetch_result(&mut self, result: anyhow::Result<Vec<Book>>) -> bool {
        let books = match result {
            Ok(books) => books,
            Err(err) => return log_failure("fetch", &err),
        };
        tracing::debug!(count = books.len(), "fetched books");
        self.books = books;
        if let Some(id) = self.overlay.selected_id()
            && self.find(id).is_none()
        {
            tracing::debug!(%id, "selected book vanished after refresh; closing overlay");
            self.overlay.cancel();
        }
        true
    }

    pub fn apply_create_result(&mut self, result: anyhow::Result<Book>) -> bool {
        let book = match result {
            Ok(book) => book,
            Err(err) => return log_failure("create", &err),
        };
        tracing::debug!(id = %book.id, "created book");
        self.books.push(book);
        self.draft = Draft::default();
        true
    }

    pub fn apply_update_result(&mut self, result: anyhow::Result<Book>) -> bool {
        let book = match result {
            Ok(book) => book,
            Err(err) => return log_failure("update", &err),
        };
        tracing::debug!(id = %book.id, "updated book");
        if self.overlay.selected_id() == Some(&book.id) {
            self.overlay.cancel();
        }
        if let Some(slot) = self.books.iter_mut().find(|slot| slot.id == book.id) {
            *slot = book;
        }
        true
    }

    pub fn apply_remove_result(&mut self, id: &BookId, result: anyhow::Result<()>) -> bool {
        if let Err(err) = result {
            return log_failure("delete", &err);
        }
        tracing::debug!(%id, "deleted book");
        self.books.retain(|book| &book.id != id);
        if self.overlay.selected_id() == Some(id) {
            self.overlay.cancel();
        }
        true
    }

    /// Initial population on mount, or an explicit refresh.
    pub async fn load(&mut self, store: &dyn BookStore) -> bool {
        let completion = Request::FetchAll.execute(store).await;
        self.apply(completion)
    }

    pub async fn submit_draft(&mut self, store: &dyn BookStore) -> bool {
        let completion = self.create_request().execute(store).await;
        self.apply(completion)
    }

    pub async fn submit_edit(&mut self, store: &dyn BookStore, book: Book) -> bool {
        let completion = Request::Update(book).execute(store).await;
        self.apply(completion)
    }

    /// Saves the overlay buffer. On failure the overlay stays open with the buffer intact.
    pub async fn save_edit(&mut self, store: &dyn BookStore) -> bool {
        let Some(book) = self.overlay.buffer().cloned() else {
            tracing::warn!("save requested with no book open for editing");
            return false;
        };
        self.submit_edit(store, book).await
    }

    pub async fn remove_book(&mut self, store: &dyn BookStore, id: &BookId) -> bool {
        let completion = Request::Remove(id.clone()).execute(store).await;
        self.apply(completion)
    }
}

fn log_failure(operation: &str, err: &anyhow::Error) -> bool {
    tracing::error!(operation, error = %format!("{err:#}"), "book store call failed");
    false
}
