use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use crate::model::{Book, BookId, NewBook};
use crate::store::BookStore;

/// A store call waiting to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    FetchAll,
    Create(NewBook),
    Update(Book),
    Remove(BookId),
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::FetchAll => "fetch",
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Remove(_) => "delete",
        }
    }

    /// The completion reported when the call never produced a result of its own.
    pub fn failed(self, err: anyhow::Error) -> Completion {
        match self {
            Self::FetchAll => Completion::Fetched(Err(err)),
            Self::Create(_) => Completion::Created(Err(err)),
            Self::Update(_) => Completion::Updated(Err(err)),
            Self::Remove(id) => Completion::Removed {
                id,
                result: Err(err),
            },
        }
    }

    pub async fn execute(self, store: &dyn BookStore) -> Completion {
        match self {
            Self::FetchAll => Completion::Fetched(store.fetch_all().await),
            Self::Create(book) => Completion::Created(store.create(&book).await),
            Self::Update(book) => Completion::Updated(store.update(&book).await),
            Self::Remove(id) => {
                let result = store.remove(&id).await;
                Completion::Removed { id, result }
            }
        }
    }
}

/// The outcome of a finished store call, delivered back to the view loop.
#[derive(Debug)]
pub enum Completion {
    Fetched(anyhow::Result<Vec<Book>>),
    Created(anyhow::Result<Book>),
    Updated(anyhow::Result<Book>),
    Removed {
        id: BookId,
        result: anyhow::Result<()>,
    },
}

impl Completion {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Fetched(_) => "fetch",
            Self::Created(_) => "create",
            Self::Updated(_) => "update",
            Self::Removed { .. } => "delete",
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Fetched(result) => result.is_ok(),
            Self::Created(result) | Self::Updated(result) => result.is_ok(),
            Self::Removed { result, .. } => result.is_ok(),
        }
    }
}

/// Runs store calls as background tasks and hands their completions to a
/// single receiver, in the order they finish.
///
/// Requests are never cancelled or de-duplicated. Two saves of the same book
/// both go out, and a slow fetch can land after a later create.
#[derive(Clone)]
pub struct RequestQueue {
    store: Arc<dyn BookStore>,
    semaphore: Arc<Semaphore>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl RequestQueue {
    pub fn new(
        store: Arc<dyn BookStore>,
        max_in_flight: usize,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let queue = Self {
            store,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            completions: tx,
        };
        (queue, rx)
    }

    pub fn submit(&self, request: Request) {
        let store = Arc::clone(&self.store);
        let semaphore = Arc::clone(&self.semaphore);
        let completions = self.completions.clone();
        tracing::debug!(operation = request.operation(), "submit book store request");
        tokio::spawn(async move {
            // Every request yields exactly one completion, even when the call
            // never runs or its task dies.
            let operation = request.operation();
            let completion = match semaphore.acquire_owned().await {
                Ok(permit) => {
                    let call = request.clone();
                    let task = tokio::spawn(async move {
                        let _permit = permit;
                        call.execute(store.as_ref()).await
                    });
                    match task.await {
                        Ok(completion) => completion,
                        Err(err) => {
                            tracing::warn!(operation, %err, "book store task failed");
                            request.failed(anyhow::anyhow!("{operation} task failed: {err}"))
                        }
                    }
                }
                Err(_) => {
                    tracing::warn!(operation, "request queue closed");
                    request.failed(anyhow::anyhow!("request queue closed"))
                }
            };
            if completions.send(completion).is_err() {
                tracing::debug!("completion receiver dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BookStore for RecordingStore {
        async fn fetch_all(&self) -> anyhow::Result<Vec<Book>> {
            self.calls.lock().unwrap().push("fetch".to_owned());
            Ok(Vec::new())
        }

        async fn create(&self, book: &NewBook) -> anyhow::Result<Book> {
            self.calls.lock().unwrap().push(format!("create {}", book.title));
            Ok(Book {
                id: BookId::Number(1),
                title: book.title.clone(),
                author: book.author.clone(),
                published_year: book.published_year.clone(),
            })
        }

        async fn update(&self, book: &Book) -> anyhow::Result<Book> {
            self.calls.lock().unwrap().push(format!("update {}", book.id));
            Ok(book.clone())
        }

        async fn remove(&self, id: &BookId) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("delete {id}"));
            anyhow::bail!("book service error (404 Not Found): Book not found")
        }
    }

    #[tokio::test]
    async fn every_submitted_request_delivers_one_completion() {
        let store = Arc::new(RecordingStore::default());
        let (queue, mut rx) = RequestQueue::new(store.clone(), 1);

        queue.submit(Request::FetchAll);
        queue.submit(Request::Create(NewBook {
            title: "Dune".to_owned(),
            author: "Herbert".to_owned(),
            published_year: None,
        }));
        queue.submit(Request::Remove(BookId::Number(9)));

        let mut operations = Vec::new();
        for _ in 0..3 {
            let completion = rx.recv().await.expect("completion delivered");
            operations.push((completion.operation(), completion.is_success()));
        }
        operations.sort();
        assert_eq!(
            operations,
            [("create", true), ("delete", false), ("fetch", true)]
        );
        assert_eq!(store.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn removed_completion_carries_the_requested_id() {
        let store = RecordingStore::default();
        let completion = Request::Remove(BookId::Number(4)).execute(&store).await;
        match completion {
            Completion::Removed { id, result } => {
                assert_eq!(id, BookId::Number(4));
                assert!(result.is_err());
            }
            other => panic!("unexpected completion: {other:?}"),
        }
    }

    struct PanickingStore;

    #[async_trait]
    impl BookStore for PanickingStore {
        async fn fetch_all(&self) -> anyhow::Result<Vec<Book>> {
            panic!("store blew up");
        }

        async fn create(&self, _book: &NewBook) -> anyhow::Result<Book> {
            panic!("store blew up");
        }

        async fn update(&self, _book: &Book) -> anyhow::Result<Book> {
            panic!("store blew up");
        }

        async fn remove(&self, _id: &BookId) -> anyhow::Result<()> {
            panic!("store blew up");
        }
    }

    #[tokio::test]
    async fn panicking_call_still_delivers_a_failed_completion() {
        let (queue, mut rx) = RequestQueue::new(Arc::new(PanickingStore), 1);
        queue.submit(Request::Remove(BookId::Number(5)));
        queue.submit(Request::FetchAll);

        let mut seen = Vec::new();
        for _ in 0..2 {
            let completion = rx.recv().await.expect("completion delivered");
            assert!(!completion.is_success());
            seen.push(completion.operation());
        }
        seen.sort();
        assert_eq!(seen, ["delete", "fetch"]);
    }

    #[test]
    fn failed_request_keeps_its_operation_and_id() {
        let completion = Request::Remove(BookId::Number(3)).failed(anyhow::anyhow!("closed"));
        match completion {
            Completion::Removed { id, result } => {
                assert_eq!(id, BookId::Number(3));
                assert!(result.is_err());
            }
            other => panic!("unexpected completion: {other:?}"),
        }
        let completion = Request::FetchAll.failed(anyhow::anyhow!("closed"));
        assert_eq!(completion.operation(), "fetch");
        assert!(!completion.is_success());
    }

    #[test]
    fn operations_are_named_consistently() {
        assert_eq!(Request::FetchAll.operation(), "fetch");
        assert_eq!(Request::Remove(BookId::Number(1)).operation(), "delete");
        assert_eq!(Completion::Fetched(Ok(Vec::new())).operation(), "fetch");
    }
}
